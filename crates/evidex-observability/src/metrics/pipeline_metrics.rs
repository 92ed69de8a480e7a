//! Counters over all retrieval calls served by one orchestrator.

use std::collections::BTreeMap;
use std::time::Duration;

use evidex_core::RetrievalContext;
use serde::{Deserialize, Serialize};

/// Aggregate retrieval outcomes and latency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineMetrics {
    pub total_retrievals: u64,
    /// Calls where a stage error aborted the pipeline.
    pub failed_pipelines: u64,
    pub low_confidence_results: u64,
    /// Calls that ended with no final documents.
    pub empty_results: u64,
    pub total_latency_ms: f64,
    pub max_latency_ms: f64,
    pub degradations_by_component: BTreeMap<String, u64>,
    /// Cumulative time spent in each stage.
    pub stage_latency_ms: BTreeMap<String, f64>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished retrieval call.
    pub fn record_retrieval(&mut self, ctx: &RetrievalContext, latency: Duration) {
        let latency_ms = latency.as_secs_f64() * 1000.0;
        self.total_retrievals += 1;
        if ctx.error().is_some() {
            self.failed_pipelines += 1;
        }
        if ctx.low_confidence {
            self.low_confidence_results += 1;
        }
        if ctx.final_documents.is_empty() {
            self.empty_results += 1;
        }
        self.total_latency_ms += latency_ms;
        self.max_latency_ms = self.max_latency_ms.max(latency_ms);
        for event in &ctx.degradations {
            *self
                .degradations_by_component
                .entry(event.component.clone())
                .or_default() += 1;
        }
    }

    /// Add time spent in one stage.
    pub fn record_stage(&mut self, stage: &str, duration_ms: f64) {
        *self.stage_latency_ms.entry(stage.to_string()).or_default() += duration_ms;
    }

    /// Mean end-to-end latency, 0 before the first call.
    pub fn avg_latency_ms(&self) -> f64 {
        if self.total_retrievals == 0 {
            return 0.0;
        }
        self.total_latency_ms / self.total_retrievals as f64
    }

    /// Fraction of calls flagged low confidence.
    pub fn low_confidence_rate(&self) -> f64 {
        if self.total_retrievals == 0 {
            return 0.0;
        }
        self.low_confidence_results as f64 / self.total_retrievals as f64
    }

    /// Reset all metrics (useful for testing or periodic rotation).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
