use std::time::Duration;

use evidex_core::config::ObservabilityConfig;
use evidex_core::models::{DegradationEvent, Passage, Provenance, RetrievalContext, ScoredDocument};
use evidex_observability::tracing_setup::init_tracing;
use evidex_observability::{DegradationTracker, PipelineMetrics, RecoveryStatus};
use serde_json::json;

fn event(component: &str) -> DegradationEvent {
    DegradationEvent::new(component, "scorer timed out", "unscored truncation")
}

// ---------------------------------------------------------------------------
// Degradation tracking
// ---------------------------------------------------------------------------

#[test]
fn component_recovers_after_clean_call() {
    let mut tracker = DegradationTracker::new();
    tracker.record_call(&[event("reranking")]);
    assert!(tracker.is_degraded("reranking"));

    tracker.record_call(&[]);
    assert!(!tracker.is_degraded("reranking"));
    let events = tracker.events();
    assert_eq!(events[0].recovery_status, RecoveryStatus::Recovered);
    assert!(events[0].recovered_at.is_some());
}

#[test]
fn component_stays_degraded_while_failing() {
    let mut tracker = DegradationTracker::new();
    tracker.record_call(&[event("reranking")]);
    tracker.record_call(&[event("reranking")]);
    assert_eq!(tracker.active_degradations().len(), 2);
    assert!(tracker.degraded_duration("reranking").is_some());
}

#[test]
fn recovery_is_per_component() {
    let mut tracker = DegradationTracker::new();
    tracker.record_call(&[event("reranking"), event("mmr")]);
    tracker.record_call(&[event("mmr")]);
    assert!(!tracker.is_degraded("reranking"));
    assert!(tracker.is_degraded("mmr"));
    assert_eq!(tracker.active_components(), vec!["mmr".to_string()]);
}

#[test]
fn count_recent_filters_by_component() {
    let mut tracker = DegradationTracker::new();
    tracker.record(event("query_expansion"));
    tracker.record(event("query_expansion"));
    tracker.record(event("mmr"));
    assert_eq!(tracker.count_recent("query_expansion", 60), 2);
    assert_eq!(tracker.count_recent("hybrid_retrieval", 60), 0);
}

#[test]
fn degraded_duration_none_when_healthy() {
    let tracker = DegradationTracker::new();
    assert!(tracker.degraded_duration("mmr").is_none());
}

// ---------------------------------------------------------------------------
// Pipeline metrics
// ---------------------------------------------------------------------------

fn finished_context(final_docs: usize, low_confidence: bool) -> RetrievalContext {
    let mut ctx = RetrievalContext::new("q");
    ctx.final_documents = (0..final_docs)
        .map(|i| ScoredDocument::new(Passage::new(format!("p{i}"), "s"), 1.0, Provenance::Mmr))
        .collect();
    ctx.low_confidence = low_confidence;
    ctx
}

#[test]
fn metrics_count_outcomes() {
    let mut metrics = PipelineMetrics::new();
    metrics.record_retrieval(&finished_context(3, false), Duration::from_millis(10));
    metrics.record_retrieval(&finished_context(0, true), Duration::from_millis(30));

    let mut failed = finished_context(0, true);
    failed.record_stage("error", json!("stage rrf_fusion failed: boom"));
    failed.record_degradation(event("reranking"));
    metrics.record_retrieval(&failed, Duration::from_millis(20));

    assert_eq!(metrics.total_retrievals, 3);
    assert_eq!(metrics.failed_pipelines, 1);
    assert_eq!(metrics.low_confidence_results, 2);
    assert_eq!(metrics.empty_results, 2);
    assert_eq!(metrics.degradations_by_component["reranking"], 1);
    assert!((metrics.avg_latency_ms() - 20.0).abs() < 1e-9);
    assert!((metrics.max_latency_ms - 30.0).abs() < 1e-9);
}

#[test]
fn metrics_rates_are_zero_before_first_call() {
    let metrics = PipelineMetrics::new();
    assert_eq!(metrics.avg_latency_ms(), 0.0);
    assert_eq!(metrics.low_confidence_rate(), 0.0);
}

#[test]
fn stage_latency_accumulates() {
    let mut metrics = PipelineMetrics::new();
    metrics.record_stage("mmr", 1.5);
    metrics.record_stage("mmr", 2.5);
    assert_eq!(metrics.stage_latency_ms["mmr"], 4.0);
    metrics.reset();
    assert!(metrics.stage_latency_ms.is_empty());
}

#[test]
fn metrics_serialize_to_json() {
    let mut metrics = PipelineMetrics::new();
    metrics.record_retrieval(&finished_context(1, false), Duration::from_millis(5));
    let json = serde_json::to_value(&metrics).unwrap();
    assert_eq!(json["total_retrievals"], 1);
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

#[test]
fn tracing_installs_once() {
    let config = ObservabilityConfig {
        log_level: "debug".into(),
        json_logs: false,
    };
    init_tracing(&config);
    assert!(!init_tracing(&ObservabilityConfig::default()));
}
