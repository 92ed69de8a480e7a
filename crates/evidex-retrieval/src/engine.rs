//! RetrievalOrchestrator: sequences the stages of one retrieval call.
//!
//! query → expansion → hybrid search → RRF → rerank → truncation → MMR.
//!
//! Stages absorb their own collaborator failures. A stage that returns an
//! error or panics aborts the remaining stages; the error is written to
//! `stage_metadata` and the partial context is returned. `retrieve` never
//! fails.

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use evidex_core::config::EvidexConfig;
use evidex_core::constants::{
    CONFIG_KEY_SEPARATOR, METADATA_ERROR, METADATA_FAILED_STAGE, METADATA_TIMING,
    METADATA_TOTAL_DURATION_MS,
};
use evidex_core::errors::{ConfigError, EvidexError, StageError};
use evidex_core::models::RetrievalContext;
use evidex_core::traits::{Dependencies, IEmbeddingProvider, IRetrievalStage, IVectorStore};
use evidex_observability::tracing_setup::events;
use evidex_observability::{
    retrieval_span, stage_span, DegradationTracker, PipelineMetrics, PipelineTimer,
    TrackedDegradation,
};
use futures::FutureExt;
use serde_json::{json, Map, Value};
use tracing::{debug, warn, Instrument};

use crate::embedding_cache::CachedEmbedder;
use crate::expansion::QueryExpansionStage;
use crate::ranking::{MmrStage, RerankingStage, ScoreTruncationStage};
use crate::search::worker_pool::panic_message;
use crate::search::{HybridRetrievalStage, RrfFusionStage};

/// The retrieval pipeline. Long-lived: build once at start-up, share behind
/// an `Arc`, call [`retrieve`](Self::retrieve) concurrently.
pub struct RetrievalOrchestrator {
    stages: RwLock<Vec<Arc<dyn IRetrievalStage>>>,
    dependencies: RwLock<Arc<Dependencies>>,
    embedding_cache_capacity: u64,
    metrics: Mutex<PipelineMetrics>,
    tracker: Mutex<DegradationTracker>,
}

impl RetrievalOrchestrator {
    /// Build the default six-stage pipeline with no collaborators bound.
    pub fn new(config: EvidexConfig) -> Self {
        let stages: Vec<Arc<dyn IRetrievalStage>> = vec![
            Arc::new(QueryExpansionStage::new(config.query_expansion)),
            Arc::new(HybridRetrievalStage::new(config.hybrid_retrieval)),
            Arc::new(RrfFusionStage::new(config.rrf_fusion)),
            Arc::new(RerankingStage::new(config.reranking)),
            Arc::new(ScoreTruncationStage::new(config.score_truncation)),
            Arc::new(MmrStage::new(config.mmr)),
        ];
        Self {
            stages: RwLock::new(stages),
            dependencies: RwLock::new(Arc::new(Dependencies::default())),
            embedding_cache_capacity: config.embedding_cache.capacity,
            metrics: Mutex::new(PipelineMetrics::new()),
            tracker: Mutex::new(DegradationTracker::new()),
        }
    }

    pub fn with_dependencies(self, dependencies: Dependencies) -> Self {
        self.bind(dependencies);
        self
    }

    /// Replace every collaborator at once. In-flight calls keep the bundle
    /// they started with.
    pub fn bind(&self, mut dependencies: Dependencies) {
        dependencies.embedder = dependencies.embedder.map(|e| self.cached(e));
        self.swap(dependencies);
    }

    pub fn set_vector_store(&self, store: Arc<dyn IVectorStore>) {
        let mut dependencies = self.dependencies().as_ref().clone();
        dependencies.vector_store = Some(store);
        self.swap(dependencies);
    }

    pub fn set_embedding_function(&self, embedder: Arc<dyn IEmbeddingProvider>) {
        let mut dependencies = self.dependencies().as_ref().clone();
        dependencies.embedder = Some(self.cached(embedder));
        self.swap(dependencies);
    }

    /// The collaborator bundle the next call will use.
    pub fn dependencies(&self) -> Arc<Dependencies> {
        self.dependencies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn swap(&self, dependencies: Dependencies) {
        debug!(?dependencies, "binding collaborators");
        *self
            .dependencies
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(dependencies);
    }

    fn cached(&self, embedder: Arc<dyn IEmbeddingProvider>) -> Arc<dyn IEmbeddingProvider> {
        if self.embedding_cache_capacity == 0 {
            embedder
        } else {
            Arc::new(CachedEmbedder::new(embedder, self.embedding_cache_capacity))
        }
    }

    fn stage_snapshot(&self) -> Vec<Arc<dyn IRetrievalStage>> {
        self.stages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run every stage against `query`.
    pub async fn retrieve(&self, query: &str) -> RetrievalContext {
        let ctx = RetrievalContext::new(query);
        let span = retrieval_span!(ctx.request_id, query);
        self.run(ctx).instrument(span).await
    }

    async fn run(&self, mut ctx: RetrievalContext) -> RetrievalContext {
        let stages = self.stage_snapshot();
        let deps = self.dependencies();
        let mut timer = PipelineTimer::start();
        let mut stage_durations = Vec::with_capacity(stages.len());

        for stage in &stages {
            let name = stage.name().to_string();
            if !stage.is_enabled() {
                debug!(stage = %name, "stage disabled, skipping");
                continue;
            }

            let started = Instant::now();
            let outcome = AssertUnwindSafe(stage.execute(&mut ctx, &deps))
                .catch_unwind()
                .instrument(stage_span!(name.as_str()))
                .await;
            let duration_ms = timer.record(&name, started.elapsed());

            let failure: Option<EvidexError> = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e),
                Err(payload) => Some(
                    StageError::Panicked {
                        stage: name.clone(),
                        message: panic_message(payload),
                    }
                    .into(),
                ),
            };

            match failure {
                None => {
                    events::stage_completed(&name, duration_ms);
                    stage_durations.push((name, duration_ms));
                }
                Some(e) => {
                    let error = e.to_string();
                    events::stage_failed(&name, &error);
                    ctx.stage_metadata
                        .insert(METADATA_ERROR.to_string(), Value::String(error));
                    ctx.stage_metadata
                        .insert(METADATA_FAILED_STAGE.to_string(), Value::String(name));
                    break;
                }
            }
        }

        let summary = timer.summary();
        let total_ms = summary.total_duration_ms;
        ctx.stage_metadata
            .insert(METADATA_TOTAL_DURATION_MS.to_string(), json!(total_ms));
        ctx.stage_metadata.insert(
            METADATA_TIMING.to_string(),
            serde_json::to_value(&summary).unwrap_or(Value::Null),
        );

        events::pipeline_completed(
            ctx.expanded_queries.len(),
            ctx.fused_documents.len(),
            ctx.reranked_documents.len(),
            ctx.truncated_documents.len(),
            ctx.final_documents.len(),
            ctx.low_confidence,
            total_ms,
        );

        {
            let mut metrics = self.metrics.lock().unwrap_or_else(PoisonError::into_inner);
            for (stage, ms) in &stage_durations {
                metrics.record_stage(stage, *ms);
            }
            metrics.record_retrieval(&ctx, timer.elapsed());
        }
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record_call(&ctx.degradations);

        ctx
    }

    /// Apply `stage__param` updates. Valid keys are applied even when others
    /// are rejected; the rejected keys are returned together.
    pub fn update_config<I, K>(&self, updates: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let stages = self.stage_snapshot();
        let mut rejected = Vec::new();

        for (key, value) in updates {
            let key = key.as_ref();
            let result = parse_key(key).and_then(|(stage_name, param)| {
                let stage = stages
                    .iter()
                    .find(|s| s.name() == stage_name)
                    .ok_or_else(|| ConfigError::UnknownStage {
                        stage: stage_name.to_string(),
                    })?;
                stage.update_config(param, value)
            });

            events::config_updated(key, result.is_ok());
            if let Err(e) = result {
                warn!(key, error = %e, "config update rejected");
                rejected.push(key.to_string());
            }
        }

        if rejected.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Rejected { keys: rejected })
        }
    }

    /// Stage name → current configuration.
    pub fn get_pipeline_info(&self) -> Map<String, Value> {
        self.stage_snapshot()
            .iter()
            .map(|s| (s.name().to_string(), s.get_config()))
            .collect()
    }

    /// Insert a stage at `position`, or append. Positions past the end append.
    pub fn add_stage(&self, stage: Arc<dyn IRetrievalStage>, position: Option<usize>) {
        let mut stages = self.stages.write().unwrap_or_else(PoisonError::into_inner);
        let index = position.map_or(stages.len(), |p| p.min(stages.len()));
        debug!(stage = stage.name(), index, "adding stage");
        stages.insert(index, stage);
    }

    /// Remove the first stage named `name`. Returns whether one was removed.
    pub fn remove_stage(&self, name: &str) -> bool {
        let mut stages = self.stages.write().unwrap_or_else(PoisonError::into_inner);
        match stages.iter().position(|s| s.name() == name) {
            Some(index) => {
                stages.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stage_snapshot()
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Aggregate counters over every call so far.
    pub fn metrics(&self) -> PipelineMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Recent degradations, oldest first, with recovery status.
    pub fn degradations(&self) -> Vec<TrackedDegradation> {
        self.tracker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .events()
            .into_iter()
            .cloned()
            .collect()
    }
}

impl Default for RetrievalOrchestrator {
    fn default() -> Self {
        Self::new(EvidexConfig::default())
    }
}

fn parse_key(key: &str) -> Result<(&str, &str), ConfigError> {
    let parts: Vec<&str> = key.split(CONFIG_KEY_SEPARATOR).collect();
    match parts.as_slice() {
        [stage, param] if !stage.is_empty() && !param.is_empty() => Ok((*stage, *param)),
        _ => Err(ConfigError::MalformedKey {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_splits_stage_and_param() {
        assert_eq!(parse_key("mmr__final_k").unwrap(), ("mmr", "final_k"));
        assert_eq!(
            parse_key("score_truncation__gap_threshold").unwrap(),
            ("score_truncation", "gap_threshold")
        );
    }

    #[test]
    fn parse_key_rejects_malformed() {
        for key in ["mmr", "mmr__", "__final_k", "a__b__c", ""] {
            assert!(
                matches!(parse_key(key), Err(ConfigError::MalformedKey { .. })),
                "{key}"
            );
        }
    }

    #[test]
    fn default_stage_order() {
        let orchestrator = RetrievalOrchestrator::default();
        assert_eq!(
            orchestrator.stage_names(),
            evidex_core::constants::DEFAULT_STAGE_ORDER
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        );
    }
}
