//! Hybrid retrieval: dense similarity and BM25 search for every expanded
//! query, run concurrently and kept separate for fusion.
//!
//! Queries fan out on the query pool; inside each query task the two methods
//! run on the method pool. Every (query, method) pair that fails or times
//! out yields an empty list and a degradation event; nothing here aborts
//! the pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use evidex_core::config::{HybridRetrievalConfig, LiveConfig};
use evidex_core::constants::STAGE_HYBRID_RETRIEVAL;
use evidex_core::errors::{ConfigError, EvidexResult};
use evidex_core::models::{Provenance, RetrievalContext, RetrievalMethod, ScoredDocument};
use evidex_core::traits::{Dependencies, IRetrievalStage, IVectorStore};
use evidex_lexical::Bm25Index;
use futures::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::lexical_cache::LexicalIndexCache;
use super::worker_pool::WorkerPool;
use crate::fallback::{bounded, degrade};

const FALLBACK: &str = "empty result list";
const LEXICAL_INDEX: &str = "lexical_index";

type MethodResult = Result<Vec<ScoredDocument>, String>;

/// Writes `retrieved_results`. Always runs.
pub struct HybridRetrievalStage {
    config: LiveConfig<HybridRetrievalConfig>,
    query_pool: WorkerPool,
    method_pool: WorkerPool,
    lexical: LexicalIndexCache,
}

impl HybridRetrievalStage {
    /// Pools are sized here and never resized.
    pub fn new(config: HybridRetrievalConfig) -> Self {
        let query_pool = WorkerPool::new("query", config.query_workers);
        let method_pool = WorkerPool::new("method", config.method_workers);
        Self {
            config: LiveConfig::new(STAGE_HYBRID_RETRIEVAL, config),
            query_pool,
            method_pool,
            lexical: LexicalIndexCache::new(),
        }
    }

    pub fn lexical_cache(&self) -> &LexicalIndexCache {
        &self.lexical
    }

    async fn lexical_index(
        &self,
        ctx: &mut RetrievalContext,
        store: Option<&Arc<dyn IVectorStore>>,
        config: &HybridRetrievalConfig,
    ) -> Option<Arc<Bm25Index>> {
        let store = store?;
        let refresh = self.lexical.refresh(
            store,
            config.fingerprint_sample_size,
            config.fingerprint_prefix_chars,
        );
        match bounded(LEXICAL_INDEX, config.method_timeout_ms, refresh).await {
            Ok(index) => index,
            Err(e) => {
                degrade(
                    ctx,
                    STAGE_HYBRID_RETRIEVAL,
                    format!("lexical index refresh failed: {e}"),
                    "previous lexical index",
                );
                self.lexical.current()
            }
        }
    }
}

impl Default for HybridRetrievalStage {
    fn default() -> Self {
        Self::new(HybridRetrievalConfig::default())
    }
}

/// Everything one query task needs, owned so it can move onto the pool.
struct QueryTask {
    query: String,
    top_k: usize,
    method_timeout: Duration,
    store: Option<Arc<dyn IVectorStore>>,
    lexical: Option<Arc<Bm25Index>>,
    method_pool: WorkerPool,
}

impl QueryTask {
    async fn run(self) -> (MethodResult, MethodResult) {
        let dense = {
            let store = self.store.clone();
            let query = self.query.clone();
            let top_k = self.top_k;
            self.method_pool
                .run(self.method_timeout, async move { dense_search(store, query, top_k).await })
        };
        let lexical = {
            let index = self.lexical.clone();
            let query = self.query.clone();
            let top_k = self.top_k;
            self.method_pool
                .run(self.method_timeout, async move { lexical_search(index, query, top_k).await })
        };
        let (dense, lexical) = tokio::join!(dense, lexical);
        (
            dense.map_err(|e| e.to_string()).and_then(|r| r),
            lexical.map_err(|e| e.to_string()).and_then(|r| r),
        )
    }
}

async fn dense_search(
    store: Option<Arc<dyn IVectorStore>>,
    query: String,
    top_k: usize,
) -> MethodResult {
    let Some(store) = store else {
        return Ok(Vec::new());
    };
    let hits = store.search(&query, top_k).await.map_err(|e| e.to_string())?;
    Ok(hits
        .into_iter()
        .map(|hit| {
            let score = hit.similarity();
            ScoredDocument::new(hit.passage, score, Provenance::Dense)
        })
        .collect())
}

async fn lexical_search(index: Option<Arc<Bm25Index>>, query: String, top_k: usize) -> MethodResult {
    let Some(index) = index else {
        return Ok(Vec::new());
    };
    let hits = tokio::task::spawn_blocking(move || index.retrieve(&query, top_k))
        .await
        .map_err(|e| e.to_string())?;
    Ok(hits
        .into_iter()
        .map(|hit| ScoredDocument::new(hit.passage, hit.score, Provenance::Lexical))
        .collect())
}

#[async_trait]
impl IRetrievalStage for HybridRetrievalStage {
    fn name(&self) -> &str {
        STAGE_HYBRID_RETRIEVAL
    }

    async fn execute(&self, ctx: &mut RetrievalContext, deps: &Dependencies) -> EvidexResult<()> {
        let config = self.config.snapshot();
        let queries: Vec<String> = if ctx.expanded_queries.is_empty() {
            vec![ctx.original_query.clone()]
        } else {
            ctx.expanded_queries.clone()
        };

        if deps.vector_store.is_none() {
            debug!("no vector store bound, both methods return empty lists");
        }
        let lexical_index = self
            .lexical_index(ctx, deps.vector_store.as_ref(), &config)
            .await;

        let query_timeout = Duration::from_millis(config.query_timeout_ms);
        let tasks = queries.iter().map(|query| {
            let task = QueryTask {
                query: query.clone(),
                top_k: config.top_k_per_query,
                method_timeout: Duration::from_millis(config.method_timeout_ms),
                store: deps.vector_store.clone(),
                lexical: lexical_index.clone(),
                method_pool: self.method_pool.clone(),
            };
            self.query_pool.run(query_timeout, task.run())
        });
        let outcomes = join_all(tasks).await;

        let mut results = BTreeMap::new();
        let mut total_dense = 0;
        let mut total_lexical = 0;
        for (query, outcome) in queries.iter().zip(outcomes) {
            let (dense, lexical) = match outcome {
                Ok(pair) => pair,
                Err(e) => {
                    let reason = e.to_string();
                    (Err(reason.clone()), Err(reason))
                }
            };

            let mut by_method = BTreeMap::new();
            for (method, result) in [
                (RetrievalMethod::Dense, dense),
                (RetrievalMethod::Lexical, lexical),
            ] {
                let documents = match result {
                    Ok(documents) => documents,
                    Err(reason) => {
                        degrade(
                            ctx,
                            STAGE_HYBRID_RETRIEVAL,
                            format!("{method} search for {query:?} failed: {reason}"),
                            FALLBACK,
                        );
                        Vec::new()
                    }
                };
                match method {
                    RetrievalMethod::Dense => total_dense += documents.len(),
                    RetrievalMethod::Lexical => total_lexical += documents.len(),
                }
                by_method.insert(method, documents);
            }
            results.insert(query.clone(), by_method);
        }

        info!(
            queries = queries.len(),
            dense = total_dense,
            lexical = total_lexical,
            "hybrid retrieval complete"
        );
        ctx.record_stage(
            STAGE_HYBRID_RETRIEVAL,
            json!({
                "n_queries": queries.len(),
                "total_dense_results": total_dense,
                "total_lexical_results": total_lexical,
                "lexical_index_documents": lexical_index.as_ref().map_or(0, |i| i.len()),
            }),
        );
        ctx.retrieved_results = results;
        Ok(())
    }

    fn get_config(&self) -> Value {
        self.config.to_value()
    }

    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.config.patch(param, value)
    }
}
