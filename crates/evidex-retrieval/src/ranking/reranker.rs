//! Pairwise reranking of the fused candidates.
//!
//! Sends (query, passage) pairs to the injected scorer in batches, re-sorts
//! by the returned scores, and keeps `top_k`. Disabled, with empty input,
//! without a scorer, or after any scorer failure, the fused order is kept
//! and simply truncated to `top_k`.

use async_trait::async_trait;
use evidex_core::config::{LiveConfig, RerankingConfig};
use evidex_core::constants::{ANNOTATION_ORIGINAL_SCORE, STAGE_RERANKING};
use evidex_core::errors::{ConfigError, EvidexResult, ProviderError};
use evidex_core::models::{Provenance, RetrievalContext, ScoredDocument};
use evidex_core::traits::{Dependencies, IPairwiseScorer, IRetrievalStage};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::fallback::{bounded, degrade};

const FALLBACK: &str = "fused order truncated to top_k";

/// Writes `reranked_documents`. Always runs.
pub struct RerankingStage {
    config: LiveConfig<RerankingConfig>,
}

impl RerankingStage {
    pub fn new(config: RerankingConfig) -> Self {
        Self {
            config: LiveConfig::new(STAGE_RERANKING, config),
        }
    }
}

impl Default for RerankingStage {
    fn default() -> Self {
        Self::new(RerankingConfig::default())
    }
}

/// Score every pair, `batch_size` pairs per call.
async fn score_all(
    scorer: &dyn IPairwiseScorer,
    pairs: &[(String, String)],
    config: &RerankingConfig,
) -> EvidexResult<Vec<f64>> {
    let mut scores = Vec::with_capacity(pairs.len());
    for chunk in pairs.chunks(config.batch_size.max(1)) {
        let batch = bounded(scorer.name(), config.timeout_ms, scorer.score_batch(chunk)).await?;
        if batch.len() != chunk.len() {
            return Err(ProviderError::MalformedResponse {
                provider: scorer.name().to_string(),
                reason: format!("expected {} scores, got {}", chunk.len(), batch.len()),
            }
            .into());
        }
        scores.extend(batch);
    }
    Ok(scores)
}

#[async_trait]
impl IRetrievalStage for RerankingStage {
    fn name(&self) -> &str {
        STAGE_RERANKING
    }

    async fn execute(&self, ctx: &mut RetrievalContext, deps: &Dependencies) -> EvidexResult<()> {
        let config = self.config.snapshot();
        let fused = &ctx.fused_documents;
        let passthrough =
            |docs: &[ScoredDocument]| docs.iter().take(config.top_k).cloned().collect::<Vec<_>>();

        let scorer = match &deps.scorer {
            Some(scorer) if config.enabled && !fused.is_empty() => scorer,
            _ => {
                if config.enabled && deps.scorer.is_none() {
                    debug!("no pairwise scorer bound, keeping fused order");
                }
                let reranked = passthrough(fused);
                ctx.record_stage(
                    STAGE_RERANKING,
                    json!({
                        "enabled": config.enabled,
                        "reranked": false,
                        "n_results": reranked.len(),
                    }),
                );
                ctx.reranked_documents = reranked;
                return Ok(());
            }
        };

        let pairs: Vec<(String, String)> = fused
            .iter()
            .map(|d| (ctx.original_query.clone(), d.content().to_string()))
            .collect();

        let (reranked, applied) = match score_all(scorer.as_ref(), &pairs, &config).await {
            Ok(scores) => {
                let mut rescored: Vec<ScoredDocument> = fused
                    .iter()
                    .zip(scores)
                    .map(|(doc, score)| {
                        doc.rescored(score, Provenance::Reranker)
                            .annotate(ANNOTATION_ORIGINAL_SCORE, doc.score)
                    })
                    .collect();
                ScoredDocument::sort_desc(&mut rescored);
                rescored.truncate(config.top_k);
                (rescored, true)
            }
            Err(e) => {
                let fallback = passthrough(fused);
                degrade(ctx, STAGE_RERANKING, e, FALLBACK);
                (fallback, false)
            }
        };

        info!(
            candidates = pairs.len(),
            kept = reranked.len(),
            applied,
            "reranking complete"
        );
        ctx.record_stage(
            STAGE_RERANKING,
            json!({
                "enabled": config.enabled,
                "reranked": applied,
                "n_candidates": pairs.len(),
                "n_results": reranked.len(),
            }),
        );
        ctx.reranked_documents = reranked;
        Ok(())
    }

    fn get_config(&self) -> Value {
        self.config.to_value()
    }

    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.config.patch(param, value)
    }
}
