//! Maximal Marginal Relevance diversity selection. Terminal stage: the only
//! writer of `final_documents`.

use async_trait::async_trait;
use evidex_core::config::{LiveConfig, MmrConfig, MmrMode};
use evidex_core::constants::{ANNOTATION_MMR_SELECTED, STAGE_MMR};
use evidex_core::errors::{ConfigError, EvidexResult, ProviderError};
use evidex_core::models::{Provenance, RetrievalContext, ScoredDocument};
use evidex_core::traits::{Dependencies, IEmbeddingProvider, IRetrievalStage};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::similarity::{cosine_similarity, mean_pairwise_similarity};
use crate::fallback::{bounded, degrade};

const FALLBACK: &str = "truncation to final_k";

/// Fewer candidates than this are never diversified.
const MIN_CANDIDATES: usize = 3;

/// Greedy MMR over `documents`, returning selected indices in pick order.
///
/// The seed is the first document with the highest score. Each later pick
/// maximizes `lambda * score - (1 - lambda) * max_sim_to_selected`; ties go
/// to the earlier candidate.
pub fn mmr_select(
    documents: &[ScoredDocument],
    embeddings: &[Vec<f32>],
    lambda: f64,
    final_k: usize,
) -> Vec<usize> {
    let n = documents.len().min(embeddings.len());
    if n == 0 || final_k == 0 {
        return Vec::new();
    }

    let mut seed = 0;
    for i in 1..n {
        if documents[i].score > documents[seed].score {
            seed = i;
        }
    }

    let mut selected = vec![seed];
    let mut remaining: Vec<usize> = (0..n).filter(|&i| i != seed).collect();

    while selected.len() < final_k && !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (pos, &idx) in remaining.iter().enumerate() {
            let max_sim = selected
                .iter()
                .map(|&s| cosine_similarity(&embeddings[idx], &embeddings[s]))
                .fold(f64::NEG_INFINITY, f64::max);
            let score = lambda * documents[idx].score - (1.0 - lambda) * max_sim;
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((pos, score));
            }
        }
        let Some((pos, _)) = best else { break };
        selected.push(remaining.remove(pos));
    }
    selected
}

/// Writes `final_documents`. Always runs; in `never` mode, or without an
/// embedding provider, it truncates to `final_k`.
pub struct MmrStage {
    config: LiveConfig<MmrConfig>,
}

impl MmrStage {
    pub fn new(config: MmrConfig) -> Self {
        Self {
            config: LiveConfig::new(STAGE_MMR, config),
        }
    }
}

impl Default for MmrStage {
    fn default() -> Self {
        Self::new(MmrConfig::default())
    }
}

async fn embed_all(
    embedder: &dyn IEmbeddingProvider,
    documents: &[ScoredDocument],
    timeout_ms: u64,
) -> EvidexResult<Vec<Vec<f32>>> {
    let texts: Vec<String> = documents.iter().map(|d| d.content().to_string()).collect();
    let embeddings = bounded(embedder.name(), timeout_ms, embedder.embed_batch(&texts)).await?;
    if embeddings.len() != texts.len() {
        return Err(ProviderError::MalformedResponse {
            provider: embedder.name().to_string(),
            reason: format!("expected {} embeddings, got {}", texts.len(), embeddings.len()),
        }
        .into());
    }
    Ok(embeddings)
}

struct Selection {
    documents: Vec<ScoredDocument>,
    applied: bool,
    avg_similarity: Option<f64>,
}

impl MmrStage {
    async fn select(
        &self,
        ctx: &mut RetrievalContext,
        candidates: Vec<ScoredDocument>,
        deps: &Dependencies,
        config: &MmrConfig,
    ) -> Selection {
        let truncated = |mut docs: Vec<ScoredDocument>, avg_similarity| {
            docs.truncate(config.final_k);
            Selection {
                documents: docs,
                applied: false,
                avg_similarity,
            }
        };

        if config.mode == MmrMode::Never || candidates.len() < MIN_CANDIDATES {
            return truncated(candidates, None);
        }
        let Some(embedder) = deps.embedder.as_deref() else {
            debug!("no embedding provider bound, truncating to final_k");
            return truncated(candidates, None);
        };

        let mut avg_similarity = None;
        if config.mode == MmrMode::Auto {
            let probe = &candidates[..candidates.len().min(config.probe_size)];
            let avg = match embed_all(embedder, probe, config.embed_timeout_ms).await {
                Ok(embeddings) => mean_pairwise_similarity(&embeddings),
                Err(e) => {
                    degrade(ctx, STAGE_MMR, e, FALLBACK);
                    return truncated(candidates, None);
                }
            };
            avg_similarity = Some(avg);
            debug!(
                avg_similarity = avg,
                threshold = config.similarity_threshold,
                "redundancy probe"
            );
            if avg <= config.similarity_threshold {
                return truncated(candidates, avg_similarity);
            }
        }

        if candidates.len() <= config.final_k {
            return Selection {
                documents: candidates,
                applied: true,
                avg_similarity,
            };
        }

        let embeddings = match embed_all(embedder, &candidates, config.embed_timeout_ms).await {
            Ok(embeddings) => embeddings,
            Err(e) => {
                degrade(ctx, STAGE_MMR, e, FALLBACK);
                return truncated(candidates, avg_similarity);
            }
        };
        let documents = mmr_select(&candidates, &embeddings, config.lambda_mult, config.final_k)
            .into_iter()
            .map(|i| {
                let doc = &candidates[i];
                doc.rescored(doc.score, Provenance::Mmr)
                    .annotate(ANNOTATION_MMR_SELECTED, true)
            })
            .collect();
        Selection {
            documents,
            applied: true,
            avg_similarity,
        }
    }
}

#[async_trait]
impl IRetrievalStage for MmrStage {
    fn name(&self) -> &str {
        STAGE_MMR
    }

    async fn execute(&self, ctx: &mut RetrievalContext, deps: &Dependencies) -> EvidexResult<()> {
        let config = self.config.snapshot();
        let candidates = if ctx.truncated_documents.is_empty() {
            ctx.reranked_documents.clone()
        } else {
            ctx.truncated_documents.clone()
        };
        let n_candidates = candidates.len();

        let selection = self.select(ctx, candidates, deps, &config).await;

        info!(
            mode = config.mode.as_str(),
            candidates = n_candidates,
            selected = selection.documents.len(),
            applied = selection.applied,
            "mmr complete"
        );
        ctx.record_stage(
            STAGE_MMR,
            json!({
                "n_results": selection.documents.len(),
                "mode": config.mode.as_str(),
                "applied": selection.applied,
                "avg_similarity": selection.avg_similarity,
            }),
        );
        ctx.final_documents = selection.documents;
        Ok(())
    }

    fn get_config(&self) -> Value {
        self.config.to_value()
    }

    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.config.patch(param, value)
    }
}
