//! Confidence-aware score truncation.
//!
//! Drops documents at or below an absolute floor, then cuts the tail at the
//! first relevance cliff (a drop between consecutive scores larger than the
//! gap threshold). Never returns an empty list for non-empty input.

use async_trait::async_trait;
use evidex_core::config::{LiveConfig, ScoreTruncationConfig};
use evidex_core::constants::STAGE_SCORE_TRUNCATION;
use evidex_core::errors::{ConfigError, EvidexResult};
use evidex_core::models::{RetrievalContext, ScoredDocument};
use evidex_core::traits::{Dependencies, IRetrievalStage};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Outcome of [`truncate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Truncation {
    pub documents: Vec<ScoredDocument>,
    pub low_confidence: bool,
    /// True when nothing passed the filters and the top input document was
    /// kept on its own.
    pub fell_back: bool,
}

/// Apply the floor and gap rules to `documents`.
pub fn truncate(documents: &[ScoredDocument], config: &ScoreTruncationConfig) -> Truncation {
    let floor = config.min_threshold;

    let Some(top) = highest(documents) else {
        return Truncation {
            documents: Vec::new(),
            low_confidence: true,
            fell_back: false,
        };
    };

    if !config.enabled {
        return Truncation {
            documents: documents.to_vec(),
            low_confidence: !(top.score > floor),
            fell_back: false,
        };
    }

    let mut survivors: Vec<&ScoredDocument> =
        documents.iter().filter(|d| d.score > floor).collect();
    survivors.sort_by(|a, b| ScoredDocument::cmp_score_desc(a, b));

    let mut kept: Vec<ScoredDocument> = Vec::with_capacity(survivors.len());
    for (i, doc) in survivors.iter().enumerate() {
        kept.push((*doc).clone());
        if let Some(next) = survivors.get(i + 1) {
            let gap = doc.score - next.score;
            if gap > config.gap_threshold {
                debug!(
                    from = doc.score,
                    to = next.score,
                    gap,
                    threshold = config.gap_threshold,
                    "score cliff detected"
                );
                break;
            }
        }
    }

    match kept.first() {
        Some(first) => Truncation {
            low_confidence: !(first.score > floor),
            documents: kept,
            fell_back: false,
        },
        None => Truncation {
            documents: vec![top.clone()],
            low_confidence: true,
            fell_back: true,
        },
    }
}

/// First document with the maximum score. NaN never wins over a number.
fn highest(documents: &[ScoredDocument]) -> Option<&ScoredDocument> {
    documents.iter().reduce(|best, doc| {
        if ScoredDocument::cmp_score_desc(doc, best).is_lt() {
            doc
        } else {
            best
        }
    })
}

/// Writes `truncated_documents` and `low_confidence`. Always runs; when
/// disabled it passes the reranked list through unchanged.
pub struct ScoreTruncationStage {
    config: LiveConfig<ScoreTruncationConfig>,
}

impl ScoreTruncationStage {
    pub fn new(config: ScoreTruncationConfig) -> Self {
        Self {
            config: LiveConfig::new(STAGE_SCORE_TRUNCATION, config),
        }
    }
}

impl Default for ScoreTruncationStage {
    fn default() -> Self {
        Self::new(ScoreTruncationConfig::default())
    }
}

#[async_trait]
impl IRetrievalStage for ScoreTruncationStage {
    fn name(&self) -> &str {
        STAGE_SCORE_TRUNCATION
    }

    async fn execute(&self, ctx: &mut RetrievalContext, _deps: &Dependencies) -> EvidexResult<()> {
        let config = self.config.snapshot();
        let original_count = ctx.reranked_documents.len();
        let outcome = truncate(&ctx.reranked_documents, &config);

        info!(
            before = original_count,
            after = outcome.documents.len(),
            low_confidence = outcome.low_confidence,
            fell_back = outcome.fell_back,
            "score truncation complete"
        );
        ctx.record_stage(
            STAGE_SCORE_TRUNCATION,
            json!({
                "enabled": config.enabled,
                "original_count": original_count,
                "truncated_count": outcome.documents.len(),
                "low_confidence": outcome.low_confidence,
                "fell_back": outcome.fell_back,
                "gap_threshold": config.gap_threshold,
                "min_threshold": config.min_threshold,
            }),
        );
        ctx.low_confidence = outcome.low_confidence;
        ctx.truncated_documents = outcome.documents;
        Ok(())
    }

    fn get_config(&self) -> Value {
        self.config.to_value()
    }

    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.config.patch(param, value)
    }
}
