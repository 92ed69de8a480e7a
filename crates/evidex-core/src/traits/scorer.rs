use async_trait::async_trait;

use crate::errors::EvidexResult;

/// Pairwise (query, passage) relevance scorer, e.g. a cross-encoder.
#[async_trait]
pub trait IPairwiseScorer: Send + Sync {
    /// One score per pair, same order as `pairs`. Larger is more relevant.
    async fn score_batch(&self, pairs: &[(String, String)]) -> EvidexResult<Vec<f64>>;

    fn name(&self) -> &str;
}
