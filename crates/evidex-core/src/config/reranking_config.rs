use serde::{Deserialize, Serialize};

use super::defaults;
use super::StageConfig;

/// Pairwise reranking stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankingConfig {
    pub enabled: bool,
    /// Documents kept after reranking (or after the unscored passthrough).
    pub top_k: usize,
    /// Pairs per scorer call.
    pub batch_size: usize,
    /// Upper bound on a single scorer call.
    pub timeout_ms: u64,
}

impl Default for RerankingConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_RERANKING_ENABLED,
            top_k: defaults::DEFAULT_RERANK_TOP_K,
            batch_size: defaults::DEFAULT_RERANK_BATCH_SIZE,
            timeout_ms: defaults::DEFAULT_RERANK_TIMEOUT_MS,
        }
    }
}

impl StageConfig for RerankingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be positive".into());
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be positive".into());
        }
        Ok(())
    }
}
