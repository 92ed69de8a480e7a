use serde::{Deserialize, Serialize};

use super::defaults;
use super::StageConfig;

/// Reciprocal Rank Fusion stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RrfFusionConfig {
    /// Smoothing constant in `1 / (k + rank)`.
    pub k: u32,
    /// Number of fused documents kept.
    pub top_k: usize,
    /// Content prefix length used in the dedup key.
    pub dedup_prefix_chars: usize,
}

impl Default for RrfFusionConfig {
    fn default() -> Self {
        Self {
            k: defaults::DEFAULT_RRF_K,
            top_k: defaults::DEFAULT_RRF_TOP_K,
            dedup_prefix_chars: defaults::DEFAULT_DEDUP_PREFIX_CHARS,
        }
    }
}

impl StageConfig for RrfFusionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.dedup_prefix_chars == 0 {
            return Err("dedup_prefix_chars must be positive".into());
        }
        Ok(())
    }
}
