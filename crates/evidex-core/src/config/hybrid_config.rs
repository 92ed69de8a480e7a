use serde::{Deserialize, Serialize};

use super::defaults;
use super::StageConfig;

/// Hybrid (dense + lexical) retrieval stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridRetrievalConfig {
    /// Candidates requested from each method for each expanded query.
    pub top_k_per_query: usize,
    /// Size of the per-query worker pool. Fixed once the stage is built.
    pub query_workers: usize,
    /// Size of the per-method worker pool. Fixed once the stage is built.
    pub method_workers: usize,
    /// Timeout for one (query, method) retrieval.
    pub method_timeout_ms: u64,
    /// Timeout for one query's whole task, both methods included.
    pub query_timeout_ms: u64,
    /// Number of leading documents hashed into the corpus fingerprint.
    pub fingerprint_sample_size: usize,
    /// Characters of each sampled document hashed into the fingerprint.
    pub fingerprint_prefix_chars: usize,
}

impl Default for HybridRetrievalConfig {
    fn default() -> Self {
        Self {
            top_k_per_query: defaults::DEFAULT_TOP_K_PER_QUERY,
            query_workers: defaults::DEFAULT_QUERY_WORKERS,
            method_workers: defaults::DEFAULT_METHOD_WORKERS,
            method_timeout_ms: defaults::DEFAULT_METHOD_TIMEOUT_MS,
            query_timeout_ms: defaults::DEFAULT_QUERY_TIMEOUT_MS,
            fingerprint_sample_size: defaults::DEFAULT_FINGERPRINT_SAMPLE_SIZE,
            fingerprint_prefix_chars: defaults::DEFAULT_FINGERPRINT_PREFIX_CHARS,
        }
    }
}

impl StageConfig for HybridRetrievalConfig {
    const READ_ONLY: &'static [&'static str] = &["query_workers", "method_workers"];

    fn validate(&self) -> Result<(), String> {
        if self.query_workers == 0 || self.method_workers == 0 {
            return Err("worker pools need at least one worker".into());
        }
        if self.method_timeout_ms == 0 || self.query_timeout_ms == 0 {
            return Err("timeouts must be positive".into());
        }
        Ok(())
    }
}
