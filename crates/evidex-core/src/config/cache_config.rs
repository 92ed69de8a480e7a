use serde::{Deserialize, Serialize};

use super::defaults;

/// Passage embedding cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingCacheConfig {
    /// Maximum cached embeddings. Zero disables the cache.
    pub capacity: u64,
}

impl Default for EmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::DEFAULT_EMBEDDING_CACHE_CAPACITY,
        }
    }
}
