//! In-memory embedding cache in front of the injected embedding function.
//!
//! TinyLFU admission, idle and absolute TTLs. Keys are blake3 hashes of the
//! text, so the same passage is embedded once across retrieve calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use evidex_core::errors::{EvidexResult, ProviderError};
use evidex_core::traits::IEmbeddingProvider;
use moka::sync::Cache;

/// Caching decorator for an [`IEmbeddingProvider`].
pub struct CachedEmbedder {
    inner: Arc<dyn IEmbeddingProvider>,
    cache: Cache<String, Arc<Vec<f32>>>,
}

impl CachedEmbedder {
    pub fn new(inner: Arc<dyn IEmbeddingProvider>, max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600)) // 1 hour idle TTL
            .time_to_live(Duration::from_secs(86400)) // 24 hour max TTL
            .build();
        Self { inner, cache }
    }

    /// Number of entries currently in the cache.
    pub fn cached_entries(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    fn key(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }
}

#[async_trait]
impl IEmbeddingProvider for CachedEmbedder {
    async fn embed(&self, text: &str) -> EvidexResult<Vec<f32>> {
        let key = Self::key(text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.as_ref().clone());
        }
        let embedding = self.inner.embed(text).await?;
        self.cache.insert(key, Arc::new(embedding.clone()));
        Ok(embedding)
    }

    /// Embeds only the cache misses, in one batch.
    async fn embed_batch(&self, texts: &[String]) -> EvidexResult<Vec<Vec<f32>>> {
        let keys: Vec<String> = texts.iter().map(|t| Self::key(t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = keys
            .iter()
            .map(|k| self.cache.get(k).map(|hit| hit.as_ref().clone()))
            .collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();
        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let embedded = self.inner.embed_batch(&batch).await?;
            if embedded.len() != batch.len() {
                return Err(ProviderError::MalformedResponse {
                    provider: self.inner.name().to_string(),
                    reason: format!(
                        "expected {} embeddings, got {}",
                        batch.len(),
                        embedded.len()
                    ),
                }
                .into());
            }
            for (i, embedding) in missing.into_iter().zip(embedded) {
                self.cache.insert(keys[i].clone(), Arc::new(embedding.clone()));
                out[i] = Some(embedding);
            }
        }

        Ok(out.into_iter().flatten().collect())
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
