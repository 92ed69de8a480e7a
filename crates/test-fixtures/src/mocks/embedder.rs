use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use evidex_core::errors::EvidexResult;
use evidex_core::traits::IEmbeddingProvider;

use super::failure;

/// Hashes terms into fixed-dimension buckets, weighted by term frequency and
/// L2-normalized. Texts sharing words get similar vectors.
#[derive(Debug)]
pub struct HashingEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Texts embedded so far, counting each text in a batch.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// FNV-1a bucket for a term.
    fn bucket(&self, term: &str) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % self.dimensions
    }

    pub fn vector(&self, text: &str) -> Vec<f32> {
        let mut tf: HashMap<String, f32> = HashMap::new();
        for term in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
        {
            *tf.entry(term.to_lowercase()).or_default() += 1.0;
        }

        let mut vec = vec![0.0f32; self.dimensions];
        for (term, count) in &tf {
            vec[self.bucket(term)] += count;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl IEmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> EvidexResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vector(text))
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

/// Every call fails.
#[derive(Debug, Default)]
pub struct FailingEmbedder;

#[async_trait]
impl IEmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> EvidexResult<Vec<f32>> {
        Err(failure("failing_embedder", "embedding service unavailable"))
    }

    fn name(&self) -> &str {
        "failing_embedder"
    }
}
