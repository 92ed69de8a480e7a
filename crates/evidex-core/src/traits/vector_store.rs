use async_trait::async_trait;

use crate::errors::EvidexResult;
use crate::models::Passage;

/// One dense search hit. Smaller distance means closer.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub passage: Passage,
    pub distance: f64,
}

impl VectorHit {
    pub fn new(passage: Passage, distance: f64) -> Self {
        Self { passage, distance }
    }

    /// Larger-is-better similarity, `1 / (1 + distance)`.
    pub fn similarity(&self) -> f64 {
        1.0 / (1.0 + self.distance)
    }
}

/// Embedding similarity index over the passage corpus.
///
/// Implementations embed the query themselves and must tolerate
/// concurrent reads.
#[async_trait]
pub trait IVectorStore: Send + Sync {
    /// Nearest `k` passages for `query`, closest first.
    async fn search(&self, query: &str, k: usize) -> EvidexResult<Vec<VectorHit>>;

    /// Number of passages in the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Passages in stable index order, at most `limit` of them if given.
    /// Used to build and fingerprint the lexical index.
    async fn documents(&self, limit: Option<usize>) -> EvidexResult<Vec<Passage>>;
}
