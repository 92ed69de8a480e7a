use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use evidex_core::errors::EvidexResult;
use evidex_core::models::Passage;
use evidex_core::traits::{IVectorStore, VectorHit};

use super::embedder::HashingEmbedder;
use super::failure;

/// Brute-force cosine-distance index over hashed embeddings.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    embedder: HashingEmbedder,
    entries: RwLock<Vec<(Passage, Vec<f32>)>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            embedder: HashingEmbedder::default(),
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn with_passages(passages: impl IntoIterator<Item = Passage>) -> Self {
        let store = Self::new();
        for passage in passages {
            store.add(passage);
        }
        store
    }

    pub fn add(&self, passage: Passage) {
        let embedding = self.embedder.vector(&passage.content);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((passage, embedding));
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    // Both sides are unit length or zero.
    (1.0 - f64::from(dot)).max(0.0)
}

#[async_trait]
impl IVectorStore for InMemoryVectorStore {
    async fn search(&self, query: &str, k: usize) -> EvidexResult<Vec<VectorHit>> {
        let q = self.embedder.vector(query);
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut hits: Vec<VectorHit> = entries
            .iter()
            .map(|(p, e)| VectorHit::new(p.clone(), cosine_distance(&q, e)))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn documents(&self, limit: Option<usize>) -> EvidexResult<Vec<Passage>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let n = limit.unwrap_or(entries.len());
        Ok(entries.iter().take(n).map(|(p, _)| p.clone()).collect())
    }
}

/// Returns the same hits for every query.
#[derive(Debug, Clone)]
pub struct StaticVectorStore {
    hits: Vec<VectorHit>,
}

impl StaticVectorStore {
    pub fn new(hits: Vec<VectorHit>) -> Self {
        Self { hits }
    }
}

#[async_trait]
impl IVectorStore for StaticVectorStore {
    async fn search(&self, _query: &str, k: usize) -> EvidexResult<Vec<VectorHit>> {
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    fn len(&self) -> usize {
        self.hits.len()
    }

    async fn documents(&self, limit: Option<usize>) -> EvidexResult<Vec<Passage>> {
        let n = limit.unwrap_or(self.hits.len());
        Ok(self.hits.iter().take(n).map(|h| h.passage.clone()).collect())
    }
}

/// Reports `len` passages but fails every read.
#[derive(Debug, Clone)]
pub struct FailingVectorStore {
    len: usize,
}

impl FailingVectorStore {
    pub fn new(len: usize) -> Self {
        Self { len }
    }
}

#[async_trait]
impl IVectorStore for FailingVectorStore {
    async fn search(&self, _query: &str, _k: usize) -> EvidexResult<Vec<VectorHit>> {
        Err(failure("failing_store", "index offline"))
    }

    fn len(&self) -> usize {
        self.len
    }

    async fn documents(&self, _limit: Option<usize>) -> EvidexResult<Vec<Passage>> {
        Err(failure("failing_store", "index offline"))
    }
}

/// Delays reads on the wrapped store. By default every `search` is delayed
/// and `documents` is not.
pub struct DelayedVectorStore<S> {
    inner: S,
    search_delay: Duration,
    documents_delay: Duration,
    slow_queries: Option<String>,
}

impl<S> DelayedVectorStore<S> {
    pub fn new(inner: S, search_delay: Duration) -> Self {
        Self {
            inner,
            search_delay,
            documents_delay: Duration::ZERO,
            slow_queries: None,
        }
    }

    /// Also delay corpus snapshot reads.
    pub fn with_documents_delay(mut self, delay: Duration) -> Self {
        self.documents_delay = delay;
        self
    }

    /// Delay `search` only for queries containing `needle`.
    pub fn only_for(mut self, needle: impl Into<String>) -> Self {
        self.slow_queries = Some(needle.into());
        self
    }
}

#[async_trait]
impl<S: IVectorStore> IVectorStore for DelayedVectorStore<S> {
    async fn search(&self, query: &str, k: usize) -> EvidexResult<Vec<VectorHit>> {
        let slow = self
            .slow_queries
            .as_deref()
            .map_or(true, |needle| query.contains(needle));
        if slow {
            tokio::time::sleep(self.search_delay).await;
        }
        self.inner.search(query, k).await
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    async fn documents(&self, limit: Option<usize>) -> EvidexResult<Vec<Passage>> {
        tokio::time::sleep(self.documents_delay).await;
        self.inner.documents(limit).await
    }
}
