//! Lazily rebuilt BM25 index over the vector store's corpus.
//!
//! Each refresh hashes the corpus size and a bounded sample of content
//! prefixes. Only a changed fingerprint triggers a full rebuild, which runs
//! on the blocking thread pool. A failed refresh keeps the previous index.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use evidex_core::errors::{EvidexResult, ProviderError};
use evidex_core::traits::IVectorStore;
use evidex_lexical::{corpus_fingerprint, Bm25Index};
use evidex_observability::tracing_setup::events;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Clone)]
struct Snapshot {
    fingerprint: String,
    index: Arc<Bm25Index>,
}

/// The current lexical index and the fingerprint it was built from.
///
/// Up-to-date checks only read the snapshot. The rebuild mutex is taken
/// only when the fingerprint changed, so one rebuild serves every caller
/// waiting on it.
#[derive(Default)]
pub struct LexicalIndexCache {
    snapshot: RwLock<Option<Snapshot>>,
    rebuild: Mutex<()>,
}

impl LexicalIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index built by the last successful refresh, if any.
    pub fn current(&self) -> Option<Arc<Bm25Index>> {
        self.read().map(|s| s.index)
    }

    pub fn fingerprint(&self) -> Option<String> {
        self.read().map(|s| s.fingerprint)
    }

    fn read(&self) -> Option<Snapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, snapshot: Option<Snapshot>) {
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    fn matching(&self, fingerprint: &str) -> Option<Arc<Bm25Index>> {
        self.read()
            .filter(|s| s.fingerprint == fingerprint)
            .map(|s| s.index)
    }

    /// Bring the index in line with the store's corpus and return it.
    /// `None` means the corpus is empty.
    pub async fn refresh(
        &self,
        store: &Arc<dyn IVectorStore>,
        sample_size: usize,
        prefix_chars: usize,
    ) -> EvidexResult<Option<Arc<Bm25Index>>> {
        let total = store.len();
        if total == 0 {
            self.write(None);
            return Ok(None);
        }

        let sample = store.documents(Some(sample_size)).await?;
        let fingerprint = corpus_fingerprint(total, &sample, prefix_chars);
        if let Some(index) = self.matching(&fingerprint) {
            debug!(fingerprint = %fingerprint, "lexical index up to date");
            return Ok(Some(index));
        }

        let _rebuild = self.rebuild.lock().await;
        // Another caller may have finished the same rebuild while we waited.
        if let Some(index) = self.matching(&fingerprint) {
            return Ok(Some(index));
        }

        let started = Instant::now();
        let corpus = store.documents(None).await?;
        let index = tokio::task::spawn_blocking(move || Bm25Index::build(corpus))
            .await
            .map_err(|e| ProviderError::Failed {
                provider: "lexical_index".to_string(),
                reason: e.to_string(),
            })?;
        let index = Arc::new(index);

        events::lexical_index_rebuilt(
            index.len(),
            &fingerprint,
            started.elapsed().as_secs_f64() * 1000.0,
        );
        self.write(Some(Snapshot {
            fingerprint,
            index: Arc::clone(&index),
        }));
        Ok(Some(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidex_core::models::Passage;
    use evidex_core::traits::VectorHit;

    struct Corpus(Vec<Passage>);

    #[async_trait::async_trait]
    impl IVectorStore for Corpus {
        async fn search(&self, _query: &str, _k: usize) -> EvidexResult<Vec<VectorHit>> {
            Ok(Vec::new())
        }

        fn len(&self) -> usize {
            self.0.len()
        }

        async fn documents(&self, limit: Option<usize>) -> EvidexResult<Vec<Passage>> {
            Ok(self.0.iter().take(limit.unwrap_or(self.0.len())).cloned().collect())
        }
    }

    #[tokio::test]
    async fn empty_corpus_clears_index() {
        let cache = LexicalIndexCache::new();
        let store: Arc<dyn IVectorStore> =
            Arc::new(Corpus(vec![Passage::new("borrow checker", "a.md")]));
        assert!(cache.refresh(&store, 10, 100).await.unwrap().is_some());
        assert!(cache.fingerprint().is_some());

        let empty: Arc<dyn IVectorStore> = Arc::new(Corpus(Vec::new()));
        assert!(cache.refresh(&empty, 10, 100).await.unwrap().is_none());
        assert!(cache.current().is_none());
        assert!(cache.fingerprint().is_none());
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_index() {
        let cache = Arc::new(LexicalIndexCache::new());
        let store: Arc<dyn IVectorStore> = Arc::new(Corpus(vec![
            Passage::new("ownership moves values", "a.md"),
            Passage::new("borrowing lends references", "b.md"),
        ]));
        let refreshes = (0..4).map(|_| {
            let cache = Arc::clone(&cache);
            let store = Arc::clone(&store);
            tokio::spawn(async move { cache.refresh(&store, 10, 100).await.unwrap().unwrap() })
        });
        let indexes: Vec<_> = futures::future::join_all(refreshes)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let current = cache.current().unwrap();
        assert!(indexes.iter().all(|i| Arc::ptr_eq(i, &current)));
    }
}
