use std::sync::Arc;

use super::{IEmbeddingProvider, IPairwiseScorer, ITextGenerator, IVectorStore};

/// The external collaborators a retrieval call may use.
///
/// Every handle is optional. A stage whose collaborator is missing takes the
/// same fallback it would take on failure, without recording a degradation.
#[derive(Clone, Default)]
pub struct Dependencies {
    pub vector_store: Option<Arc<dyn IVectorStore>>,
    pub embedder: Option<Arc<dyn IEmbeddingProvider>>,
    pub generator: Option<Arc<dyn ITextGenerator>>,
    pub scorer: Option<Arc<dyn IPairwiseScorer>>,
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector_store(mut self, store: Arc<dyn IVectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn ITextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn IPairwiseScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("vector_store", &self.vector_store.as_ref().map(|s| s.len()))
            .field("embedder", &self.embedder.as_ref().map(|e| e.name().to_string()))
            .field("generator", &self.generator.as_ref().map(|g| g.name().to_string()))
            .field("scorer", &self.scorer.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}
