mod dependencies;
mod embedding;
mod generator;
mod scorer;
mod stage;
mod vector_store;

pub use dependencies::Dependencies;
pub use embedding::IEmbeddingProvider;
pub use generator::ITextGenerator;
pub use scorer::IPairwiseScorer;
pub use stage::IRetrievalStage;
pub use vector_store::{IVectorStore, VectorHit};
