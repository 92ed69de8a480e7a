//! # evidex-core
//!
//! Foundation crate for the evidex retrieval pipeline.
//! Defines the data model threaded through every stage, the traits for the
//! external collaborators (vector index, embedder, generator, pairwise scorer),
//! the stage contract, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::EvidexConfig;
pub use errors::{EvidexError, EvidexResult};
pub use models::{
    DegradationEvent, Passage, Provenance, RetrievalContext, RetrievalMethod, ScoredDocument,
};
pub use traits::{
    Dependencies, IEmbeddingProvider, IPairwiseScorer, IRetrievalStage, ITextGenerator,
    IVectorStore,
};
