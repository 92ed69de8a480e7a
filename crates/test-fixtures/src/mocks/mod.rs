//! Deterministic in-memory collaborators for pipeline tests and benches.

mod embedder;
mod generator;
mod scorer;
mod vector_store;

pub use embedder::{FailingEmbedder, HashingEmbedder};
pub use generator::{FailingGenerator, ScriptedGenerator};
pub use scorer::{FailingScorer, KeywordScorer, ScriptedScorer, ShortScorer};
pub use vector_store::{DelayedVectorStore, FailingVectorStore, InMemoryVectorStore, StaticVectorStore};

use evidex_core::errors::{EvidexError, ProviderError};

pub(crate) fn failure(provider: &str, reason: &str) -> EvidexError {
    ProviderError::Failed {
        provider: provider.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
