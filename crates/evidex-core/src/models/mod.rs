mod degradation_event;
mod passage;
mod retrieval_context;
mod scored_document;

pub use degradation_event::DegradationEvent;
pub use passage::Passage;
pub use retrieval_context::{RetrievalContext, RetrievalMethod, RetrievalResults, StageMetadata};
pub use scored_document::{Provenance, ScoredDocument};
