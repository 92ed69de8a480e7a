//! # evidex-retrieval
//!
//! The retrieval pipeline: query expansion, concurrent hybrid dense + BM25
//! search, reciprocal rank fusion, pairwise reranking, confidence-aware
//! score truncation, and MMR diversity selection, sequenced by
//! [`RetrievalOrchestrator`].

pub mod embedding_cache;
pub mod engine;
pub mod expansion;
pub mod ranking;
pub mod search;

mod fallback;

pub use embedding_cache::CachedEmbedder;
pub use engine::RetrievalOrchestrator;
pub use expansion::QueryExpansionStage;
pub use ranking::{MmrStage, RerankingStage, ScoreTruncationStage};
pub use search::{HybridRetrievalStage, RrfFusionStage};
