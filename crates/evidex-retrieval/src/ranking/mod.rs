//! Second-stage ranking: pairwise reranking, confidence-aware truncation,
//! and MMR diversity selection.

pub mod mmr;
pub mod reranker;
pub mod similarity;
pub mod truncation;

pub use mmr::{mmr_select, MmrStage};
pub use reranker::RerankingStage;
pub use truncation::{truncate, ScoreTruncationStage, Truncation};
