//! First-stage retrieval and fusion.
//!
//! - [`hybrid`]: concurrent dense + lexical search per expanded query
//! - [`lexical_cache`]: fingerprint-guarded BM25 index
//! - [`worker_pool`]: bounded, long-lived task pools with timeouts
//! - [`rrf_fusion`]: reciprocal rank fusion of every ranked list

pub mod hybrid;
pub mod lexical_cache;
pub mod rrf_fusion;
pub mod worker_pool;

pub use hybrid::HybridRetrievalStage;
pub use lexical_cache::LexicalIndexCache;
pub use rrf_fusion::{fuse, RankedList, RrfFusionStage};
pub use worker_pool::{PoolError, WorkerPool};
