/// evidex version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Stage identifiers. Used as `stage_metadata` keys and as the `stage` half
/// of `stage__param` configuration keys.
pub const STAGE_QUERY_EXPANSION: &str = "query_expansion";
pub const STAGE_HYBRID_RETRIEVAL: &str = "hybrid_retrieval";
pub const STAGE_RRF_FUSION: &str = "rrf_fusion";
pub const STAGE_RERANKING: &str = "reranking";
pub const STAGE_SCORE_TRUNCATION: &str = "score_truncation";
pub const STAGE_MMR: &str = "mmr";

/// Default stage order.
pub const DEFAULT_STAGE_ORDER: [&str; 6] = [
    STAGE_QUERY_EXPANSION,
    STAGE_HYBRID_RETRIEVAL,
    STAGE_RRF_FUSION,
    STAGE_RERANKING,
    STAGE_SCORE_TRUNCATION,
    STAGE_MMR,
];

/// Separator between stage name and parameter in runtime config keys.
pub const CONFIG_KEY_SEPARATOR: &str = "__";

/// Orchestrator-level `stage_metadata` keys.
pub const METADATA_ERROR: &str = "error";
pub const METADATA_FAILED_STAGE: &str = "failed_stage";
pub const METADATA_TOTAL_DURATION_MS: &str = "total_duration_ms";
pub const METADATA_TIMING: &str = "timing";

/// Annotation keys attached to `ScoredDocument`s by individual stages.
pub const ANNOTATION_ORIGINAL_SOURCES: &str = "original_sources";
pub const ANNOTATION_ORIGINAL_SCORE: &str = "original_score";
pub const ANNOTATION_MMR_SELECTED: &str = "mmr_selected";
