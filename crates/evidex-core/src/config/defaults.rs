// Single source of truth for all default values.

// --- Query expansion ---
pub const DEFAULT_EXPANSION_ENABLED: bool = true;
pub const DEFAULT_EXPANSION_N_SUBQUERIES: usize = 2;
pub const DEFAULT_EXPANSION_INCLUDE_ORIGINAL: bool = true;
pub const DEFAULT_EXPANSION_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_EXPANSION_PROMPT_TEMPLATE: &str = "You help a search engine find passages that answer a question.\n\
Write {n} alternative search queries for the question below. Each query should \
approach the question from a different angle or target a different part of it.\n\
Return one query per line with no numbering and no other text.\n\n\
Question: {query}";

// --- Hybrid retrieval ---
pub const DEFAULT_TOP_K_PER_QUERY: usize = 15;
pub const DEFAULT_QUERY_WORKERS: usize = 8;
pub const DEFAULT_METHOD_WORKERS: usize = 4;
pub const DEFAULT_METHOD_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_FINGERPRINT_SAMPLE_SIZE: usize = 100;
pub const DEFAULT_FINGERPRINT_PREFIX_CHARS: usize = 100;

// --- RRF fusion ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_RRF_TOP_K: usize = 12;
pub const DEFAULT_DEDUP_PREFIX_CHARS: usize = 400;

// --- Reranking ---
pub const DEFAULT_RERANKING_ENABLED: bool = true;
pub const DEFAULT_RERANK_TOP_K: usize = 8;
pub const DEFAULT_RERANK_BATCH_SIZE: usize = 32;
pub const DEFAULT_RERANK_TIMEOUT_MS: u64 = 30_000;

// --- Score truncation ---
pub const DEFAULT_TRUNCATION_ENABLED: bool = true;
pub const DEFAULT_GAP_THRESHOLD: f64 = 5.0;
pub const DEFAULT_MIN_THRESHOLD: f64 = -6.0;

// --- MMR ---
pub const DEFAULT_MMR_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MMR_LAMBDA: f64 = 0.7;
pub const DEFAULT_MMR_FINAL_K: usize = 5;
pub const DEFAULT_MMR_PROBE_SIZE: usize = 10;
pub const DEFAULT_MMR_EMBED_TIMEOUT_MS: u64 = 30_000;

// --- Embedding cache ---
pub const DEFAULT_EMBEDDING_CACHE_CAPACITY: u64 = 10_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
