pub mod defaults;

mod cache_config;
mod expansion_config;
mod fusion_config;
mod hybrid_config;
mod live;
mod mmr_config;
mod observability_config;
mod reranking_config;
mod truncation_config;

pub use cache_config::EmbeddingCacheConfig;
pub use expansion_config::QueryExpansionConfig;
pub use fusion_config::RrfFusionConfig;
pub use hybrid_config::HybridRetrievalConfig;
pub use live::LiveConfig;
pub use mmr_config::{MmrConfig, MmrMode};
pub use observability_config::ObservabilityConfig;
pub use reranking_config::RerankingConfig;
pub use truncation_config::ScoreTruncationConfig;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::errors::ConfigError;

/// Per-stage configuration that can be swapped at runtime.
pub trait StageConfig: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Parameters that are fixed once the stage is built.
    const READ_ONLY: &'static [&'static str] = &[];

    /// Semantic checks beyond what deserialization enforces.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Top-level evidex configuration. Aggregates all per-stage configs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidexConfig {
    pub query_expansion: QueryExpansionConfig,
    pub hybrid_retrieval: HybridRetrievalConfig,
    pub rrf_fusion: RrfFusionConfig,
    pub reranking: RerankingConfig,
    pub score_truncation: ScoreTruncationConfig,
    pub mmr: MmrConfig,
    pub embedding_cache: EmbeddingCacheConfig,
    pub observability: ObservabilityConfig,
}

impl EvidexConfig {
    /// Load config from a TOML string. Missing fields use defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Run every stage section's semantic checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(constants::STAGE_QUERY_EXPANSION, &self.query_expansion)?;
        check(constants::STAGE_HYBRID_RETRIEVAL, &self.hybrid_retrieval)?;
        check(constants::STAGE_RRF_FUSION, &self.rrf_fusion)?;
        check(constants::STAGE_RERANKING, &self.reranking)?;
        check(constants::STAGE_SCORE_TRUNCATION, &self.score_truncation)?;
        check(constants::STAGE_MMR, &self.mmr)?;
        Ok(())
    }
}

fn check<T: StageConfig>(stage: &str, config: &T) -> Result<(), ConfigError> {
    config
        .validate()
        .map_err(|reason| ConfigError::InvalidValue {
            stage: stage.to_string(),
            param: "*".to_string(),
            reason,
        })
}
