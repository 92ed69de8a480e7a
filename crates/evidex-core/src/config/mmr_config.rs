use serde::{Deserialize, Serialize};

use super::defaults;
use super::StageConfig;

/// When the MMR stage applies diversity selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MmrMode {
    /// Apply only when the candidates look redundant.
    #[default]
    Auto,
    Always,
    /// Plain truncation to `final_k`.
    Never,
}

impl MmrMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Always => "always",
            Self::Never => "never",
        }
    }
}

/// Maximal Marginal Relevance stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MmrConfig {
    pub mode: MmrMode,
    /// `auto` applies MMR when the probe's mean pairwise similarity exceeds this.
    pub similarity_threshold: f64,
    /// Relevance weight λ in `λ·rel − (1−λ)·max_sim`.
    pub lambda_mult: f64,
    /// Size of the final passage set.
    pub final_k: usize,
    /// Leading candidates sampled by the `auto` similarity probe.
    pub probe_size: usize,
    /// Upper bound on a single embedding call.
    pub embed_timeout_ms: u64,
}

impl Default for MmrConfig {
    fn default() -> Self {
        Self {
            mode: MmrMode::default(),
            similarity_threshold: defaults::DEFAULT_MMR_SIMILARITY_THRESHOLD,
            lambda_mult: defaults::DEFAULT_MMR_LAMBDA,
            final_k: defaults::DEFAULT_MMR_FINAL_K,
            probe_size: defaults::DEFAULT_MMR_PROBE_SIZE,
            embed_timeout_ms: defaults::DEFAULT_MMR_EMBED_TIMEOUT_MS,
        }
    }
}

impl StageConfig for MmrConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.lambda_mult) {
            return Err(format!(
                "lambda_mult must be in [0.0, 1.0], got {}",
                self.lambda_mult
            ));
        }
        if self.probe_size < 2 {
            return Err("probe_size must be at least 2".into());
        }
        if self.embed_timeout_ms == 0 {
            return Err("embed_timeout_ms must be positive".into());
        }
        Ok(())
    }
}
