use serde::{Deserialize, Serialize};

use super::defaults;
use super::StageConfig;

/// Confidence-aware score truncation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreTruncationConfig {
    pub enabled: bool,
    /// A drop between consecutive scores larger than this cuts the tail.
    pub gap_threshold: f64,
    /// Absolute floor. Documents scoring at or below it are dropped.
    pub min_threshold: f64,
}

impl Default for ScoreTruncationConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_TRUNCATION_ENABLED,
            gap_threshold: defaults::DEFAULT_GAP_THRESHOLD,
            min_threshold: defaults::DEFAULT_MIN_THRESHOLD,
        }
    }
}

impl StageConfig for ScoreTruncationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.gap_threshold.is_nan() || self.min_threshold.is_nan() {
            return Err("thresholds must be numbers".into());
        }
        if self.gap_threshold < 0.0 {
            return Err("gap_threshold must not be negative".into());
        }
        Ok(())
    }
}
