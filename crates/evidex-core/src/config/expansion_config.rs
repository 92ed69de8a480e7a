use serde::{Deserialize, Serialize};

use super::defaults;
use super::StageConfig;

/// Query expansion stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryExpansionConfig {
    /// When false the stage emits `[original_query]` only.
    pub enabled: bool,
    /// Number of generated sub-queries to keep.
    pub n_subqueries: usize,
    /// Keep the original query at the head of the expanded list.
    pub include_original: bool,
    /// Upper bound on a single generator call.
    pub timeout_ms: u64,
    /// Instruction prompt. `{n}` and `{query}` are substituted.
    pub prompt_template: String,
}

impl Default for QueryExpansionConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_EXPANSION_ENABLED,
            n_subqueries: defaults::DEFAULT_EXPANSION_N_SUBQUERIES,
            include_original: defaults::DEFAULT_EXPANSION_INCLUDE_ORIGINAL,
            timeout_ms: defaults::DEFAULT_EXPANSION_TIMEOUT_MS,
            prompt_template: defaults::DEFAULT_EXPANSION_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl QueryExpansionConfig {
    /// Render the instruction prompt for a query.
    pub fn render_prompt(&self, query: &str) -> String {
        self.prompt_template
            .replace("{n}", &self.n_subqueries.to_string())
            .replace("{query}", query)
    }
}

impl StageConfig for QueryExpansionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be positive".into());
        }
        if !self.prompt_template.contains("{query}") {
            return Err("prompt_template must contain {query}".into());
        }
        Ok(())
    }
}
