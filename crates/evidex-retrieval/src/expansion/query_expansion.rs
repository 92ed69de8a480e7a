//! Generator-driven query expansion.
//!
//! Asks the injected short-text generator for paraphrases of the user query
//! and keeps up to `n_subqueries` distinct ones. Any generator problem falls
//! back to the original query alone.

use async_trait::async_trait;
use evidex_core::config::{LiveConfig, QueryExpansionConfig};
use evidex_core::constants::STAGE_QUERY_EXPANSION;
use evidex_core::errors::{ConfigError, EvidexResult, ProviderError};
use evidex_core::models::RetrievalContext;
use evidex_core::traits::{Dependencies, IRetrievalStage};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::fallback::{bounded, degrade};

const FALLBACK: &str = "original query only";

/// Writes `expanded_queries`. Always runs; `enabled = false` yields
/// `[original_query]`.
pub struct QueryExpansionStage {
    config: LiveConfig<QueryExpansionConfig>,
}

impl QueryExpansionStage {
    pub fn new(config: QueryExpansionConfig) -> Self {
        Self {
            config: LiveConfig::new(STAGE_QUERY_EXPANSION, config),
        }
    }
}

impl Default for QueryExpansionStage {
    fn default() -> Self {
        Self::new(QueryExpansionConfig::default())
    }
}

#[async_trait]
impl IRetrievalStage for QueryExpansionStage {
    fn name(&self) -> &str {
        STAGE_QUERY_EXPANSION
    }

    async fn execute(&self, ctx: &mut RetrievalContext, deps: &Dependencies) -> EvidexResult<()> {
        let config = self.config.snapshot();
        let original = ctx.original_query.clone();

        let (queries, generated) = if !config.enabled {
            debug!("query expansion disabled, using original query only");
            (vec![original], false)
        } else {
            match &deps.generator {
                None => {
                    debug!("no text generator bound, using original query only");
                    (vec![original], false)
                }
                Some(generator) => {
                    let prompt = config.render_prompt(&original);
                    let response =
                        bounded(generator.name(), config.timeout_ms, generator.generate(&prompt))
                            .await
                            .and_then(|text| {
                                if text.trim().is_empty() {
                                    Err(ProviderError::MalformedResponse {
                                        provider: generator.name().to_string(),
                                        reason: "empty response".into(),
                                    }
                                    .into())
                                } else {
                                    Ok(text)
                                }
                            });
                    match response {
                        Ok(text) => (
                            parse_subqueries(
                                &original,
                                &text,
                                config.n_subqueries,
                                config.include_original,
                            ),
                            true,
                        ),
                        Err(e) => {
                            degrade(ctx, STAGE_QUERY_EXPANSION, e, FALLBACK);
                            (vec![original], false)
                        }
                    }
                }
            }
        };

        info!(queries = queries.len(), generated, "query expansion complete");
        ctx.record_stage(
            STAGE_QUERY_EXPANSION,
            json!({
                "enabled": config.enabled,
                "generated": generated,
                "n_queries": queries.len(),
                "queries": queries,
            }),
        );
        ctx.expanded_queries = queries;
        Ok(())
    }

    fn get_config(&self) -> Value {
        self.config.to_value()
    }

    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.config.patch(param, value)
    }
}

/// Turn a generator response into the expanded query list.
///
/// One candidate per line, trimmed, list markers stripped, empties dropped,
/// duplicates of already collected queries (the original included) dropped,
/// then at most `n` new queries kept. Never returns an empty list.
pub fn parse_subqueries(
    original: &str,
    response: &str,
    n: usize,
    include_original: bool,
) -> Vec<String> {
    let mut queries: Vec<String> = Vec::with_capacity(n + 1);
    if include_original {
        queries.push(original.to_string());
    }

    let mut added = 0;
    for line in response.lines() {
        if added == n {
            break;
        }
        let candidate = strip_list_marker(line.trim());
        if candidate.is_empty() || candidate == original || queries.iter().any(|q| q == candidate) {
            continue;
        }
        queries.push(candidate.to_string());
        added += 1;
    }

    if queries.is_empty() {
        queries.push(original.to_string());
    }
    queries
}

/// Drop a leading "1.", "2)", "-", "*" or "•" marker.
fn strip_list_marker(line: &str) -> &str {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return stripped.trim_start();
        }
        return line;
    }
    for marker in ["-", "*", "•"] {
        if let Some(stripped) = line.strip_prefix(marker) {
            return stripped.trim_start();
        }
    }
    line
}
