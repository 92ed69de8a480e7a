//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i)
//!
//! Combines every (query, method) ranked list into a single fused ranking
//! without requiring score normalization across retrieval methods.

use std::collections::HashMap;

use async_trait::async_trait;
use evidex_core::config::{LiveConfig, RrfFusionConfig};
use evidex_core::constants::{ANNOTATION_ORIGINAL_SOURCES, STAGE_RRF_FUSION};
use evidex_core::errors::{ConfigError, EvidexResult};
use evidex_core::models::{Passage, Provenance, RetrievalContext, RetrievalMethod, ScoredDocument};
use evidex_core::traits::{Dependencies, IRetrievalStage};
use serde_json::{json, Value};
use tracing::{debug, info};

/// Characters of the query used in a list label.
const LABEL_QUERY_CHARS: usize = 30;

/// One independently ranked input list.
#[derive(Debug, Clone, Copy)]
pub struct RankedList<'a> {
    /// Diagnostic label, `"{query prefix}_{method}"`.
    pub label: &'a str,
    pub documents: &'a [ScoredDocument],
}

struct Entry {
    passage: Passage,
    score: f64,
    sources: Vec<String>,
}

/// Fuse ranked lists with Reciprocal Rank Fusion.
///
/// `k` is the smoothing constant (default 60). Documents are identified by
/// their first `dedup_prefix_chars` characters plus source, so distinct
/// passages sharing a long common prefix and source are merged. Ties keep
/// first-seen order. Returns at most `top_k` documents, each annotated
/// with the labels of the lists it appeared in.
pub fn fuse(
    lists: &[RankedList<'_>],
    k: u32,
    dedup_prefix_chars: usize,
    top_k: usize,
) -> Vec<ScoredDocument> {
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    let mut entries: Vec<Entry> = Vec::new();

    for list in lists {
        for (idx, doc) in list.documents.iter().enumerate() {
            let rank = idx + 1;
            let contribution = 1.0 / (f64::from(k) + rank as f64);
            let key = (doc.passage.content_prefix(dedup_prefix_chars), doc.source());
            let pos = *positions.entry(key).or_insert_with(|| {
                entries.push(Entry {
                    passage: doc.passage.clone(),
                    score: 0.0,
                    sources: Vec::new(),
                });
                entries.len() - 1
            });
            let entry = &mut entries[pos];
            entry.score += contribution;
            entry.sources.push(list.label.to_string());
        }
    }

    // Stable: equal scores keep insertion order.
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    entries.truncate(top_k);

    entries
        .into_iter()
        .map(|entry| {
            ScoredDocument::new(entry.passage, entry.score, Provenance::RrfFusion)
                .annotate(ANNOTATION_ORIGINAL_SOURCES, entry.sources)
        })
        .collect()
}

/// `"{first 30 chars of query}_{method}"`.
pub fn list_label(query: &str, method: RetrievalMethod) -> String {
    let prefix = match query.char_indices().nth(LABEL_QUERY_CHARS) {
        Some((idx, _)) => &query[..idx],
        None => query,
    };
    format!("{prefix}_{method}")
}

/// Writes `fused_documents`. Always runs.
pub struct RrfFusionStage {
    config: LiveConfig<RrfFusionConfig>,
}

impl RrfFusionStage {
    pub fn new(config: RrfFusionConfig) -> Self {
        Self {
            config: LiveConfig::new(STAGE_RRF_FUSION, config),
        }
    }
}

impl Default for RrfFusionStage {
    fn default() -> Self {
        Self::new(RrfFusionConfig::default())
    }
}

#[async_trait]
impl IRetrievalStage for RrfFusionStage {
    fn name(&self) -> &str {
        STAGE_RRF_FUSION
    }

    async fn execute(&self, ctx: &mut RetrievalContext, _deps: &Dependencies) -> EvidexResult<()> {
        let config = self.config.snapshot();

        // Expanded-query order first, then any query only present in the
        // results map; dense before lexical within a query.
        let mut queries: Vec<&str> = ctx.expanded_queries.iter().map(String::as_str).collect();
        for query in ctx.retrieved_results.keys() {
            if !queries.contains(&query.as_str()) {
                queries.push(query);
            }
        }
        let mut seen = Vec::with_capacity(queries.len());
        let mut labelled: Vec<(String, &[ScoredDocument])> = Vec::new();
        for query in queries {
            if seen.contains(&query) {
                continue;
            }
            seen.push(query);
            let Some(by_method) = ctx.retrieved_results.get(query) else {
                continue;
            };
            for (method, documents) in by_method {
                labelled.push((list_label(query, *method), documents.as_slice()));
            }
        }
        let lists: Vec<RankedList<'_>> = labelled
            .iter()
            .map(|(label, documents)| RankedList { label, documents })
            .collect();

        let fused = fuse(&lists, config.k, config.dedup_prefix_chars, config.top_k);
        let input_documents: usize = lists.iter().map(|l| l.documents.len()).sum();

        for (i, doc) in fused.iter().take(5).enumerate() {
            debug!(rank = i + 1, score = doc.score, source = %doc.source(), "fused document");
        }
        info!(
            lists = lists.len(),
            input_documents,
            fused = fused.len(),
            "rrf fusion complete"
        );

        let metadata = json!({
            "n_lists": lists.len(),
            "n_input_documents": input_documents,
            "n_results": fused.len(),
            "k": config.k,
        });
        ctx.record_stage(STAGE_RRF_FUSION, metadata);
        ctx.fused_documents = fused;
        Ok(())
    }

    fn get_config(&self) -> Value {
        self.config.to_value()
    }

    fn update_config(&self, param: &str, value: Value) -> Result<(), ConfigError> {
        self.config.patch(param, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, source: &str) -> ScoredDocument {
        ScoredDocument::new(Passage::new(content, source), 1.0, Provenance::Dense)
    }

    #[test]
    fn single_list_scores_by_rank() {
        let docs = vec![doc("a", "s"), doc("b", "s")];
        let fused = fuse(&[RankedList { label: "l", documents: &docs }], 60, 400, 10);
        assert_eq!(fused.len(), 2);
        assert!((fused[0].score - 1.0 / 61.0).abs() < 1e-12);
        assert!((fused[1].score - 1.0 / 62.0).abs() < 1e-12);
        assert_eq!(fused[0].provenance, Provenance::RrfFusion);
    }

    #[test]
    fn shared_document_accumulates_and_records_sources() {
        let first = vec![doc("a", "s"), doc("b", "s")];
        let second = vec![doc("b", "s")];
        let fused = fuse(
            &[
                RankedList { label: "q_dense", documents: &first },
                RankedList { label: "q_lexical", documents: &second },
            ],
            60,
            400,
            10,
        );
        assert_eq!(fused[0].content(), "b");
        assert!((fused[0].score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-12);
        assert_eq!(
            fused[0].annotations[ANNOTATION_ORIGINAL_SOURCES],
            json!(["q_dense", "q_lexical"])
        );
    }

    #[test]
    fn same_content_different_source_stays_separate() {
        let docs = vec![doc("same", "a.md"), doc("same", "b.md")];
        let fused = fuse(&[RankedList { label: "l", documents: &docs }], 60, 400, 10);
        assert_eq!(fused.len(), 2);
    }

    #[test]
    fn shared_prefix_merges_distinct_passages() {
        let docs = vec![doc("HEADER body one", "s"), doc("HEADER body two", "s")];
        let fused = fuse(&[RankedList { label: "l", documents: &docs }], 60, 6, 10);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].content(), "HEADER body one");
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let first = vec![doc("x", "s")];
        let second = vec![doc("y", "s")];
        let fused = fuse(
            &[
                RankedList { label: "1", documents: &first },
                RankedList { label: "2", documents: &second },
            ],
            60,
            400,
            10,
        );
        assert_eq!(fused[0].content(), "x");
        assert_eq!(fused[1].content(), "y");
    }

    #[test]
    fn truncates_to_top_k() {
        let docs: Vec<_> = (0..20).map(|i| doc(&format!("d{i}"), "s")).collect();
        let fused = fuse(&[RankedList { label: "l", documents: &docs }], 60, 400, 12);
        assert_eq!(fused.len(), 12);
    }

    #[test]
    fn label_truncates_query_on_char_boundary() {
        let long = "x".repeat(40);
        assert_eq!(list_label(&long, RetrievalMethod::Dense), format!("{}_dense", "x".repeat(30)));
        assert_eq!(list_label("检索", RetrievalMethod::Lexical), "检索_lexical");
    }
}
