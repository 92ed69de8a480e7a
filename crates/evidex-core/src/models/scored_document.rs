use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Passage;

/// Which stage or retrieval method assigned a document's score.
///
/// Scores are only comparable between documents with the same provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// `1 / (1 + distance)` from the vector index.
    Dense,
    /// BM25 score.
    Lexical,
    /// Cumulative reciprocal-rank score.
    RrfFusion,
    /// Pairwise relevance score.
    Reranker,
    /// Chosen by diversity selection; score carried over from upstream.
    Mmr,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Lexical => "lexical",
            Self::RrfFusion => "rrf_fusion",
            Self::Reranker => "reranker",
            Self::Mmr => "mmr",
        }
    }
}

/// A passage with a stage-local relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub passage: Passage,
    pub score: f64,
    pub provenance: Provenance,
    /// Per-stage diagnostics (contributing lists, pre-rerank score, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub annotations: Map<String, Value>,
}

impl ScoredDocument {
    pub fn new(passage: Passage, score: f64, provenance: Provenance) -> Self {
        Self {
            passage,
            score,
            provenance,
            annotations: Map::new(),
        }
    }

    /// Re-score under a new provenance, keeping the passage and annotations.
    pub fn rescored(&self, score: f64, provenance: Provenance) -> Self {
        Self {
            passage: self.passage.clone(),
            score,
            provenance,
            annotations: self.annotations.clone(),
        }
    }

    pub fn annotate(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn content(&self) -> &str {
        &self.passage.content
    }

    pub fn source(&self) -> &str {
        &self.passage.source
    }

    /// Descending score order. NaN sorts last.
    pub fn cmp_score_desc(a: &Self, b: &Self) -> std::cmp::Ordering {
        sort_key(b.score).total_cmp(&sort_key(a.score))
    }

    /// Stable descending sort by score. Equal scores keep their input order.
    pub fn sort_desc(documents: &mut [Self]) {
        documents.sort_by(Self::cmp_score_desc);
    }
}

fn sort_key(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}
