use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{DegradationEvent, Passage, Provenance, ScoredDocument};
use crate::constants;

/// A first-stage retrieval method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    /// Embedding similarity search against the vector index.
    Dense,
    /// BM25 term scoring against the lexical index.
    Lexical,
}

impl RetrievalMethod {
    /// Both methods, in fusion order.
    pub const ALL: [Self; 2] = [Self::Dense, Self::Lexical];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dense => "dense",
            Self::Lexical => "lexical",
        }
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            Self::Dense => Provenance::Dense,
            Self::Lexical => Provenance::Lexical,
        }
    }
}

impl std::fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// query -> method -> ranked candidates.
pub type RetrievalResults = BTreeMap<String, BTreeMap<RetrievalMethod, Vec<ScoredDocument>>>;

/// stage name -> diagnostics.
pub type StageMetadata = Map<String, Value>;

/// Container threaded through every stage of one retrieval call.
///
/// Each field is written by exactly one stage and read only by stages
/// downstream of it. Nothing here outlives the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalContext {
    /// Correlates log lines of one call.
    pub request_id: Uuid,
    pub original_query: String,
    /// Written by query expansion.
    pub expanded_queries: Vec<String>,
    /// Written by hybrid retrieval.
    pub retrieved_results: RetrievalResults,
    /// Written by RRF fusion.
    pub fused_documents: Vec<ScoredDocument>,
    /// Written by reranking.
    pub reranked_documents: Vec<ScoredDocument>,
    /// Written by score truncation.
    pub truncated_documents: Vec<ScoredDocument>,
    /// Written by MMR. The pipeline's output.
    pub final_documents: Vec<ScoredDocument>,
    /// Written by score truncation. Starts out true: no evidence has been
    /// confirmed until truncation has looked at the scores.
    pub low_confidence: bool,
    pub stage_metadata: StageMetadata,
    /// Collaborator failures absorbed during this call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<DegradationEvent>,
}

impl RetrievalContext {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            original_query: query.into(),
            expanded_queries: Vec::new(),
            retrieved_results: RetrievalResults::new(),
            fused_documents: Vec::new(),
            reranked_documents: Vec::new(),
            truncated_documents: Vec::new(),
            final_documents: Vec::new(),
            low_confidence: true,
            stage_metadata: StageMetadata::new(),
            degradations: Vec::new(),
        }
    }

    /// Attach a stage's diagnostics under its name.
    pub fn record_stage(&mut self, stage: &str, metadata: Value) {
        self.stage_metadata.insert(stage.to_string(), metadata);
    }

    /// Record that a stage fell back after a collaborator failure.
    pub fn record_degradation(&mut self, event: DegradationEvent) {
        self.degradations.push(event);
    }

    /// Error recorded by the orchestrator if a stage aborted the pipeline.
    pub fn error(&self) -> Option<&str> {
        self.stage_metadata
            .get(constants::METADATA_ERROR)
            .and_then(Value::as_str)
    }

    /// Candidates for one (query, method) pair. Empty if absent.
    pub fn results_for(&self, query: &str, method: RetrievalMethod) -> &[ScoredDocument] {
        self.retrieved_results
            .get(query)
            .and_then(|by_method| by_method.get(&method))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Final passages in rank order, for the answer-generation step.
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.final_documents.iter().map(|d| &d.passage)
    }
}
