use std::collections::HashMap;

use async_trait::async_trait;
use evidex_core::errors::EvidexResult;
use evidex_core::traits::IPairwiseScorer;

use super::failure;

/// Scores a pair by how many distinct query words occur in the passage,
/// minus a constant so unrelated passages land below zero.
#[derive(Debug, Clone)]
pub struct KeywordScorer {
    offset: f64,
}

impl KeywordScorer {
    pub fn new(offset: f64) -> Self {
        Self { offset }
    }

    fn score(&self, query: &str, passage: &str) -> f64 {
        let passage = passage.to_lowercase();
        let mut words: Vec<String> = query
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.len() > 2)
            .map(str::to_lowercase)
            .collect();
        words.sort();
        words.dedup();
        let hits = words.iter().filter(|w| passage.contains(w.as_str())).count();
        hits as f64 * 4.0 - self.offset
    }
}

impl Default for KeywordScorer {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[async_trait]
impl IPairwiseScorer for KeywordScorer {
    async fn score_batch(&self, pairs: &[(String, String)]) -> EvidexResult<Vec<f64>> {
        Ok(pairs.iter().map(|(q, p)| self.score(q, p)).collect())
    }

    fn name(&self) -> &str {
        "keyword_scorer"
    }
}

/// Looks scores up by passage content. Unknown passages get `default`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedScorer {
    scores: HashMap<String, f64>,
    default: f64,
}

impl ScriptedScorer {
    pub fn new(default: f64) -> Self {
        Self {
            scores: HashMap::new(),
            default,
        }
    }

    pub fn with_score(mut self, content: impl Into<String>, score: f64) -> Self {
        self.scores.insert(content.into(), score);
        self
    }
}

#[async_trait]
impl IPairwiseScorer for ScriptedScorer {
    async fn score_batch(&self, pairs: &[(String, String)]) -> EvidexResult<Vec<f64>> {
        Ok(pairs
            .iter()
            .map(|(_, p)| self.scores.get(p).copied().unwrap_or(self.default))
            .collect())
    }

    fn name(&self) -> &str {
        "scripted_scorer"
    }
}

/// Every call fails.
#[derive(Debug, Default)]
pub struct FailingScorer;

#[async_trait]
impl IPairwiseScorer for FailingScorer {
    async fn score_batch(&self, _pairs: &[(String, String)]) -> EvidexResult<Vec<f64>> {
        Err(failure("failing_scorer", "cross-encoder crashed"))
    }

    fn name(&self) -> &str {
        "failing_scorer"
    }
}

/// Returns one score fewer than asked for.
#[derive(Debug, Default)]
pub struct ShortScorer;

#[async_trait]
impl IPairwiseScorer for ShortScorer {
    async fn score_batch(&self, pairs: &[(String, String)]) -> EvidexResult<Vec<f64>> {
        Ok(vec![1.0; pairs.len().saturating_sub(1)])
    }

    fn name(&self) -> &str {
        "short_scorer"
    }
}
