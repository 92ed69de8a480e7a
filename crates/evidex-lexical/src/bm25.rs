//! Okapi BM25 over an immutable passage snapshot.
//!
//! The index is built once from a corpus and never mutated; a corpus change
//! means building a new index and swapping it in.

use std::collections::HashMap;

use evidex_core::Passage;
use rayon::prelude::*;
use tracing::debug;

use crate::tokenizer::tokenize;

/// BM25 scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Document-length normalization strength.
    pub b: f64,
    /// Terms with negative IDF (present in more than half the corpus) get
    /// `epsilon * mean_idf` instead.
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            epsilon: 0.25,
        }
    }
}

/// One lexical search hit. Larger score is better.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    pub passage: Passage,
    pub score: f64,
}

/// In-memory BM25 index.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Params,
    passages: Vec<Passage>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
}

impl Bm25Index {
    pub fn build(passages: Vec<Passage>) -> Self {
        Self::with_params(passages, Bm25Params::default())
    }

    pub fn with_params(passages: Vec<Passage>, params: Bm25Params) -> Self {
        let term_freqs: Vec<HashMap<String, u32>> = passages
            .par_iter()
            .map(|p| {
                let mut freqs = HashMap::new();
                for token in tokenize(&p.content) {
                    *freqs.entry(token).or_insert(0u32) += 1;
                }
                freqs
            })
            .collect();

        let doc_lens: Vec<usize> = term_freqs
            .iter()
            .map(|f| f.values().map(|&c| c as usize).sum())
            .collect();
        let total_len: usize = doc_lens.iter().sum();
        let avg_doc_len = if passages.is_empty() {
            0.0
        } else {
            total_len as f64 / passages.len() as f64
        };

        let idf = compute_idf(&term_freqs, params.epsilon);

        debug!(
            documents = passages.len(),
            vocabulary = idf.len(),
            avg_doc_len,
            "bm25 index built"
        );

        Self {
            params,
            passages,
            term_freqs,
            doc_lens,
            avg_doc_len,
            idf,
        }
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn passages(&self) -> &[Passage] {
        &self.passages
    }

    /// BM25 score of every document for `query`, in corpus order.
    /// Repeated query terms count once per occurrence.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let mut scores = vec![0.0; self.passages.len()];
        if self.avg_doc_len <= 0.0 {
            return scores;
        }
        let Bm25Params { k1, b, .. } = self.params;

        for term in tokenize(query) {
            let Some(&idf) = self.idf.get(&term) else {
                continue;
            };
            for (doc, freqs) in self.term_freqs.iter().enumerate() {
                let Some(&tf) = freqs.get(&term) else {
                    continue;
                };
                let tf = f64::from(tf);
                let norm = 1.0 - b + b * self.doc_lens[doc] as f64 / self.avg_doc_len;
                scores[doc] += idf * (tf * (k1 + 1.0)) / (tf + k1 * norm);
            }
        }
        scores
    }

    /// Top `k` documents with a positive score, best first. Equal scores
    /// keep corpus order.
    pub fn retrieve(&self, query: &str, k: usize) -> Vec<LexicalHit> {
        if k == 0 {
            return Vec::new();
        }
        let scores = self.scores(query);
        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > 0.0)
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        ranked
            .into_iter()
            .map(|(idx, score)| LexicalHit {
                passage: self.passages[idx].clone(),
                score,
            })
            .collect()
    }
}

/// `ln(N - n + 0.5) - ln(n + 0.5)` per term, with negative values replaced
/// by `epsilon * mean_idf`.
fn compute_idf(term_freqs: &[HashMap<String, u32>], epsilon: f64) -> HashMap<String, f64> {
    let corpus_size = term_freqs.len() as f64;
    let mut doc_freq: HashMap<&str, u32> = HashMap::new();
    for freqs in term_freqs {
        for term in freqs.keys() {
            *doc_freq.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    if doc_freq.is_empty() {
        return HashMap::new();
    }

    let mut idf = HashMap::with_capacity(doc_freq.len());
    let mut idf_sum = 0.0;
    let mut negative = Vec::new();
    for (term, n) in doc_freq {
        let n = f64::from(n);
        let value = (corpus_size - n + 0.5).ln() - (n + 0.5).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term);
        }
        idf.insert(term.to_string(), value);
    }

    let floor = epsilon * idf_sum / idf.len() as f64;
    for term in negative {
        idf.insert(term.to_string(), floor);
    }
    idf
}
