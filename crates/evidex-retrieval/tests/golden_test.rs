//! Golden scenario tests: exact RRF scores and truncation cut-off.

use evidex_core::config::ScoreTruncationConfig;
use evidex_core::models::{Passage, Provenance, ScoredDocument};
use evidex_core::traits::VectorHit;
use evidex_retrieval::ranking::truncate;
use evidex_retrieval::search::{fuse, RankedList};
use serde::Deserialize;
use test_fixtures::load_fixture;

#[derive(Debug, Deserialize)]
struct DenseHit {
    content: String,
    source: String,
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct LexicalHit {
    content: String,
    source: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
struct ExpectedFused {
    content: String,
    source: String,
    rrf_score: f64,
}

#[derive(Debug, Deserialize)]
struct RrfScenario {
    query: String,
    k: u32,
    dense: Vec<DenseHit>,
    lexical: Vec<LexicalHit>,
    expected: Vec<ExpectedFused>,
}

#[derive(Debug, Deserialize)]
struct TruncationScenario {
    gap_threshold: f64,
    min_threshold: f64,
    scores: Vec<f64>,
    expected_scores: Vec<f64>,
    expected_low_confidence: bool,
}

#[test]
fn rrf_dense_lexical_scores_match_golden() {
    let scenario: RrfScenario = load_fixture("golden/retrieval/rrf_dense_lexical.json");

    let dense: Vec<ScoredDocument> = scenario
        .dense
        .iter()
        .map(|h| {
            let hit = VectorHit::new(Passage::new(&h.content, &h.source), h.distance);
            let score = hit.similarity();
            ScoredDocument::new(hit.passage, score, Provenance::Dense)
        })
        .collect();
    let lexical: Vec<ScoredDocument> = scenario
        .lexical
        .iter()
        .map(|h| ScoredDocument::new(Passage::new(&h.content, &h.source), h.score, Provenance::Lexical))
        .collect();

    // 1 / (1 + d) keeps dense order.
    assert!((dense[0].score - 1.0 / 1.1).abs() < 1e-12);
    assert!(dense.windows(2).all(|w| w[0].score > w[1].score));

    let dense_label = format!("{}_dense", scenario.query);
    let lexical_label = format!("{}_lexical", scenario.query);
    let lists = [
        RankedList {
            label: &dense_label,
            documents: &dense,
        },
        RankedList {
            label: &lexical_label,
            documents: &lexical,
        },
    ];
    let fused = fuse(&lists, scenario.k, 400, 10);

    assert_eq!(fused.len(), scenario.expected.len());
    for (got, want) in fused.iter().zip(&scenario.expected) {
        assert_eq!(got.content(), want.content);
        assert_eq!(got.source(), want.source);
        assert!(
            (got.score - want.rrf_score).abs() < 1e-9,
            "{}: got {}, want {}",
            want.source,
            got.score,
            want.rrf_score
        );
        assert_eq!(got.provenance, Provenance::RrfFusion);
    }

    let top_sources = fused[0].annotations["original_sources"]
        .as_array()
        .unwrap();
    assert_eq!(top_sources.len(), 2);
}

#[test]
fn truncation_cliff_matches_golden() {
    let scenario: TruncationScenario = load_fixture("golden/retrieval/truncation_cliff.json");
    let config = ScoreTruncationConfig {
        enabled: true,
        gap_threshold: scenario.gap_threshold,
        min_threshold: scenario.min_threshold,
    };
    let docs: Vec<ScoredDocument> = scenario
        .scores
        .iter()
        .enumerate()
        .map(|(i, &s)| ScoredDocument::new(Passage::new(format!("p{i}"), "s"), s, Provenance::Reranker))
        .collect();

    let out = truncate(&docs, &config);
    let kept: Vec<f64> = out.documents.iter().map(|d| d.score).collect();
    assert_eq!(kept, scenario.expected_scores);
    assert_eq!(out.low_confidence, scenario.expected_low_confidence);
}
