use evidex_core::models::*;
use serde_json::json;

fn doc(content: &str, score: f64) -> ScoredDocument {
    ScoredDocument::new(Passage::new(content, "src.md"), score, Provenance::Dense)
}

#[test]
fn sort_desc_orders_by_score() {
    let mut docs = vec![doc("a", 1.0), doc("b", 3.0), doc("c", 2.0)];
    ScoredDocument::sort_desc(&mut docs);
    let order: Vec<_> = docs.iter().map(|d| d.content()).collect();
    assert_eq!(order, vec!["b", "c", "a"]);
}

#[test]
fn sort_desc_is_stable_on_ties() {
    let mut docs = vec![doc("first", 1.0), doc("second", 1.0), doc("third", 1.0)];
    ScoredDocument::sort_desc(&mut docs);
    let order: Vec<_> = docs.iter().map(|d| d.content()).collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn sort_desc_puts_nan_last() {
    let mut docs = vec![doc("nan", f64::NAN), doc("low", -10.0), doc("high", 4.0)];
    ScoredDocument::sort_desc(&mut docs);
    let order: Vec<_> = docs.iter().map(|d| d.content()).collect();
    assert_eq!(order, vec!["high", "low", "nan"]);
}

#[test]
fn rescored_keeps_passage_and_annotations() {
    let original = doc("text", 0.5).annotate("original_sources", json!(["q_dense"]));
    let rescored = original.rescored(7.5, Provenance::Reranker);
    assert_eq!(rescored.passage, original.passage);
    assert_eq!(rescored.score, 7.5);
    assert_eq!(rescored.provenance, Provenance::Reranker);
    assert_eq!(rescored.annotations["original_sources"], json!(["q_dense"]));
}

#[test]
fn content_prefix_respects_char_boundaries() {
    let passage = Passage::new("日本語のテキスト", "jp.md");
    assert_eq!(passage.content_prefix(3), "日本語");
    assert_eq!(passage.content_prefix(100), "日本語のテキスト");
}

#[test]
fn passage_metadata_roundtrips_through_json() {
    let passage = Passage::new("body", "doc.pdf").with_metadata("page", 4);
    let json = serde_json::to_value(&passage).unwrap();
    assert_eq!(json["metadata"]["page"], json!(4));
    let back: Passage = serde_json::from_value(json).unwrap();
    assert_eq!(back, passage);
}

#[test]
fn provenance_serializes_snake_case() {
    assert_eq!(
        serde_json::to_value(Provenance::RrfFusion).unwrap(),
        json!("rrf_fusion")
    );
    assert_eq!(Provenance::RrfFusion.as_str(), "rrf_fusion");
}

#[test]
fn context_error_reads_orchestrator_key() {
    let mut ctx = RetrievalContext::new("q");
    ctx.record_stage("error", json!("stage mmr failed: boom"));
    assert_eq!(ctx.error(), Some("stage mmr failed: boom"));
}

#[test]
fn context_passages_follow_final_order() {
    let mut ctx = RetrievalContext::new("q");
    ctx.final_documents = vec![doc("one", 2.0), doc("two", 1.0)];
    let contents: Vec<_> = ctx.passages().map(|p| p.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two"]);
}

#[test]
fn context_records_degradations() {
    let mut ctx = RetrievalContext::new("q");
    ctx.record_degradation(DegradationEvent::new(
        "reranking",
        "scorer timed out",
        "unscored truncation",
    ));
    assert_eq!(ctx.degradations.len(), 1);
    assert_eq!(ctx.degradations[0].component, "reranking");
}

#[test]
fn retrieval_method_maps_to_provenance() {
    assert_eq!(RetrievalMethod::Dense.provenance(), Provenance::Dense);
    assert_eq!(RetrievalMethod::Lexical.provenance(), Provenance::Lexical);
    assert!(RetrievalMethod::Dense < RetrievalMethod::Lexical);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sort_desc_yields_non_increasing_scores(scores in prop::collection::vec(-100.0f64..100.0, 0..40)) {
            let mut docs: Vec<_> = scores.iter().enumerate()
                .map(|(i, s)| doc(&format!("d{i}"), *s))
                .collect();
            ScoredDocument::sort_desc(&mut docs);
            for pair in docs.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }

        #[test]
        fn content_prefix_never_exceeds_limit(text in "\\PC{0,60}", limit in 0usize..80) {
            let passage = Passage::new(text.clone(), "s");
            let prefix = passage.content_prefix(limit);
            prop_assert!(prefix.chars().count() <= limit);
            prop_assert!(text.starts_with(prefix));
        }
    }
}
