//! Property tests for the ranking invariants: RRF monotonicity, truncation
//! never emptying a non-empty list, and the MMR size bound.

use std::collections::HashMap;

use evidex_core::config::{MmrConfig, MmrMode, ScoreTruncationConfig};
use evidex_core::models::{Passage, Provenance, RetrievalContext, ScoredDocument};
use evidex_core::traits::{Dependencies, IRetrievalStage};
use evidex_retrieval::ranking::{mmr_select, truncate, MmrStage};
use evidex_retrieval::search::{fuse, RankedList};
use proptest::prelude::*;

fn doc(id: usize, score: f64) -> ScoredDocument {
    ScoredDocument::new(Passage::new(format!("doc-{id}"), "s"), score, Provenance::Dense)
}

/// Up to four ranked lists, each a shuffled subset of `0..n`.
fn ranked_lists() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (2usize..12).prop_flat_map(|n| {
        let ids: Vec<usize> = (0..n).collect();
        let list = prop::sample::subsequence(ids, 0..=n).prop_shuffle();
        (Just(n), prop::collection::vec(list, 1..5))
    })
}

fn rank_in(list: &[usize], id: usize) -> Option<usize> {
    list.iter().position(|&x| x == id)
}

proptest! {
    /// If `a` is ranked ahead of `b` in every list that contains `b`, then
    /// `a` never scores below `b`.
    #[test]
    fn rrf_dominating_document_never_scores_lower((n, lists) in ranked_lists(), k in 1u32..100) {
        let documents: Vec<Vec<ScoredDocument>> = lists
            .iter()
            .map(|ids| ids.iter().map(|&id| doc(id, 1.0)).collect())
            .collect();
        let labels: Vec<String> = (0..lists.len()).map(|i| format!("list{i}")).collect();
        let ranked: Vec<RankedList<'_>> = labels
            .iter()
            .zip(&documents)
            .map(|(label, documents)| RankedList { label, documents })
            .collect();

        let fused = fuse(&ranked, k, 400, usize::MAX);
        let scores: HashMap<&str, f64> = fused.iter().map(|d| (d.content(), d.score)).collect();
        let score = |id: usize| scores.get(format!("doc-{id}").as_str()).copied().unwrap_or(0.0);

        for a in 0..n {
            for b in 0..n {
                if a == b {
                    continue;
                }
                let dominates = lists.iter().all(|list| match rank_in(list, b) {
                    None => true,
                    Some(rb) => rank_in(list, a).is_some_and(|ra| ra < rb),
                });
                if dominates {
                    prop_assert!(score(a) >= score(b), "a={a} b={b} lists={lists:?}");
                }
            }
        }

        prop_assert!(fused.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn rrf_respects_top_k((_, lists) in ranked_lists(), top_k in 0usize..8) {
        let documents: Vec<Vec<ScoredDocument>> = lists
            .iter()
            .map(|ids| ids.iter().map(|&id| doc(id, 1.0)).collect())
            .collect();
        let ranked: Vec<RankedList<'_>> = documents
            .iter()
            .map(|documents| RankedList { label: "l", documents })
            .collect();
        prop_assert!(fuse(&ranked, 60, 400, top_k).len() <= top_k);
    }

    #[test]
    fn truncation_never_empties_nonempty_input(
        scores in prop::collection::vec(-20.0f64..20.0, 1..30),
        gap in 0.0f64..10.0,
        floor in -10.0f64..10.0,
        enabled in any::<bool>(),
    ) {
        let documents: Vec<ScoredDocument> =
            scores.iter().enumerate().map(|(i, &s)| doc(i, s)).collect();
        let config = ScoreTruncationConfig { enabled, gap_threshold: gap, min_threshold: floor };
        let out = truncate(&documents, &config);

        prop_assert!(!out.documents.is_empty());
        prop_assert!(out.documents.len() <= documents.len());
        if scores.iter().all(|&s| s <= floor) {
            prop_assert!(out.low_confidence);
        }
        if enabled && !out.fell_back {
            prop_assert!(out.documents.iter().all(|d| d.score > floor));
            prop_assert!(out.documents.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn mmr_selection_is_bounded_and_unique(
        scores in prop::collection::vec(0.0f64..1.0, 0..15),
        final_k in 0usize..10,
        lambda in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let documents: Vec<ScoredDocument> =
            scores.iter().enumerate().map(|(i, &s)| doc(i, s)).collect();
        let embeddings: Vec<Vec<f32>> = (0..documents.len())
            .map(|i| {
                let x = seed.wrapping_mul(i as u64 + 1);
                vec![(x % 7) as f32, (x % 11) as f32, (x % 13) as f32]
            })
            .collect();

        let picked = mmr_select(&documents, &embeddings, lambda, final_k);
        prop_assert!(picked.len() <= final_k);
        prop_assert_eq!(picked.len(), final_k.min(documents.len()));
        let mut unique = picked.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), picked.len());
    }

    #[test]
    fn mmr_never_mode_is_order_preserving_truncation(
        scores in prop::collection::vec(-5.0f64..5.0, 0..20),
        final_k in 0usize..10,
    ) {
        let documents: Vec<ScoredDocument> =
            scores.iter().enumerate().map(|(i, &s)| doc(i, s)).collect();
        let stage = MmrStage::new(MmrConfig { mode: MmrMode::Never, final_k, ..Default::default() });
        let mut ctx = RetrievalContext::new("q");
        ctx.truncated_documents = documents.clone();

        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(stage.execute(&mut ctx, &Dependencies::new())).unwrap();

        let expected: Vec<ScoredDocument> = documents.into_iter().take(final_k).collect();
        prop_assert_eq!(ctx.final_documents, expected);
    }
}
