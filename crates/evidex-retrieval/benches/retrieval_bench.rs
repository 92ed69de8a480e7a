use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use evidex_core::config::ScoreTruncationConfig;
use evidex_core::models::{Passage, Provenance, ScoredDocument};
use evidex_core::traits::Dependencies;
use evidex_retrieval::ranking::truncate;
use evidex_retrieval::search::{fuse, RankedList};
use evidex_retrieval::RetrievalOrchestrator;
use test_fixtures::mocks::{HashingEmbedder, InMemoryVectorStore, KeywordScorer};

const TOPICS: [&str; 6] = [
    "rust ownership and borrowing",
    "async runtimes and task scheduling",
    "vector search over embeddings",
    "reciprocal rank fusion of ranked lists",
    "cross encoder reranking",
    "diversity with maximal marginal relevance",
];

fn passages(n: usize) -> Vec<Passage> {
    (0..n)
        .map(|i| {
            Passage::new(
                format!("passage {i} on {} part {}", TOPICS[i % 6], i / 6),
                format!("doc{}.md", i / 5),
            )
        })
        .collect()
}

/// Six lists of 15, overlapping by offset, like three queries x two methods.
fn lists() -> Vec<Vec<ScoredDocument>> {
    let pool = passages(60);
    (0..6)
        .map(|l| {
            (0..15)
                .map(|r| {
                    let passage = pool[(l * 5 + r) % pool.len()].clone();
                    ScoredDocument::new(passage, 1.0 / (r as f64 + 1.0), Provenance::Dense)
                })
                .collect()
        })
        .collect()
}

fn bench_rrf_fuse(c: &mut Criterion) {
    let documents = lists();
    let labels: Vec<String> = (0..documents.len()).map(|i| format!("q{i}_dense")).collect();
    let ranked: Vec<RankedList<'_>> = labels
        .iter()
        .zip(&documents)
        .map(|(label, documents)| RankedList { label, documents })
        .collect();
    c.bench_function("rrf_fuse_6x15", |b| {
        b.iter(|| fuse(black_box(&ranked), 60, 400, 12))
    });
}

fn bench_truncate(c: &mut Criterion) {
    let documents: Vec<ScoredDocument> = passages(50)
        .into_iter()
        .enumerate()
        .map(|(i, p)| ScoredDocument::new(p, 10.0 - i as f64 * 0.3, Provenance::Reranker))
        .collect();
    let config = ScoreTruncationConfig::default();
    c.bench_function("score_truncation_50", |b| {
        b.iter(|| truncate(black_box(&documents), &config))
    });
}

fn bench_retrieve(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = RetrievalOrchestrator::default().with_dependencies(
        Dependencies::new()
            .with_vector_store(Arc::new(InMemoryVectorStore::with_passages(passages(500))))
            .with_embedder(Arc::new(HashingEmbedder::default()))
            .with_scorer(Arc::new(KeywordScorer::default())),
    );
    c.bench_function("retrieve_500_passages", |b| {
        b.to_async(&runtime)
            .iter(|| orchestrator.retrieve(black_box("rank fusion of ranked lists")))
    });
}

criterion_group!(benches, bench_rrf_fuse, bench_truncate, bench_retrieve);
criterion_main!(benches);
