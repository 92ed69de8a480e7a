//! # evidex-lexical
//!
//! Keyword side of hybrid retrieval: an in-memory Okapi BM25 index built
//! from a snapshot of the passage corpus, the tokenizer it uses, and the
//! cheap corpus fingerprint that decides when the index must be rebuilt.

pub mod bm25;
pub mod fingerprint;
pub mod tokenizer;

pub use bm25::{Bm25Index, Bm25Params, LexicalHit};
pub use fingerprint::corpus_fingerprint;
pub use tokenizer::tokenize;
