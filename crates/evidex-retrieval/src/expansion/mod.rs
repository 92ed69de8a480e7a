//! Query expansion: paraphrase sub-queries from a short-text generator.

pub mod query_expansion;

pub use query_expansion::{parse_subqueries, QueryExpansionStage};
