//! Span definitions for one retrieval call and for each stage inside it.

/// Create a retrieval span. One per `retrieve` call.
#[macro_export]
macro_rules! retrieval_span {
    ($request_id:expr, $query:expr) => {
        tracing::info_span!("evidex.retrieval", request_id = %$request_id, query = %$query)
    };
}

/// Create a stage span, nested inside the retrieval span.
#[macro_export]
macro_rules! stage_span {
    ($stage:expr) => {
        tracing::info_span!("evidex.stage", stage = %$stage)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const RETRIEVAL: &str = "evidex.retrieval";
    pub const STAGE: &str = "evidex.stage";
}
