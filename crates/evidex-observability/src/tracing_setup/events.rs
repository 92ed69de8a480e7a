//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a stage that ran to completion.
pub fn stage_completed(stage: &str, duration_ms: f64) {
    tracing::debug!(
        event = "stage_completed",
        stage = %stage,
        duration_ms = duration_ms,
        "stage completed"
    );
}

/// Log a stage failure that aborted the pipeline.
pub fn stage_failed(stage: &str, error: &str) {
    tracing::error!(
        event = "stage_failed",
        stage = %stage,
        error = %error,
        "stage failed, aborting pipeline"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}

/// Log a lexical index rebuild after a corpus fingerprint change.
pub fn lexical_index_rebuilt(documents: usize, fingerprint: &str, duration_ms: f64) {
    tracing::info!(
        event = "lexical_index_rebuilt",
        documents = documents,
        fingerprint = %fingerprint,
        duration_ms = duration_ms,
        "lexical index rebuilt"
    );
}

/// Log the end of a retrieval call with the size of every stage's output.
pub fn pipeline_completed(
    queries: usize,
    fused: usize,
    reranked: usize,
    truncated: usize,
    final_count: usize,
    low_confidence: bool,
    duration_ms: f64,
) {
    tracing::info!(
        event = "pipeline_completed",
        queries = queries,
        fused = fused,
        reranked = reranked,
        truncated = truncated,
        final_count = final_count,
        low_confidence = low_confidence,
        duration_ms = duration_ms,
        "pipeline completed"
    );
}

/// Log an administrative configuration change.
pub fn config_updated(key: &str, applied: bool) {
    tracing::info!(
        event = "config_updated",
        key = %key,
        applied = applied,
        "pipeline config update"
    );
}
