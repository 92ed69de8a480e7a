/// Failures of the external collaborators: vector index, embedder,
/// short-text generator, pairwise scorer.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("{provider} failed: {reason}")]
    Failed { provider: String, reason: String },

    #[error("{provider} returned a malformed response: {reason}")]
    MalformedResponse { provider: String, reason: String },
}
