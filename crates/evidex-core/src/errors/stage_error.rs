/// Stage-level failures. These are the only errors that reach the
/// orchestrator; collaborator failures are absorbed inside each stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("stage {stage} failed: {reason}")]
    Failed { stage: String, reason: String },

    #[error("stage {stage} panicked: {message}")]
    Panicked { stage: String, message: String },
}
