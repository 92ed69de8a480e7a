/// Configuration loading and runtime update errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    #[error("malformed config key `{key}`: expected `stage__param`")]
    MalformedKey { key: String },

    #[error("unknown stage: {stage}")]
    UnknownStage { stage: String },

    #[error("stage {stage} has no parameter `{param}`")]
    UnknownParam { stage: String, param: String },

    #[error("parameter {stage}.{param} cannot be changed at runtime")]
    ReadOnlyParam { stage: String, param: String },

    #[error("invalid value for {stage}.{param}: {reason}")]
    InvalidValue {
        stage: String,
        param: String,
        reason: String,
    },

    #[error("config update rejected for keys: {}", keys.join(", "))]
    Rejected { keys: Vec<String> },
}
