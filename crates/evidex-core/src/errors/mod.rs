mod config_error;
mod provider_error;
mod stage_error;

pub use config_error::ConfigError;
pub use provider_error::ProviderError;
pub use stage_error::StageError;

/// Top-level error type for the evidex pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EvidexError {
    #[error(transparent)]
    ProviderError(#[from] ProviderError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),

    #[error(transparent)]
    StageError(#[from] StageError),
}

pub type EvidexResult<T> = Result<T, EvidexError>;
