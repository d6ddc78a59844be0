//! Error types for the tattle generation pipeline.

use thiserror::Error;

/// Storage-related errors (archive file, image files)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by the external content provider collaborators
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    RequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    AuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Provider returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Per-subject failures. These never escape a generation task; they are
/// folded into a failed outcome.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Empty field after normalization: {0}")]
    EmptyField(&'static str),

    #[error("Transport error: {0}")]
    Transport(#[from] ProviderError),
}

/// Image stage failures. Downgraded to "no image" by the generation task.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Image write failed: {0}")]
    Storage(#[from] StorageError),
}

/// Run-level errors. Any of these terminates the invocation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
