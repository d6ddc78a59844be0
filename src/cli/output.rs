//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ProviderError};

/// Map domain errors to the message printed on stderr.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::ProviderError(ProviderError::NotConfigured(msg)) => {
            format!("Provider not configured: {}", msg)
        }
        ApiError::ProviderError(ProviderError::AuthFailed(msg)) => format!(
            "Provider rejected the API key: {}\nCheck provider.api_key or the variable named by provider.api_key_env.",
            msg
        ),
        ApiError::ConfigError(msg) => format!("Configuration error: {}", msg),
        other => format!("Error: {}", other),
    }
}
