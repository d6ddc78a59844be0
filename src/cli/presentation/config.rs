//! Configuration presentation: show and validate.

use crate::config::{TattleConfig, ValidationError};
use crate::error::ApiError;

/// Effective configuration as TOML, with secrets redacted.
pub fn format_config_toml(config: &TattleConfig) -> Result<String, ApiError> {
    toml::to_string_pretty(&config.redacted())
        .map_err(|e| ApiError::ConfigError(format!("Failed to render configuration: {}", e)))
}

pub fn format_validation_result(result: &Result<(), Vec<ValidationError>>) -> String {
    match result {
        Ok(()) => "Configuration is valid".to_string(),
        Err(errors) => {
            let mut output = format!("Configuration has {} problem(s):", errors.len());
            for error in errors {
                output.push_str(&format!("\n  - {}", error));
            }
            output
        }
    }
}
