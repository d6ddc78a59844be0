//! Content Provider Abstraction
//!
//! The generation pipeline talks to the outside world through two narrow
//! collaborator traits: one returning raw text for a prompt, one returning
//! image bytes. `OpenAiProvider` implements both against an OpenAI-compatible
//! HTTP API; tests and embedders can supply their own.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod openai;

pub use openai::OpenAiProvider;

/// Text generation collaborator
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Request a completion for `prompt`. The response is raw, untrusted text.
    async fn request_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;
}

/// Image generation collaborator
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Request one image for `prompt` at `size` (`WIDTHxHEIGHT`), returned as
    /// encoded PNG bytes.
    async fn request_image(&self, prompt: &str, size: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Provider connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API base URL (OpenAI-compatible)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Inline API key. Prefer `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_text_model")]
    pub text_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    /// Sampling temperature for text requests (0.0-2.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_text_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "gpt-image-1".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: default_api_key_env(),
            text_model: default_text_model(),
            image_model: default_image_model(),
            temperature: None,
        }
    }
}

impl ProviderConfig {
    /// Validate provider settings
    pub fn validate(&self) -> Result<(), String> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if self.text_model.trim().is_empty() {
            return Err("Text model cannot be empty".to_string());
        }
        if self.image_model.trim().is_empty() {
            return Err("Image model cannot be empty".to_string());
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Temperature must be between 0.0 and 2.0, got {}",
                    temperature
                ));
            }
        }
        Ok(())
    }

    /// Resolve the API key: inline value first, then the configured env var.
    pub fn resolve_api_key(&self) -> Result<String, ProviderError> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ProviderError::NotConfigured(format!(
                "No API key: set provider.api_key or the {} environment variable",
                self.api_key_env
            ))),
        }
    }
}
