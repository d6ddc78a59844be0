//! OpenAI-compatible provider client.
//!
//! Minimal request/response mapping: chat completions for text, image
//! generations (base64 payload) for images. No streaming, no retries.

use crate::error::ProviderError;
use crate::provider::{ImageProvider, ProviderConfig, TextProvider};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    b64_json: Option<String>,
}

fn map_http_error(error: reqwest::Error) -> ProviderError {
    if error.is_timeout() {
        ProviderError::RequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ProviderError::RequestFailed(format!("Connection error: {}", error))
    } else {
        ProviderError::RequestFailed(format!("HTTP error: {}", error))
    }
}

fn map_status(status: StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthFailed(format!("Authentication failed: {}", body)),
        429 => ProviderError::RateLimit(format!("Rate limit exceeded: {}", body)),
        _ => ProviderError::RequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

fn decode_image(b64: &str) -> Result<Vec<u8>, ProviderError> {
    general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| ProviderError::InvalidResponse(format!("Invalid base64 image payload: {}", e)))
}

/// OpenAI-compatible client implementing both collaborator traits
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    temperature: Option<f32>,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config.resolve_api_key()?;
        let client = Client::builder()
            .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
            .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ProviderError::RequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            temperature: config.temperature,
        })
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &error_text));
        }
        Ok(response)
    }
}

#[async_trait]
impl TextProvider for OpenAiProvider {
    async fn request_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest {
            model: &self.text_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        let completion: ChatCompletionResponse = self
            .post_json("chat/completions", &request)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        debug!(model = %self.text_model, length = text.len(), "Text response received");
        Ok(text)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl ImageProvider for OpenAiProvider {
    async fn request_image(&self, prompt: &str, size: &str) -> Result<Vec<u8>, ProviderError> {
        let request = ImageGenerationRequest {
            model: &self.image_model,
            prompt,
            size,
        };

        let generated: ImageGenerationResponse = self
            .post_json("images/generations", &request)
            .await?
            .json()
            .await
            .map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse image response: {}", e))
            })?;

        let b64 = generated
            .data
            .into_iter()
            .next()
            .and_then(|data| data.b64_json)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("Image API did not return b64_json".to_string())
            })?;
        decode_image(&b64)
    }
}
