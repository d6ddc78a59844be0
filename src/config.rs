//! Configuration System
//!
//! Layered configuration for the generation pipeline: built-in defaults, a global
//! config file, workspace config files and `TATTLE__*` environment overrides, merged
//! with the `config` crate and validated before use.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::logging::LoggingConfig;
pub use crate::provider::ProviderConfig;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TattleConfig {
    /// Pipeline inputs, outputs and limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Content provider connection
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How images are attached to generated items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImagePolicy {
    /// Never generate images.
    None,
    /// Each generated item independently gets an image with this probability.
    Probability { probability: f64 },
    /// At most `per_run` images across the whole run.
    FixedQuota { per_run: usize },
}

impl Default for ImagePolicy {
    fn default() -> Self {
        ImagePolicy::FixedQuota { per_run: 1 }
    }
}

/// Pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// JSON array of subject names
    #[serde(default = "default_names_source")]
    pub names_source: PathBuf,

    /// JSON archive read by the viewer
    #[serde(default = "default_archive_path")]
    pub archive_path: PathBuf,

    /// Directory receiving generated images
    #[serde(default = "default_images_dir")]
    pub images_dir: PathBuf,

    /// Archive length cap
    #[serde(default = "default_max_items")]
    pub max_items: usize,

    /// Maximum generation tasks in flight
    #[serde(default = "default_text_concurrency")]
    pub text_concurrency: usize,

    #[serde(default)]
    pub image_policy: ImagePolicy,

    /// Requested image size, `WIDTHxHEIGHT`
    #[serde(default = "default_image_size")]
    pub image_size: String,
}

pub(crate) fn default_names_source() -> PathBuf {
    PathBuf::from("names.json")
}

pub(crate) fn default_archive_path() -> PathBuf {
    PathBuf::from("docs").join("news.json")
}

pub(crate) fn default_images_dir() -> PathBuf {
    PathBuf::from("docs").join("images")
}

pub(crate) fn default_max_items() -> usize {
    200
}

pub(crate) fn default_text_concurrency() -> usize {
    3
}

pub(crate) fn default_image_size() -> String {
    "1024x1024".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            names_source: default_names_source(),
            archive_path: default_archive_path(),
            images_dir: default_images_dir(),
            max_items: default_max_items(),
            text_concurrency: default_text_concurrency(),
            image_policy: ImagePolicy::default(),
            image_size: default_image_size(),
        }
    }
}

impl PipelineConfig {
    /// Validate pipeline settings
    pub fn validate(&self) -> Result<(), String> {
        if self.names_source.as_os_str().is_empty() {
            return Err("Names source cannot be empty".to_string());
        }
        if self.archive_path.as_os_str().is_empty() {
            return Err("Archive path cannot be empty".to_string());
        }
        if self.images_dir.as_os_str().is_empty() {
            return Err("Images directory cannot be empty".to_string());
        }
        if self.max_items == 0 {
            return Err("max_items must be at least 1".to_string());
        }
        if self.text_concurrency == 0 {
            return Err("text_concurrency must be at least 1".to_string());
        }
        if let ImagePolicy::Probability { probability } = self.image_policy {
            if !(0.0..=1.0).contains(&probability) {
                return Err(format!(
                    "Image probability must be between 0.0 and 1.0, got {}",
                    probability
                ));
            }
        }
        if !is_valid_image_size(&self.image_size) {
            return Err(format!(
                "Image size must look like WIDTHxHEIGHT, got '{}'",
                self.image_size
            ));
        }
        Ok(())
    }

    /// Resolve relative paths against the workspace root.
    pub fn resolve_paths(&self, workspace_root: &Path) -> PipelineConfig {
        let resolve = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                workspace_root.join(path)
            }
        };
        PipelineConfig {
            names_source: resolve(&self.names_source),
            archive_path: resolve(&self.archive_path),
            images_dir: resolve(&self.images_dir),
            ..self.clone()
        }
    }
}

fn is_valid_image_size(size: &str) -> bool {
    match size.split_once('x') {
        Some((width, height)) => {
            !width.is_empty()
                && !height.is_empty()
                && width.chars().all(|c| c.is_ascii_digit())
                && height.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Placeholder substituted with the subject name in the text template.
pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// Prompt templates. Their wording is deployment-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Text prompt; must contain `{subject}`
    #[serde(default = "default_text_template")]
    pub text_template: String,

    /// Style description that opens every image prompt
    #[serde(default = "default_image_style")]
    pub image_style: String,

    /// Theme hint used when an item has no tags
    #[serde(default = "default_image_fallback_hint")]
    pub image_fallback_hint: String,
}

fn default_text_template() -> String {
    r#"Write a short, playful gossip news item about a fictional person named {subject}.
Keep it light and surprising. No minors, no violence, no drugs, no crimes,
no explicit content, no hate speech, no mocking of appearance.

Return ONLY valid JSON (nothing else):
{
  "headline": "string",
  "content": "string",
  "tags": ["string", "string", "string"]
}"#
    .to_string()
}

fn default_image_style() -> String {
    [
        "blurry paparazzi-style illustration",
        "nighttime urban street",
        "street lights, cinematic",
        "grainy tabloid vibe",
        "anonymous human silhouette from behind",
        "face not visible, no identifiable person",
        "no text, no logos",
    ]
    .join(", ")
}

fn default_image_fallback_hint() -> String {
    "mystery, humor".to_string()
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            text_template: default_text_template(),
            image_style: default_image_style(),
            image_fallback_hint: default_image_fallback_hint(),
        }
    }
}

impl PromptConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.text_template.contains(SUBJECT_PLACEHOLDER) {
            return Err(format!(
                "Text template must contain the {} placeholder",
                SUBJECT_PLACEHOLDER
            ));
        }
        if self.image_style.trim().is_empty() {
            return Err("Image style cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Pipeline(String),
    Prompts(String),
    Provider(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Pipeline(msg) => write!(f, "Pipeline: {}", msg),
            ValidationError::Prompts(msg) => write!(f, "Prompts: {}", msg),
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl TattleConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.pipeline.validate() {
            errors.push(ValidationError::Pipeline(e));
        }
        if let Err(e) = self.prompts.validate() {
            errors.push(ValidationError::Prompts(e));
        }
        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = crate::logging::validate_logging_config(&self.logging) {
            errors.push(ValidationError::Logging(e.to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> TattleConfig {
        let mut config = self.clone();
        if config.provider.api_key.is_some() {
            config.provider.api_key = Some("<redacted>".to_string());
        }
        config
    }
}
