//! Generation Task
//!
//! One task per subject: request text, parse and normalize it into an item,
//! then optionally attach an image. Text failures become a failed outcome for
//! that subject only; image failures leave the item without an image. Items
//! whose key is already archived never get an image, since the merge will
//! discard them.

pub mod image;
pub mod parse;
pub mod prompt;

use crate::archive::{GenerationOutcome, Item};
use crate::config::{ImagePolicy, PromptConfig};
use crate::error::{GenerationError, ImageError};
use crate::provider::{ImageProvider, TextProvider};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use image::{image_file_base, slugify, ImageGate, ImageSink, ImageTicket};
pub use parse::{extract_object, normalize, parse_response, ItemDraft};
pub use prompt::{render_image_prompt, render_text_prompt};

/// Image side of the generation task, shared by all tasks of a run.
pub struct ImageStage {
    provider: Arc<dyn ImageProvider>,
    gate: ImageGate,
    sink: ImageSink,
    size: String,
}

impl ImageStage {
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        gate: ImageGate,
        sink: ImageSink,
        size: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            gate,
            sink,
            size: size.into(),
        }
    }

    /// Try to produce an image for `item`. Returns the relative image path,
    /// or `None` when the gate declines or any image step fails.
    pub async fn attach(&self, item: &Item, prompts: &PromptConfig) -> Option<String> {
        let ticket = self.gate.admit()?;
        let prompt =
            render_image_prompt(&prompts.image_style, &item.tags, &prompts.image_fallback_hint);

        match self.produce(item, &prompt).await {
            Ok(path) => {
                ticket.commit();
                info!(subject = %item.subject, image = %path, "Image attached");
                Some(path)
            }
            Err(e) => {
                warn!(subject = %item.subject, error = %e, "Image generation failed, continuing without image");
                None
            }
        }
    }

    async fn produce(&self, item: &Item, prompt: &str) -> Result<String, ImageError> {
        let bytes = self.provider.request_image(prompt, &self.size).await?;
        let path = self.sink.write(&image_file_base(item), &bytes).await?;
        Ok(path)
    }
}

/// Runs generation tasks for one pipeline run.
///
/// All items produced by one generator share the run's `created_at` stamp.
pub struct Generator {
    text: Arc<dyn TextProvider>,
    images: Option<ImageStage>,
    prompts: PromptConfig,
    created_at: String,
    archived_keys: HashSet<String>,
}

impl Generator {
    pub fn new(text: Arc<dyn TextProvider>, prompts: PromptConfig, created_at: String) -> Self {
        Self {
            text,
            images: None,
            prompts,
            created_at,
            archived_keys: HashSet::new(),
        }
    }

    pub fn with_images(mut self, stage: ImageStage) -> Self {
        self.images = Some(stage);
        self
    }

    /// Keys already present in the archive this run merges into.
    pub fn with_archived_keys(mut self, keys: HashSet<String>) -> Self {
        self.archived_keys = keys;
        self
    }

    pub fn image_policy(&self) -> ImagePolicy {
        self.images
            .as_ref()
            .map(|stage| stage.gate.policy())
            .unwrap_or(ImagePolicy::None)
    }

    /// Images attached so far in this run.
    pub fn images_used(&self) -> usize {
        self.images
            .as_ref()
            .map(|stage| stage.gate.images_used())
            .unwrap_or(0)
    }

    /// Generate one item for `subject`. Never fails: errors are folded into
    /// `GenerationOutcome::Failed`.
    pub async fn generate(&self, subject: &str) -> GenerationOutcome {
        info!(subject, "Generating item");

        let mut item = match self.generate_text(subject).await {
            Ok(item) => item,
            Err(e) => {
                warn!(subject, error = %e, "Generation failed");
                return GenerationOutcome::failed(subject, &e);
            }
        };

        if let Some(stage) = &self.images {
            if self.archived_keys.contains(&item.key()) {
                debug!(subject, headline = %item.headline, "Item already archived, skipping image");
            } else {
                item.image = stage.attach(&item, &self.prompts).await;
            }
        }

        info!(subject, headline = %item.headline, has_image = item.image.is_some(), "Item generated");
        GenerationOutcome::Generated(item)
    }

    async fn generate_text(&self, subject: &str) -> Result<Item, GenerationError> {
        let prompt = render_text_prompt(&self.prompts.text_template, subject);
        let raw = self.text.request_text(&prompt).await?;
        debug!(subject, response_len = raw.len(), "Text response received");
        let draft = parse_response(&raw)?;
        Ok(Item {
            subject: subject.to_string(),
            headline: draft.headline,
            content: draft.content,
            tags: draft.tags,
            created_at: self.created_at.clone(),
            image: None,
        })
    }
}
