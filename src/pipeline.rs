//! Pipeline
//!
//! One run: load subjects and the archive, generate an item per subject with
//! bounded concurrency, merge the results into the archive and persist it.

use crate::archive::{merge_and_persist, ArchiveEntry, ArchiveStore, FailedSubject};
use crate::concurrency::run_limited;
use crate::config::{ImagePolicy, PipelineConfig, PromptConfig};
use crate::error::ApiError;
use crate::generation::{Generator, ImageGate, ImageSink, ImageStage};
use crate::provider::{ImageProvider, TextProvider};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Summary of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Timestamp stamped on every item of the run.
    pub started_at: String,
    pub subjects: usize,
    pub generated: usize,
    pub added: usize,
    pub skipped_duplicates: usize,
    pub evicted: usize,
    pub failed: Vec<FailedSubject>,
    pub images_used: usize,
    pub archive_size: usize,
}

/// Read the subject list. The file holds a JSON array; entries are
/// stringified and trimmed, blanks dropped. A missing or unparsable file
/// yields an empty list.
pub async fn load_subjects(path: &Path) -> Result<Vec<String>, ApiError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::InvalidData) => {
            warn!(path = %path.display(), error = %e, "Names source unreadable");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ApiError::StorageError(e.into())),
    };
    Ok(parse_subjects(&raw))
}

/// Parse a JSON array of subject names.
pub fn parse_subjects(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::Null => None,
                Value::String(text) => Some(text.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|name| !name.is_empty())
            .collect(),
        Ok(_) => {
            warn!("Names source is not a JSON array");
            Vec::new()
        }
        Err(e) => {
            warn!(error = %e, "Names source is not valid JSON");
            Vec::new()
        }
    }
}

/// The generation pipeline with its collaborators.
pub struct Pipeline {
    config: PipelineConfig,
    prompts: PromptConfig,
    text: Arc<dyn TextProvider>,
    images: Option<Arc<dyn ImageProvider>>,
    store: Arc<dyn ArchiveStore>,
    image_seed: Option<u64>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        prompts: PromptConfig,
        text: Arc<dyn TextProvider>,
        store: Arc<dyn ArchiveStore>,
    ) -> Self {
        Self {
            config,
            prompts,
            text,
            images: None,
            store,
            image_seed: None,
        }
    }

    /// Attach an image provider. Without one, no images are generated
    /// regardless of the configured policy.
    pub fn with_image_provider(mut self, images: Arc<dyn ImageProvider>) -> Self {
        self.images = Some(images);
        self
    }

    /// Seed probability draws of the image policy.
    pub fn with_image_seed(mut self, seed: u64) -> Self {
        self.image_seed = Some(seed);
        self
    }

    /// Execute one run against the configured names source.
    pub async fn run(&self) -> Result<RunReport, ApiError> {
        let subjects = load_subjects(&self.config.names_source).await?;
        let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.run_with(subjects, started_at).await
    }

    /// Execute one run for explicit subjects, stamping items with `started_at`.
    pub async fn run_with(
        &self,
        subjects: Vec<String>,
        started_at: String,
    ) -> Result<RunReport, ApiError> {
        if subjects.is_empty() {
            return Err(ApiError::InvalidArgument(
                "No subjects to generate for".to_string(),
            ));
        }

        let existing = self.store.load().await?;
        info!(
            subjects = subjects.len(),
            archive_size = existing.len(),
            concurrency = self.config.text_concurrency,
            started_at = %started_at,
            "Starting generation run"
        );

        let archived_keys = existing.iter().filter_map(ArchiveEntry::key).collect();
        let generator = self
            .generator(started_at.clone())
            .with_archived_keys(archived_keys);
        let generator = &generator;
        let outcomes = run_limited(&subjects, self.config.text_concurrency, |subject: String| async move {
            generator.generate(&subject).await
        })
        .await?;

        let failed: Vec<FailedSubject> = outcomes
            .iter()
            .filter_map(|outcome| outcome.failure().cloned())
            .collect();
        for failure in &failed {
            warn!(subject = %failure.subject, error = %failure.error, "Subject failed");
        }
        let generated = outcomes.len() - failed.len();
        debug!(images_attached = generator.images_used(), "Generation phase done");

        let merged = merge_and_persist(
            self.store.as_ref(),
            outcomes,
            existing,
            self.config.max_items,
        )
        .await?;

        let report = RunReport {
            started_at,
            subjects: subjects.len(),
            generated,
            added: merged.added,
            skipped_duplicates: merged.skipped_duplicates,
            evicted: merged.evicted,
            failed,
            images_used: merged.images_added,
            archive_size: merged.items.len(),
        };
        info!(
            generated = report.generated,
            added = report.added,
            skipped = report.skipped_duplicates,
            failed = report.failed.len(),
            images = report.images_used,
            archive_size = report.archive_size,
            "Generation run complete"
        );
        Ok(report)
    }

    fn generator(&self, started_at: String) -> Generator {
        let generator = Generator::new(self.text.clone(), self.prompts.clone(), started_at);
        let Some(provider) = &self.images else {
            debug!("No image provider, images disabled");
            return generator;
        };
        if self.config.image_policy == ImagePolicy::None {
            return generator;
        }

        let gate = match self.image_seed {
            Some(seed) => ImageGate::with_seed(self.config.image_policy, seed),
            None => ImageGate::new(self.config.image_policy),
        };
        let sink = ImageSink::for_archive(&self.config.images_dir, &self.config.archive_path);
        generator.with_images(ImageStage::new(
            provider.clone(),
            gate,
            sink,
            self.config.image_size.clone(),
        ))
    }
}
