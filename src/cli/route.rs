//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::archive::{ArchiveEntry, ArchiveStore, Item, JsonArchiveStore};
use crate::cli::help::command_name;
use crate::cli::parse::{ArchiveCommands, Commands, ConfigCommands};
use crate::cli::presentation::{
    format_archive_list_json, format_archive_list_text, format_config_toml,
    format_run_report_json, format_run_report_text, format_validation_result,
};
use crate::config::{ConfigLoader, ImagePolicy, PipelineConfig, TattleConfig};
use crate::error::ApiError;
use crate::pipeline::Pipeline;
use crate::provider::{ImageProvider, OpenAiProvider, TextProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Output format accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        match value {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::InvalidArgument(format!(
                "Invalid format '{}'. Must be 'text' or 'json'",
                other
            ))),
        }
    }
}

/// Per-invocation overrides of the pipeline settings from `tattle run`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub names: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub max_items: Option<usize>,
    pub no_images: bool,
}

/// Runtime context for CLI execution: workspace, config path and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config_path: Option<PathBuf>,
    config: TattleConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        Ok(Self::with_config(workspace_root, config_path, config))
    }

    /// Create run context around an already loaded configuration.
    pub fn with_config(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        config: TattleConfig,
    ) -> Self {
        Self {
            workspace_root,
            config_path,
            config,
        }
    }

    /// Execute a CLI command via the single route table.
    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let name = command_name(command);
        let started = Instant::now();
        debug!(command = %name, "Executing command");

        let result = match command {
            Commands::Run {
                names,
                concurrency,
                max_items,
                no_images,
                format,
            } => {
                let overrides = RunOverrides {
                    names: names.clone(),
                    concurrency: *concurrency,
                    max_items: *max_items,
                    no_images: *no_images,
                };
                self.handle_run(&overrides, format).await
            }
            Commands::Archive {
                command: ArchiveCommands::List { limit, format },
            } => self.handle_archive_list(*limit, format).await,
            Commands::Config {
                command: ConfigCommands::Show,
            } => format_config_toml(&self.config),
            Commands::Config {
                command: ConfigCommands::Validate,
            } => self.handle_config_validate(),
        };

        info!(
            command = %name,
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    /// Pipeline settings for this invocation: workspace-resolved paths with
    /// the command-line overrides applied, validated.
    pub fn effective_pipeline_config(
        &self,
        overrides: &RunOverrides,
    ) -> Result<PipelineConfig, ApiError> {
        let mut pipeline = self.config.pipeline.resolve_paths(&self.workspace_root);
        if let Some(names) = &overrides.names {
            pipeline.names_source = names.clone();
        }
        if let Some(concurrency) = overrides.concurrency {
            pipeline.text_concurrency = concurrency;
        }
        if let Some(max_items) = overrides.max_items {
            pipeline.max_items = max_items;
        }
        if overrides.no_images {
            pipeline.image_policy = ImagePolicy::None;
        }

        let effective = TattleConfig {
            pipeline: pipeline.clone(),
            ..self.config.clone()
        };
        effective.validate().map_err(|errors| {
            ApiError::ConfigError(
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;
        Ok(pipeline)
    }

    /// Build the pipeline for `tattle run` around the given collaborators.
    pub fn build_pipeline(
        &self,
        overrides: &RunOverrides,
        text: Arc<dyn TextProvider>,
        images: Option<Arc<dyn ImageProvider>>,
    ) -> Result<Pipeline, ApiError> {
        let pipeline_config = self.effective_pipeline_config(overrides)?;
        let store = Arc::new(JsonArchiveStore::new(&pipeline_config.archive_path));
        let pipeline = Pipeline::new(pipeline_config, self.config.prompts.clone(), text, store);
        Ok(match images {
            Some(images) => pipeline.with_image_provider(images),
            None => pipeline,
        })
    }

    async fn handle_run(&self, overrides: &RunOverrides, format: &str) -> Result<String, ApiError> {
        let format = OutputFormat::parse(format)?;
        // Fail on bad settings before touching the provider.
        self.effective_pipeline_config(overrides)?;

        let provider = Arc::new(OpenAiProvider::new(&self.config.provider)?);
        info!(
            provider = provider.provider_name(),
            config = ?self.config_path,
            "Provider ready"
        );
        let images: Arc<dyn ImageProvider> = provider.clone();
        let pipeline = self.build_pipeline(overrides, provider, Some(images))?;
        let report = pipeline.run().await?;

        match format {
            OutputFormat::Text => Ok(format_run_report_text(&report)),
            OutputFormat::Json => format_run_report_json(&report),
        }
    }

    async fn handle_archive_list(&self, limit: usize, format: &str) -> Result<String, ApiError> {
        let format = OutputFormat::parse(format)?;
        let pipeline = self.config.pipeline.resolve_paths(&self.workspace_root);
        let items: Vec<Item> = JsonArchiveStore::new(&pipeline.archive_path)
            .load()
            .await?
            .into_iter()
            .filter_map(ArchiveEntry::into_item)
            .collect();
        let shown = &items[..limit.min(items.len())];

        match format {
            OutputFormat::Text => Ok(format_archive_list_text(shown, items.len())),
            OutputFormat::Json => format_archive_list_json(shown, items.len()),
        }
    }

    fn handle_config_validate(&self) -> Result<String, ApiError> {
        let result = self.config.validate();
        let text = format_validation_result(&result);
        match result {
            Ok(()) => Ok(text),
            Err(_) => Err(ApiError::ConfigError(text)),
        }
    }
}
