//! In-process CLI route tests: RunContext against a temporary workspace.

use crate::integration::test_utils::{
    entries, item, stored_items, write_names, ScriptedText, StaticImages, STAMP,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tattle::archive::{ArchiveStore, JsonArchiveStore};
use tattle::cli::{ArchiveCommands, Cli, Commands, ConfigCommands, RunContext, RunOverrides};
use tattle::config::TattleConfig;
use tattle::error::ApiError;
use tattle::provider::ImageProvider;
use tempfile::TempDir;

fn context_with(temp: &TempDir, config: TattleConfig) -> RunContext {
    RunContext::with_config(temp.path().to_path_buf(), None, config)
}

fn subject_config() -> TattleConfig {
    let mut config = TattleConfig::default();
    config.prompts.text_template = "{subject}".to_string();
    config
}

async fn seed_archive(temp: &TempDir, count: usize) {
    let items: Vec<_> = (0..count)
        .map(|n| item(&format!("subject-{n}"), &format!("story {n}"), STAMP))
        .collect();
    JsonArchiveStore::new(temp.path().join("docs").join("news.json"))
        .save(&entries(items))
        .await
        .unwrap();
}

#[tokio::test]
async fn archive_list_json_respects_limit() {
    let temp = TempDir::new().unwrap();
    seed_archive(&temp, 5).await;
    let cli = Cli::try_parse_from(["tattle", "archive", "list", "--limit", "2", "--format", "json"]).unwrap();

    let output = context_with(&temp, TattleConfig::default())
        .execute(&cli.command)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(value["total"], 5);
    assert_eq!(value["items"].as_array().unwrap().len(), 2);
    assert_eq!(value["items"][0]["subject"], "subject-0");
}

#[tokio::test]
async fn archive_list_rejects_unknown_format() {
    let temp = TempDir::new().unwrap();
    let err = context_with(&temp, TattleConfig::default())
        .execute(&Commands::Archive {
            command: ArchiveCommands::List {
                limit: 5,
                format: "xml".to_string(),
            },
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
}

#[tokio::test]
async fn config_show_renders_toml_that_loads_back() {
    let temp = TempDir::new().unwrap();
    let output = context_with(&temp, TattleConfig::default())
        .execute(&Commands::Config {
            command: ConfigCommands::Show,
        })
        .await
        .unwrap();

    let parsed: TattleConfig = toml::from_str(&output).unwrap();
    assert_eq!(parsed, TattleConfig::default());
}

#[tokio::test]
async fn config_validate_passes_for_defaults() {
    let temp = TempDir::new().unwrap();
    let output = context_with(&temp, TattleConfig::default())
        .execute(&Commands::Config {
            command: ConfigCommands::Validate,
        })
        .await
        .unwrap();
    assert_eq!(output, "Configuration is valid");
}

#[tokio::test]
async fn built_pipeline_runs_against_workspace_paths() {
    let temp = TempDir::new().unwrap();
    seed_archive(&temp, 3).await;
    write_names(&temp.path().join("names.json"), &["Aino", "Eino"]);
    let ctx = context_with(&temp, subject_config());
    let images: Arc<dyn ImageProvider> = Arc::new(StaticImages::default());

    let pipeline = ctx
        .build_pipeline(
            &RunOverrides {
                max_items: Some(4),
                ..RunOverrides::default()
            },
            Arc::new(ScriptedText::new()),
            Some(images),
        )
        .unwrap();
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.added, 2);
    assert_eq!(report.evicted, 1);
    assert_eq!(report.images_used, 1);

    let saved = stored_items(&JsonArchiveStore::new(temp.path().join("docs").join("news.json"))).await;
    let subjects: Vec<&str> = saved.iter().map(|i| i.subject.as_str()).collect();
    assert_eq!(subjects, vec!["Aino", "Eino", "subject-0", "subject-1"]);
    assert!(temp.path().join("docs").join("images").is_dir());
}

#[tokio::test]
async fn names_override_with_empty_list_is_invalid_argument() {
    let temp = TempDir::new().unwrap();
    let names = temp.path().join("empty.json");
    write_names(&names, &[]);
    let ctx = context_with(&temp, subject_config());

    let pipeline = ctx
        .build_pipeline(
            &RunOverrides {
                names: Some(PathBuf::from(&names)),
                no_images: true,
                ..RunOverrides::default()
            },
            Arc::new(ScriptedText::new()),
            None,
        )
        .unwrap();
    let err = pipeline.run().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert!(!temp.path().join("docs").join("news.json").exists());
}
