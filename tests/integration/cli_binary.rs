//! Integration tests for the tattle binary: exit codes, stdout/stderr split
//! and log file output.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn tattle(temp_dir: &TempDir, workspace: &Path, args: &[&str]) -> Output {
    let home = temp_dir.path().join("home");
    let config_home = temp_dir.path().join("xdg-config");
    fs::create_dir_all(&home).unwrap();
    fs::create_dir_all(&config_home).unwrap();
    fs::create_dir_all(workspace).unwrap();

    let bin = env!("CARGO_BIN_EXE_tattle");
    Command::new(bin)
        .env("HOME", home.as_os_str())
        .env("XDG_CONFIG_HOME", config_home.as_os_str())
        .env_remove("OPENAI_API_KEY")
        .env_remove("TATTLE_LOG")
        .env_remove("TATTLE_LOG_OUTPUT")
        .env_remove("TATTLE_LOG_FORMAT")
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_config_validate_succeeds_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    let output = tattle(&temp_dir, &workspace, &["--quiet", "config", "validate"]);

    assert!(
        output.status.success(),
        "config validate should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Configuration is valid"
    );
    assert!(output.stderr.is_empty());
}

#[test]
fn test_invalid_workspace_config_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(workspace.join("config")).unwrap();
    fs::write(
        workspace.join("config").join("config.toml"),
        "[pipeline]\ntext_concurrency = 0\n",
    )
    .unwrap();

    let output = tattle(&temp_dir, &workspace, &["--quiet", "config", "validate"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("text_concurrency"), "stderr={}", stderr);
}

#[test]
fn test_run_without_api_key_fails_with_hint() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(workspace.join("names.json"), r#"["Aino"]"#).unwrap();

    let output = tattle(&temp_dir, &workspace, &["--quiet", "run"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OPENAI_API_KEY"), "stderr={}", stderr);
    assert!(!workspace.join("docs").join("news.json").exists());
}

#[test]
fn test_file_logging_writes_under_workspace() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    let output = tattle(
        &temp_dir,
        &workspace,
        &["--log-output", "file", "archive", "list"],
    );

    assert!(
        output.status.success(),
        "archive list should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Archive is empty."
    );

    let log_path = workspace.join(".tattle").join("tattle.log");
    let content = fs::read_to_string(&log_path).unwrap();
    assert!(
        content.contains("Tattle CLI starting"),
        "log file should contain a startup message; got: {}",
        content.lines().next().unwrap_or("")
    );
}

#[test]
fn test_json_log_format_on_stderr() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    let output = tattle(
        &temp_dir,
        &workspace,
        &["--log-format", "json", "config", "show"],
    );

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let first = stderr.lines().next().unwrap();
    let value: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(value["level"], "INFO");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[pipeline]"));
}
