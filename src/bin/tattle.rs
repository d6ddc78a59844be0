//! Tattle CLI Binary
//!
//! Command-line interface for the tattle generation pipeline.

use clap::Parser;
use std::process;
use tattle::cli::{Cli, RunContext};
use tattle::config::ConfigLoader;
use tattle::logging::{init_logging, resolve_log_file_path, LoggingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Build logging config from CLI args, env vars, and config file
    let logging_config = build_logging_config(&cli);

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Tattle CLI starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", tattle::cli::map_error(&e));
            process::exit(1);
        }
    };

    match context.execute(&cli.command).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", tattle::cli::map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let loaded = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path).ok()
    } else {
        ConfigLoader::load(&cli.workspace).ok()
    };
    let config = loaded.map(|c| c.logging).unwrap_or_default();
    apply_cli_overrides(config, cli)
}

/// CLI flags take precedence over the config file.
fn apply_cli_overrides(mut config: LoggingConfig, cli: &Cli) -> LoggingConfig {
    if cli.quiet {
        config.enabled = false;
        return config;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if config.output.contains("file") {
        config.file = Some(resolve_log_file_path(
            cli.log_file.clone(),
            config.file.take(),
            &cli.workspace,
        ));
    }
    config
}
