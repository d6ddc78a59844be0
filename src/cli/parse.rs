//! CLI parse: clap types for tattle. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tattle CLI - Generate a rolling archive of playful news items
#[derive(Parser, Debug)]
#[command(name = "tattle")]
#[command(about = "Generate playful news items for a list of subjects and keep a rolling archive")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate one item per subject and merge them into the archive
    Run {
        /// Names file (JSON array), overrides pipeline.names_source
        #[arg(long)]
        names: Option<PathBuf>,
        /// Maximum generation tasks in flight
        #[arg(long)]
        concurrency: Option<usize>,
        /// Archive length cap
        #[arg(long)]
        max_items: Option<usize>,
        /// Skip image generation for this run
        #[arg(long)]
        no_images: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Inspect the archive
    Archive {
        #[command(subcommand)]
        command: ArchiveCommands,
    },
    /// Inspect the effective configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ArchiveCommands {
    /// List the newest archive items
    List {
        /// Number of items to show
        #[arg(long, default_value = "20")]
        limit: usize,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML (API key redacted)
    Show,
    /// Validate the configuration and report problems
    Validate,
}
