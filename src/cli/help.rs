//! CLI command-name contract for logging.

use crate::cli::parse::{ArchiveCommands, Commands, ConfigCommands};

/// Dotted command name (e.g. "run", "archive.list", "config.show").
pub fn command_name(command: &Commands) -> String {
    match command {
        Commands::Run { .. } => "run".to_string(),
        Commands::Archive { command } => format!("archive.{}", archive_command_name(command)),
        Commands::Config { command } => format!("config.{}", config_command_name(command)),
    }
}

pub fn archive_command_name(command: &ArchiveCommands) -> &'static str {
    match command {
        ArchiveCommands::List { .. } => "list",
    }
}

pub fn config_command_name(command: &ConfigCommands) -> &'static str {
    match command {
        ConfigCommands::Show => "show",
        ConfigCommands::Validate => "validate",
    }
}
