//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{ArchiveCommands, Cli, Commands, ConfigCommands};
pub use presentation::{
    format_archive_list_json, format_archive_list_text, format_config_toml,
    format_run_report_json, format_run_report_text, format_validation_result,
};
pub use route::{OutputFormat, RunContext, RunOverrides};
