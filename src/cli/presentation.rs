//! CLI presentation: text and json formatters per command family.

mod archive;
mod config;
mod run;

pub use archive::{format_archive_list_json, format_archive_list_text};
pub use config::{format_config_toml, format_validation_result};
pub use run::{format_run_report_json, format_run_report_text};

use crate::error::{ApiError, StorageError};

fn to_pretty_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::StorageError(StorageError::Serialization(e.to_string())))
}
