//! Merge rules: defaults, override order, conflict handling.

use crate::config::{
    default_archive_path, default_image_size, default_images_dir, default_max_items,
    default_names_source, default_text_concurrency,
};
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Only scalar keys get builder defaults. Tagged tables such as
/// `pipeline.image_policy` fall back to serde defaults so a file that switches
/// the policy kind never inherits fields of another kind.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default(
            "pipeline.names_source",
            default_names_source().to_string_lossy().to_string(),
        )?
        .set_default(
            "pipeline.archive_path",
            default_archive_path().to_string_lossy().to_string(),
        )?
        .set_default(
            "pipeline.images_dir",
            default_images_dir().to_string_lossy().to_string(),
        )?
        .set_default("pipeline.max_items", default_max_items() as i64)?
        .set_default("pipeline.text_concurrency", default_text_concurrency() as i64)?
        .set_default("pipeline.image_size", default_image_size())
}
