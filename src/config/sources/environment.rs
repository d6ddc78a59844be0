//! Environment source: `TATTLE__SECTION__KEY=value`, e.g.
//! `TATTLE__PIPELINE__MAX_ITEMS=50`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "TATTLE";
pub const ENV_SEPARATOR: &str = "__";

/// Add the environment override source to builder. Always applied last.
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    )
}
