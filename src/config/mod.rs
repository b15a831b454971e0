//! `.surveydash.toml` configuration.
//!
//! The file is discovered by walking up from the working directory. A
//! missing file yields defaults, an unreadable or invalid one logs a warning
//! and yields defaults, and an explicitly named file must load cleanly.

mod core;
mod display;
mod loader;

pub use self::core::{default_profile, GeocodeConfig, SourceConfig, SurveydashConfig};
pub use display::DisplayConfig;
pub use loader::{
    directory_ancestors, load_config, load_config_from, load_config_near,
    parse_and_validate_config, write_default_config, CONFIG_FILE_NAME, DEFAULT_CONFIG,
};
