//! Editor configuration
//!
//! Provides types, discovery and loading for `pxe.toml`.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config_from, load_config, parse_config, resolve_config, user_config_path, ConfigError,
    ConfigSource,
};
pub use schema::*;
