//! Parsing and validation of `hwgraph.toml` project configuration files.
//!
//! The configuration supplies defaults for a build (depth limit, suffix
//! policy, top module) and for the JSON output. Command-line flags override
//! whatever is set here.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE_NAME};
pub use types::*;
