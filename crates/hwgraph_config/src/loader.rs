//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::HwgraphConfig;
use std::path::Path;

/// File name looked up inside a project directory.
pub const CONFIG_FILE_NAME: &str = "hwgraph.toml";

/// Loads and validates `hwgraph.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<HwgraphConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but returns the defaults if the directory has no
/// `hwgraph.toml`.
pub fn load_config_or_default(project_dir: &Path) -> Result<HwgraphConfig, ConfigError> {
    if project_dir.join(CONFIG_FILE_NAME).is_file() {
        load_config(project_dir)
    } else {
        Ok(HwgraphConfig::default())
    }
}

/// Parses and validates a `hwgraph.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<HwgraphConfig, ConfigError> {
    let config: HwgraphConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &HwgraphConfig) -> Result<(), ConfigError> {
    if config
        .build
        .top
        .as_deref()
        .is_some_and(|top| top.trim().is_empty())
    {
        return Err(ConfigError::ValidationError(
            "build.top must not be empty".to_string(),
        ));
    }
    Ok(())
}
