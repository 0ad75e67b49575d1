//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::DepsumConfig;
use std::path::{Path, PathBuf};

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "depsum.toml";

/// Loads and validates `depsum.toml` from a project directory.
///
/// Reads `<project_dir>/depsum.toml`, parses it, and validates its values.
pub fn load_config(project_dir: &Path) -> Result<DepsumConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<DepsumConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<DepsumConfig, ConfigError> {
    let config: DepsumConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Walks up from `start` looking for the nearest `depsum.toml`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Loads the nearest `depsum.toml` above `start`, or the defaults if none exists.
pub fn load_config_or_default(start: &Path) -> Result<DepsumConfig, ConfigError> {
    match find_config(start) {
        Some(path) => load_config_file(&path),
        None => Ok(DepsumConfig::default()),
    }
}

/// Validates that configuration values are usable.
fn validate_config(config: &DepsumConfig) -> Result<(), ConfigError> {
    if config.registry.path.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "registry.path must not be empty".to_string(),
        ));
    }
    if config.resolve.max_modules == 0 {
        return Err(ConfigError::ValidationError(
            "resolve.max_modules must be greater than zero".to_string(),
        ));
    }
    if let Some(ext) = config
        .resolve
        .extensions
        .iter()
        .find(|e| e.is_empty() || e.starts_with('.'))
    {
        return Err(ConfigError::ValidationError(format!(
            "resolve.extensions entry '{ext}' must be a bare extension like \"js\""
        )));
    }
    if config.hash.include.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "hash.include entries must not be empty".to_string(),
        ));
    }
    config.hash.timeout()?;
    Ok(())
}
