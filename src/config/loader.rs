//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::defaults::default_diagnostic_config;
use crate::config::error::ConfigError;
use crate::config::source::Config;

/// Load the embedded defaults with no user override.
pub fn load_defaults() -> Result<Config, ConfigError> {
    default_diagnostic_config()
}

/// Parse a TOML override and layer it over the embedded defaults.
pub fn load_config_str(input: &str) -> Result<Config, ConfigError> {
    let user = Config::parse(input)?;
    Ok(user.with_fallback(&default_diagnostic_config()?))
}

/// Load a TOML override file and layer it over the embedded defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = load_config_str(&content)?;
    tracing::debug!(path = %path.display(), "Configuration override loaded");
    Ok(config)
}
