//! Errors raised while reading the configuration tree.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for configuration loading and typed lookups.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The override file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input was not valid TOML.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value exists at the path but has an incompatible type.
    #[error("configuration value at `{path}` is a {found}, expected {expected}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A value has the right type but cannot be interpreted.
    #[error("configuration value `{value}` at `{path}` is malformed: {reason}")]
    Malformed {
        path: String,
        value: String,
        reason: String,
    },
}
