//! Embedded default configuration.

use crate::config::error::ConfigError;
use crate::config::source::Config;

/// Path of the transport section inside a root configuration.
pub const DIAGNOSTIC_CONFIG_PATH: &str = "akka.remote.dot-netty.diagnostic.tcp";

const DEFAULT_DIAGNOSTIC_CONFIG: &str = include_str!("diagnostic.toml");

/// The raw TOML of the default configuration.
pub fn default_diagnostic_source() -> &'static str {
    DEFAULT_DIAGNOSTIC_CONFIG
}

/// Parse the embedded default configuration.
pub fn default_diagnostic_config() -> Result<Config, ConfigError> {
    Config::parse(DEFAULT_DIAGNOSTIC_CONFIG)
}
