//! Settings resolution errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::net::certificate::CertificateError;

/// Errors that abort transport settings resolution.
///
/// Every variant is fatal to transport startup and names the offending key
/// or value.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A required section or value is absent.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// A value is present but outside its vocabulary or numeric bounds.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An enumerated setting does not match its closed set.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// The certificate store could not produce key material.
    #[error("certificate could not be loaded: {0}")]
    Certificate(#[from] CertificateError),
}

impl From<ConfigError> for SettingsError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::WrongType { .. } | ConfigError::Malformed { .. } => {
                SettingsError::InvalidArgument(err.to_string())
            }
            ConfigError::Io { .. } => SettingsError::ConfigurationMissing(err.to_string()),
            ConfigError::Parse(_) => SettingsError::ConfigurationError(err.to_string()),
        }
    }
}
