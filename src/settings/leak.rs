//! Resource leak detection level.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::settings::error::SettingsError;

/// How aggressively unreleased pooled buffers are tracked and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakDetectionLevel {
    /// No tracking at all.
    Disabled,
    /// Sample a small fraction of buffers and report leaks without access records.
    #[default]
    Simple,
    /// Sample a small fraction of buffers and record where they were accessed.
    Advanced,
    /// Track every buffer. Only for debugging; very expensive.
    Paranoid,
}

impl LeakDetectionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeakDetectionLevel::Disabled => "disabled",
            LeakDetectionLevel::Simple => "simple",
            LeakDetectionLevel::Advanced => "advanced",
            LeakDetectionLevel::Paranoid => "paranoid",
        }
    }
}

impl fmt::Display for LeakDetectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeakDetectionLevel {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_leak_detection_level(s)
    }
}

/// Parse `resource-leak-level`, ignoring case.
pub fn parse_leak_detection_level(value: &str) -> Result<LeakDetectionLevel, SettingsError> {
    match value.to_lowercase().as_str() {
        "disabled" => Ok(LeakDetectionLevel::Disabled),
        "simple" => Ok(LeakDetectionLevel::Simple),
        "advanced" => Ok(LeakDetectionLevel::Advanced),
        "paranoid" => Ok(LeakDetectionLevel::Paranoid),
        _ => Err(SettingsError::ConfigurationError(format!(
            "unsupported resource leak detection level `{value}`; expected one of disabled, simple, advanced, paranoid"
        ))),
    }
}
