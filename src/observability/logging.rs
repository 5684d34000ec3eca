//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging subsystem before configuration is resolved
//! - Derive filter directives from resolved transport settings
//! - Swap the active filter once those settings are known
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` always wins over bootstrap and derived directives
//! - The filter sits behind a reload layer so resolution itself is logged
//! - Frame logging and captured transport logs are switched by directive,
//!   so disabled events cost one filter check

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

use crate::observability::frames::FRAME_LOG_TARGET;
use crate::settings::TransportSettings;

/// Target under which the underlying transport framework logs.
pub const TRANSPORT_LOG_TARGET: &str = "transport";

/// Directives active while settings are being resolved.
pub const BOOTSTRAP_DIRECTIVES: &str = concat!(env!("CARGO_CRATE_NAME"), "=debug");

/// Errors from installing or updating the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to install log subscriber: {0}")]
    Init(#[from] TryInitError),

    #[error("invalid log directives: {0}")]
    Directives(#[from] ParseError),

    #[error("failed to reload log filter: {0}")]
    Reload(#[from] reload::Error),
}

/// Filter directives for a transport configured by `settings`.
pub fn transport_filter_directives(settings: &TransportSettings) -> String {
    let mut directives = vec![format!("{}=info", env!("CARGO_CRATE_NAME"))];
    if settings.log_transport() {
        directives.push(format!("{FRAME_LOG_TARGET}=debug"));
    }
    let captured = if settings.capture_transport_logs() { "info" } else { "off" };
    directives.push(format!("{TRANSPORT_LOG_TARGET}={captured}"));
    directives.join(",")
}

/// Handle to the installed filter.
pub struct LogReloadHandle {
    handle: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogReloadHandle {
    /// Replace the active filter with `directives`.
    ///
    /// Directives are always validated. The filter is left alone when it
    /// came from `RUST_LOG`.
    pub fn apply(&self, directives: &str) -> Result<(), LoggingError> {
        let filter = EnvFilter::try_new(directives)?;
        if self.from_env {
            return Ok(());
        }
        self.handle.reload(filter)?;
        tracing::debug!(directives, "Log filter updated");
        Ok(())
    }
}

/// Install the global subscriber.
///
/// `default_directives` apply when `RUST_LOG` is unset or invalid.
pub fn init_logging(default_directives: &str) -> Result<LogReloadHandle, LoggingError> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::try_new(default_directives)?, false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(LogReloadHandle { handle, from_env })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn settings(source: &str) -> TransportSettings {
        TransportSettings::from_config(Some(&Config::parse(source).unwrap())).unwrap()
    }

    #[test]
    fn default_directives() {
        let directives = transport_filter_directives(&settings(""));
        assert_eq!(directives, "transport_diagnostics=info,transport=info");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn bootstrap_directives_parse() {
        assert_eq!(BOOTSTRAP_DIRECTIVES, "transport_diagnostics=debug");
        assert!(EnvFilter::try_new(BOOTSTRAP_DIRECTIVES).is_ok());
    }

    #[test]
    fn log_transport_enables_frame_debug() {
        let directives = transport_filter_directives(&settings("log-transport = true"));
        assert!(directives.contains("transport_diagnostics::observability::frames=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }

    #[test]
    fn uncaptured_transport_logs_are_off() {
        let directives = transport_filter_directives(&settings("capture-dotnetty-logs = false"));
        assert!(directives.ends_with("transport=off"));
    }

    #[test]
    fn reload_handle_swaps_filter_while_layer_is_alive() {
        let (_layer, handle) = reload::Layer::<EnvFilter, Registry>::new(EnvFilter::new("off"));
        let handle = LogReloadHandle {
            handle,
            from_env: false,
        };
        assert!(handle.apply("transport_diagnostics=info").is_ok());
        assert!(matches!(
            handle.apply("transport_diagnostics=loudest"),
            Err(LoggingError::Directives(_))
        ));
    }
}
