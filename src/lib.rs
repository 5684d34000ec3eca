//! Diagnostic transport support library.
//!
//! Resolves transport settings from layered TOML configuration, loads TLS
//! material, and provides pipeline stages that log sampled allocator
//! statistics and frames.

// Configuration and resolved settings
pub mod config;
pub mod settings;

// Transport plumbing
pub mod net;
pub mod pipeline;

// Cross-cutting concerns
pub mod observability;

pub use config::Config;
pub use observability::{AllocatorDumpHandler, FrameLoggingHandler};
pub use pipeline::{install_diagnostics, Pipeline};
pub use settings::{SettingsError, SettingsResolver, TransportSettings};
