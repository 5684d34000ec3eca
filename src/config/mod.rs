//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! embedded defaults (diagnostic.toml)
//!     → defaults.rs (parse embedded resource)
//! optional override (file or string)
//!     → loader.rs (parse & merge over defaults)
//!     → source.rs (hierarchical tree, dotted-path typed getters)
//!     → settings::TransportSettings (resolved, validated, immutable)
//! ```
//!
//! # Design Decisions
//! - The tree is untyped; all typing and validation happen in `settings`
//! - Fallback is a deep merge where the override wins, so untouched default
//!   keys survive a partial override
//! - Scalar getters coerce the way HOCON does (`"on"` is a boolean,
//!   `"128 kB"` is a byte size, a bare number is a duration in millis)

pub mod defaults;
pub mod error;
pub mod loader;
pub mod source;
pub mod units;

pub use defaults::DIAGNOSTIC_CONFIG_PATH;
pub use error::ConfigError;
pub use source::Config;
