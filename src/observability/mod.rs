//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline events:
//!     → frames.rs (every frame at DEBUG, when log-transport is set)
//!     → dump.rs (sampled allocator statistics at INFO)
//!
//! Consumers:
//!     → logging.rs (subscriber and filter directives)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event for machine parsing
//! - Stages log under a span supplied by the transport
//! - Diagnostics never alter, drop or delay pipeline events

pub mod dump;
pub mod frames;
pub mod logging;

pub use dump::{include_in_sample, include_in_sample_with, AllocatorDumpHandler, PipelineEvent};
pub use frames::FrameLoggingHandler;
pub use logging::{init_logging, transport_filter_directives, LogReloadHandle, LoggingError};
