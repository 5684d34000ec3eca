//! Channel pipeline seam.
//!
//! # Data Flow
//! ```text
//! Transport I/O
//!     → Pipeline (one per channel)
//!         → handler.rs (ordered stages, inbound head→tail, outbound tail→head)
//!         → allocator.rs (optional pool statistics capability)
//!     → PipelineSink (application / socket)
//! ```
//!
//! # Design Decisions
//! - Handlers are `Arc`-shared and stateless per event
//! - Pool-backed allocators are detected through a capability accessor,
//!   never by downcasting
//! - initializer.rs wires diagnostic stages from resolved settings

pub mod allocator;
pub mod channel;
pub mod handler;
pub mod initializer;

pub use allocator::{AllocatorError, BufferAllocator, PoolMetrics, PoolStats, UnpooledAllocator};
pub use channel::ChannelId;
pub use handler::{ChannelHandler, HandlerContext, Pipeline, PipelineSink};
pub use initializer::install_diagnostics;
