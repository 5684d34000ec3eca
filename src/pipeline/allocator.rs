//! Buffer allocator capability.
//!
//! The transport's allocator is external. The pipeline only needs to know
//! whether it is pool-backed and, if so, how to snapshot its statistics.
//! That is expressed as an optional capability rather than a type test.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Point-in-time statistics of a pooled allocator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PoolStats {
    pub heap_arenas: usize,
    pub direct_arenas: usize,
    pub thread_local_caches: usize,
    pub used_heap_memory: u64,
    pub used_direct_memory: u64,
    pub chunk_size: usize,
    pub small_cache_size: usize,
    pub normal_cache_size: usize,
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "heap_arenas={} direct_arenas={} thread_caches={} used_heap={}B used_direct={}B \
             chunk_size={}B small_cache={} normal_cache={}",
            self.heap_arenas,
            self.direct_arenas,
            self.thread_local_caches,
            self.used_heap_memory,
            self.used_direct_memory,
            self.chunk_size,
            self.small_cache_size,
            self.normal_cache_size,
        )
    }
}

/// Failure to snapshot allocator statistics.
#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error("allocator statistics unavailable: {0}")]
    Unavailable(String),
}

/// Statistics access for pool-backed allocators.
pub trait PoolMetrics: Send + Sync {
    fn dump_stats(&self) -> Result<PoolStats, AllocatorError>;
}

/// The allocator attached to a channel.
pub trait BufferAllocator: Send + Sync {
    /// `Some` only when the allocator is pool-backed.
    fn pool_metrics(&self) -> Option<&dyn PoolMetrics> {
        None
    }
}

/// Allocator that does not pool buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnpooledAllocator;

impl BufferAllocator for UnpooledAllocator {}
