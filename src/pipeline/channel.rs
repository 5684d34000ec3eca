//! Channel identity.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global atomic counter for channel IDs.
/// Relaxed ordering is enough; only uniqueness matters.
static CHANNEL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(u64);

impl ChannelId {
    /// Generate a new unique channel ID.
    pub fn new() -> Self {
        Self(CHANNEL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Wrap a known value, e.g. an ID assigned by the transport.
    pub fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Eight lowercase hex digits, as used in log lines.
    pub fn as_short_text(&self) -> String {
        format!("{:08x}", self.0 & 0xffff_ffff)
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_short_text())
    }
}
