//! Sampled allocator dumps.
//!
//! # Responsibilities
//! - Decide per event whether it falls into the sample
//! - Snapshot pool statistics when the channel's allocator is pool-backed
//! - Forward every event unchanged
//!
//! # Design Decisions
//! - Sampling draws from the thread-local RNG, so the hot path takes no lock
//! - The capability check runs before the draw; unpooled channels never
//!   touch the RNG
//! - Stats failures are logged and swallowed, never surfaced to the pipeline

use std::fmt;

use rand::Rng;
use tracing::Span;

use crate::pipeline::handler::{ChannelHandler, HandlerContext};

/// Upper bound of a meaningful sample rate.
pub const MAX_SAMPLE_RATE: f64 = 1.0;

/// Sample rate used when none is configured.
pub const DEFAULT_SAMPLE_RATE: f64 = 1.0;

/// Sample rate that disables dumps.
pub const ZERO_SAMPLE_RATE: f64 = 0.0;

/// Pipeline event that triggered a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineEvent {
    Read,
    Write,
    Flush,
}

impl PipelineEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineEvent::Read => "READ",
            PipelineEvent::Write => "WRITE",
            PipelineEvent::Flush => "FLUSH",
        }
    }
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether an event is sampled at `rate`.
pub fn include_in_sample(rate: f64) -> bool {
    include_in_sample_with(rate, &mut rand::thread_rng())
}

/// [`include_in_sample`] with an explicit generator.
///
/// A rate of exactly [`MAX_SAMPLE_RATE`] always samples without drawing.
/// Zero, negative and NaN rates never sample.
pub fn include_in_sample_with<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> bool {
    if rate == MAX_SAMPLE_RATE {
        return true;
    }
    rate > ZERO_SAMPLE_RATE && rate >= rng.gen::<f64>()
}

/// Pipeline stage that logs allocator statistics for a sample of events.
#[derive(Debug, Clone)]
pub struct AllocatorDumpHandler {
    span: Span,
    sample_rate: f64,
}

impl AllocatorDumpHandler {
    /// Create a stage that logs under `span`.
    pub fn new(span: Span, sample_rate: f64) -> Self {
        Self { span, sample_rate }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    fn record<M>(&self, ctx: &dyn HandlerContext<M>, event: PipelineEvent) {
        let Some(metrics) = ctx.allocator().pool_metrics() else {
            return;
        };
        if !include_in_sample(self.sample_rate) {
            return;
        }

        let channel = ctx.channel_id().as_short_text();
        match metrics.dump_stats() {
            Ok(stats) => tracing::info!(
                parent: &self.span,
                channel = %channel,
                event = %event,
                stats = %stats,
                "[Channel:{}][{}] BufferStats:{}",
                channel,
                event,
                stats
            ),
            Err(err) => tracing::warn!(
                parent: &self.span,
                channel = %channel,
                event = %event,
                error = %err,
                "Failed to dump allocator statistics"
            ),
        }
    }
}

impl<M> ChannelHandler<M> for AllocatorDumpHandler {
    fn name(&self) -> &'static str {
        "allocator-dump"
    }

    fn channel_read(&self, ctx: &mut dyn HandlerContext<M>, msg: M) {
        self.record(&*ctx, PipelineEvent::Read);
        ctx.fire_channel_read(msg);
    }

    fn write(&self, ctx: &mut dyn HandlerContext<M>, msg: M) {
        self.record(&*ctx, PipelineEvent::Write);
        ctx.write(msg);
    }

    fn flush(&self, ctx: &mut dyn HandlerContext<M>) {
        self.record(&*ctx, PipelineEvent::Flush);
        ctx.flush();
    }
}
