//! Frame logging for `log-transport`.

use std::fmt::Debug;

use tracing::Span;

use crate::observability::dump::PipelineEvent;
use crate::pipeline::handler::{ChannelHandler, HandlerContext};

/// Log target of frame events, used by the filter directives.
pub const FRAME_LOG_TARGET: &str = module_path!();

/// Pipeline stage that logs every frame at DEBUG and forwards it.
#[derive(Debug, Clone)]
pub struct FrameLoggingHandler {
    span: Span,
}

impl FrameLoggingHandler {
    pub fn new(span: Span) -> Self {
        Self { span }
    }
}

impl<M: Debug> ChannelHandler<M> for FrameLoggingHandler {
    fn name(&self) -> &'static str {
        "frame-logging"
    }

    fn channel_read(&self, ctx: &mut dyn HandlerContext<M>, msg: M) {
        tracing::debug!(
            parent: &self.span,
            channel = %ctx.channel_id(),
            event = %PipelineEvent::Read,
            frame = ?msg,
            "Frame"
        );
        ctx.fire_channel_read(msg);
    }

    fn write(&self, ctx: &mut dyn HandlerContext<M>, msg: M) {
        tracing::debug!(
            parent: &self.span,
            channel = %ctx.channel_id(),
            event = %PipelineEvent::Write,
            frame = ?msg,
            "Frame"
        );
        ctx.write(msg);
    }

    fn flush(&self, ctx: &mut dyn HandlerContext<M>) {
        tracing::debug!(
            parent: &self.span,
            channel = %ctx.channel_id(),
            event = %PipelineEvent::Flush,
            "Flush"
        );
        ctx.flush();
    }
}
