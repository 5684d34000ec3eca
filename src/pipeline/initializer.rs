//! Installs the diagnostic stages a transport asks for.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::Span;

use crate::observability::dump::AllocatorDumpHandler;
use crate::observability::frames::FrameLoggingHandler;
use crate::pipeline::handler::Pipeline;
use crate::settings::TransportSettings;

/// Append the diagnostic stages enabled by `settings` to `pipeline`.
///
/// Frame logging goes first so it sees frames before the dump stage.
/// Returns how many stages were added.
pub fn install_diagnostics<M: Debug>(
    pipeline: &mut Pipeline<M>,
    settings: &TransportSettings,
    span: &Span,
) -> usize {
    let mut installed = 0;

    if settings.log_transport() {
        pipeline.add_last(Arc::new(FrameLoggingHandler::new(span.clone())));
        installed += 1;
    }

    if settings.enable_buffer_pool_dumps() {
        pipeline.add_last(Arc::new(AllocatorDumpHandler::new(
            span.clone(),
            settings.buffer_pool_dump_sample_rate(),
        )));
        installed += 1;
    }

    tracing::debug!(
        parent: span,
        channel = %pipeline.channel_id(),
        installed,
        stages = ?pipeline.handler_names(),
        "Diagnostic stages installed"
    );

    installed
}
