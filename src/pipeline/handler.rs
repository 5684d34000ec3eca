//! Pipeline stages and dispatch.
//!
//! # Event Flow
//! ```text
//! fire_channel_read:  head → handler[0] → handler[1] → … → sink.on_read
//! write / flush:      tail → handler[n-1] → … → handler[0] → sink.on_write / on_flush
//! ```
//!
//! Each handler decides whether to pass an event on by calling the matching
//! method on its context. The default trait methods simply forward.

use std::sync::Arc;

use crate::pipeline::allocator::BufferAllocator;
use crate::pipeline::channel::ChannelId;

/// What a handler sees of the pipeline around it.
pub trait HandlerContext<M> {
    fn channel_id(&self) -> ChannelId;

    /// The allocator attached to this channel.
    fn allocator(&self) -> &dyn BufferAllocator;

    /// Pass an inbound message to the next handler towards the tail.
    fn fire_channel_read(&mut self, msg: M);

    /// Pass an outbound message to the next handler towards the head.
    fn write(&mut self, msg: M);

    /// Pass a flush request to the next handler towards the head.
    fn flush(&mut self);
}

/// A pipeline stage.
///
/// Handlers are shared between dispatching threads and must not keep
/// per-event state.
pub trait ChannelHandler<M>: Send + Sync {
    /// Stage name used in diagnostics.
    fn name(&self) -> &'static str;

    fn channel_read(&self, ctx: &mut dyn HandlerContext<M>, msg: M) {
        ctx.fire_channel_read(msg);
    }

    fn write(&self, ctx: &mut dyn HandlerContext<M>, msg: M) {
        ctx.write(msg);
    }

    fn flush(&self, ctx: &mut dyn HandlerContext<M>) {
        ctx.flush();
    }
}

/// Where events end up after the last handler: the application for reads,
/// the socket for writes and flushes.
pub trait PipelineSink<M>: Send {
    fn on_read(&mut self, channel: ChannelId, msg: M);
    fn on_write(&mut self, channel: ChannelId, msg: M);
    fn on_flush(&mut self, channel: ChannelId);
}

/// An ordered chain of handlers bound to one channel.
pub struct Pipeline<M> {
    channel_id: ChannelId,
    allocator: Arc<dyn BufferAllocator>,
    handlers: Vec<Arc<dyn ChannelHandler<M>>>,
    sink: Box<dyn PipelineSink<M>>,
}

impl<M> Pipeline<M> {
    /// Create an empty pipeline with a fresh channel ID.
    pub fn new(allocator: Arc<dyn BufferAllocator>, sink: Box<dyn PipelineSink<M>>) -> Self {
        Self::with_channel_id(ChannelId::new(), allocator, sink)
    }

    pub fn with_channel_id(
        channel_id: ChannelId,
        allocator: Arc<dyn BufferAllocator>,
        sink: Box<dyn PipelineSink<M>>,
    ) -> Self {
        Self {
            channel_id,
            allocator,
            handlers: Vec::new(),
            sink,
        }
    }

    /// Append a handler at the tail.
    pub fn add_last(&mut self, handler: Arc<dyn ChannelHandler<M>>) -> &mut Self {
        tracing::trace!(channel = %self.channel_id, handler = handler.name(), "Handler added");
        self.handlers.push(handler);
        self
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver an inbound message starting at the head.
    pub fn fire_channel_read(&mut self, msg: M) {
        self.head_context().read_from(0, msg);
    }

    /// Deliver an outbound message starting at the tail.
    pub fn write(&mut self, msg: M) {
        let tail = self.handlers.len().checked_sub(1);
        self.head_context().write_from(tail, msg);
    }

    /// Deliver a flush starting at the tail.
    pub fn flush(&mut self) {
        let tail = self.handlers.len().checked_sub(1);
        self.head_context().flush_from(tail);
    }

    fn head_context(&mut self) -> StageContext<'_, M> {
        StageContext {
            handlers: &self.handlers,
            allocator: self.allocator.as_ref(),
            sink: self.sink.as_mut(),
            channel_id: self.channel_id,
            position: 0,
        }
    }
}

/// Context handed to the handler at `position`.
struct StageContext<'a, M> {
    handlers: &'a [Arc<dyn ChannelHandler<M>>],
    allocator: &'a dyn BufferAllocator,
    sink: &'a mut (dyn PipelineSink<M> + 'static),
    channel_id: ChannelId,
    position: usize,
}

impl<'a, M> StageContext<'a, M> {
    fn at(&mut self, position: usize) -> StageContext<'_, M> {
        StageContext {
            handlers: self.handlers,
            allocator: self.allocator,
            sink: &mut *self.sink,
            channel_id: self.channel_id,
            position,
        }
    }

    fn read_from(&mut self, index: usize, msg: M) {
        let handlers = self.handlers;
        match handlers.get(index) {
            Some(handler) => handler.channel_read(&mut self.at(index), msg),
            None => self.sink.on_read(self.channel_id, msg),
        }
    }

    fn write_from(&mut self, index: Option<usize>, msg: M) {
        let handlers = self.handlers;
        match index.and_then(|i| handlers.get(i).map(|handler| (i, handler))) {
            Some((i, handler)) => handler.write(&mut self.at(i), msg),
            None => self.sink.on_write(self.channel_id, msg),
        }
    }

    fn flush_from(&mut self, index: Option<usize>) {
        let handlers = self.handlers;
        match index.and_then(|i| handlers.get(i).map(|handler| (i, handler))) {
            Some((i, handler)) => handler.flush(&mut self.at(i)),
            None => self.sink.on_flush(self.channel_id),
        }
    }
}

impl<M> HandlerContext<M> for StageContext<'_, M> {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    fn allocator(&self) -> &dyn BufferAllocator {
        self.allocator
    }

    fn fire_channel_read(&mut self, msg: M) {
        self.read_from(self.position + 1, msg);
    }

    fn write(&mut self, msg: M) {
        self.write_from(self.position.checked_sub(1), msg);
    }

    fn flush(&mut self) {
        self.flush_from(self.position.checked_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::allocator::UnpooledAllocator;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Read(u32),
        Write(u32),
        Flush,
    }

    /// Records terminal events into a shared log.
    struct RecordingSink(Arc<Mutex<Vec<Seen>>>);

    impl PipelineSink<u32> for RecordingSink {
        fn on_read(&mut self, _channel: ChannelId, msg: u32) {
            self.0.lock().unwrap().push(Seen::Read(msg));
        }
        fn on_write(&mut self, _channel: ChannelId, msg: u32) {
            self.0.lock().unwrap().push(Seen::Write(msg));
        }
        fn on_flush(&mut self, _channel: ChannelId) {
            self.0.lock().unwrap().push(Seen::Flush);
        }
    }

    /// Adds a constant and records the order it was visited in.
    struct Adder {
        name: &'static str,
        amount: u32,
        visits: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ChannelHandler<u32> for Adder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn channel_read(&self, ctx: &mut dyn HandlerContext<u32>, msg: u32) {
            self.visits.lock().unwrap().push(self.name);
            ctx.fire_channel_read(msg + self.amount);
        }

        fn write(&self, ctx: &mut dyn HandlerContext<u32>, msg: u32) {
            self.visits.lock().unwrap().push(self.name);
            ctx.write(msg + self.amount);
        }
    }

    /// Swallows every read.
    struct Swallow;

    impl ChannelHandler<u32> for Swallow {
        fn name(&self) -> &'static str {
            "swallow"
        }

        fn channel_read(&self, _ctx: &mut dyn HandlerContext<u32>, _msg: u32) {}
    }

    fn pipeline() -> (Pipeline<u32>, Arc<Mutex<Vec<Seen>>>, Arc<Mutex<Vec<&'static str>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let visits = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new(
            Arc::new(UnpooledAllocator),
            Box::new(RecordingSink(seen.clone())),
        );
        pipeline
            .add_last(Arc::new(Adder { name: "first", amount: 1, visits: visits.clone() }))
            .add_last(Arc::new(Adder { name: "second", amount: 10, visits: visits.clone() }));
        (pipeline, seen, visits)
    }

    #[test]
    fn inbound_runs_head_to_tail() {
        let (mut pipeline, seen, visits) = pipeline();
        pipeline.fire_channel_read(100);
        assert_eq!(*seen.lock().unwrap(), vec![Seen::Read(111)]);
        assert_eq!(*visits.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn outbound_runs_tail_to_head() {
        let (mut pipeline, seen, visits) = pipeline();
        pipeline.write(100);
        pipeline.flush();
        assert_eq!(*seen.lock().unwrap(), vec![Seen::Write(111), Seen::Flush]);
        assert_eq!(*visits.lock().unwrap(), vec!["second", "first"]);
    }

    #[test]
    fn empty_pipeline_goes_straight_to_sink() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut pipeline = Pipeline::new(
            Arc::new(UnpooledAllocator),
            Box::new(RecordingSink(seen.clone())),
        );
        assert!(pipeline.is_empty());
        pipeline.fire_channel_read(1);
        pipeline.write(2);
        pipeline.flush();
        assert_eq!(*seen.lock().unwrap(), vec![Seen::Read(1), Seen::Write(2), Seen::Flush]);
    }

    #[test]
    fn handler_may_stop_propagation() {
        let (mut pipeline, seen, _) = pipeline();
        pipeline.add_last(Arc::new(Swallow));
        pipeline.fire_channel_read(5);
        pipeline.write(5);
        assert_eq!(*seen.lock().unwrap(), vec![Seen::Write(16)]);
        assert_eq!(pipeline.handler_names(), vec!["first", "second", "swallow"]);
    }
}
