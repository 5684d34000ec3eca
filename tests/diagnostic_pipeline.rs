//! Diagnostic stages wired from resolved settings.

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::Span;
use transport_diagnostics::config::loader;
use transport_diagnostics::pipeline::{
    install_diagnostics, BufferAllocator, ChannelHandler, HandlerContext, Pipeline,
    UnpooledAllocator,
};
use transport_diagnostics::TransportSettings;

use common::{Event, FakePooledAllocator, RecordingSink};

fn settings(override_toml: &str) -> TransportSettings {
    let root = loader::load_config_str(override_toml).unwrap();
    TransportSettings::from_root(&root).unwrap()
}

fn diagnostic_pipeline(
    allocator: Arc<dyn BufferAllocator>,
    settings: &TransportSettings,
) -> (Pipeline<String>, Arc<std::sync::Mutex<Vec<Event<String>>>>) {
    let (sink, events) = RecordingSink::<String>::new();
    let mut pipeline = Pipeline::new(allocator, Box::new(sink));
    install_diagnostics(&mut pipeline, settings, &Span::none());
    (pipeline, events)
}

/// Upper-cases inbound frames so the test can tell stages ran in order.
struct Shout;

impl ChannelHandler<String> for Shout {
    fn name(&self) -> &'static str {
        "shout"
    }

    fn channel_read(&self, ctx: &mut dyn HandlerContext<String>, msg: String) {
        ctx.fire_channel_read(msg.to_uppercase());
    }
}

#[test]
fn events_pass_through_unchanged_and_in_order() {
    let settings = settings("[akka.remote.dot-netty.diagnostic.tcp]\nlog-transport = true");
    let allocator = Arc::new(FakePooledAllocator::default());
    let (mut pipeline, events) = diagnostic_pipeline(allocator.clone(), &settings);
    assert_eq!(pipeline.handler_names(), vec!["frame-logging", "allocator-dump"]);

    for i in 0..5 {
        pipeline.fire_channel_read(format!("in-{i}"));
        pipeline.write(format!("out-{i}"));
    }
    pipeline.flush();

    let mut expected = Vec::new();
    for i in 0..5 {
        expected.push(Event::Read(format!("in-{i}")));
        expected.push(Event::Write(format!("out-{i}")));
    }
    expected.push(Event::Flush);
    assert_eq!(*events.lock().unwrap(), expected);

    // Full sample rate: one snapshot per event.
    assert_eq!(allocator.dumps.load(Ordering::Relaxed), 11);
}

#[test]
fn unpooled_allocator_is_never_sampled() {
    let (mut pipeline, events) = diagnostic_pipeline(Arc::new(UnpooledAllocator), &settings(""));
    pipeline.fire_channel_read("frame".to_string());
    pipeline.flush();
    assert_eq!(
        *events.lock().unwrap(),
        vec![Event::Read("frame".to_string()), Event::Flush]
    );
}

#[test]
fn zero_sample_rate_skips_snapshots() {
    let settings = settings(
        "[akka.remote.dot-netty.diagnostic.tcp.allocator-dumps]\nsample-rate = 0.0",
    );
    let allocator = Arc::new(FakePooledAllocator::default());
    let (mut pipeline, events) = diagnostic_pipeline(allocator.clone(), &settings);

    pipeline.write("frame".to_string());
    assert_eq!(allocator.dumps.load(Ordering::Relaxed), 0);
    assert_eq!(events.lock().unwrap().len(), 1);
}

#[test]
fn stats_failures_do_not_reach_the_pipeline() {
    let allocator = Arc::new(FakePooledAllocator {
        fail: true,
        ..FakePooledAllocator::default()
    });
    let (mut pipeline, events) = diagnostic_pipeline(allocator.clone(), &settings(""));

    pipeline.fire_channel_read("a".to_string());
    pipeline.write("b".to_string());
    pipeline.flush();

    assert_eq!(allocator.dumps.load(Ordering::Relaxed), 3);
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            Event::Read("a".to_string()),
            Event::Write("b".to_string()),
            Event::Flush
        ]
    );
}

#[test]
fn dump_stage_follows_application_stages() {
    let allocator = Arc::new(FakePooledAllocator::default());
    let (sink, events) = RecordingSink::<String>::new();
    let mut pipeline = Pipeline::new(allocator.clone(), Box::new(sink));
    pipeline.add_last(Arc::new(Shout));
    install_diagnostics(&mut pipeline, &settings(""), &Span::none());

    pipeline.fire_channel_read("quiet".to_string());
    assert_eq!(*events.lock().unwrap(), vec![Event::Read("QUIET".to_string())]);
    assert_eq!(allocator.dumps.load(Ordering::Relaxed), 1);
}

#[test]
fn disabled_dumps_install_nothing() {
    let settings = settings("[akka.remote.dot-netty.diagnostic.tcp.allocator-dumps]\nenabled = false");
    let (pipeline, _) = diagnostic_pipeline(Arc::new(FakePooledAllocator::default()), &settings);
    assert!(pipeline.is_empty());
}
