mod common;

use std::sync::{Arc, Mutex};

use flowswap::stream::Subject;
use flowswap::{
    Config, DebugMode, Diagnostics, Event, EventKind, Level, MessageSink, ProxyMode,
    ReloadContext, Sink, TracingWriter, WrapOptions,
};

use common::Recorder;

fn producer(up: &Subject<u32>) -> impl Fn(&(), &()) -> anyhow::Result<Sink<u32>> + Send + Sync + 'static {
    let s = up.stream();
    move |_: &(), _: &()| Ok(Sink::Single(s.clone()))
}

fn with_recorder(debug: DebugMode) -> (Arc<ReloadContext>, Arc<Recorder>) {
    let rec = Arc::new(Recorder::default());
    let ctx = ReloadContext::builder(Config {
        proxy: ProxyMode::Passthrough,
        debug,
    })
    .with_diagnostics(rec.clone())
    .build();
    (ctx, rec)
}

#[test]
fn lifecycle_events_in_order() {
    let (ctx, rec) = with_recorder(DebugMode::On);
    let up = Subject::new();

    let df = ctx.wrap(producer(&up), "life", WrapOptions::inherit()).unwrap();
    let out = df.call((), ()).unwrap().into_single().unwrap();
    let _sub = out.subscribe_fn(|_| {});
    ctx.wrap(producer(&up), "life", WrapOptions::inherit()).unwrap();

    assert_eq!(
        rec.kinds(),
        vec![
            EventKind::Created,
            EventKind::Executed,
            EventKind::InstanceRegistered,
            EventKind::Created,
            EventKind::Reloading,
            EventKind::Reloaded,
        ]
    );
    assert_eq!(
        rec.rendered(),
        vec![
            "[hmr] proxy life: created",
            "[hmr] proxy life: execute",
            "[hmr] proxy life: registered instance #0",
            "[hmr] proxy life: created",
            "[hmr] proxy life: reload instance #0",
            "[hmr] proxy life: reloaded 1 instance(s)",
        ]
    );
}

#[test]
fn debug_off_reports_nothing() {
    let (ctx, rec) = with_recorder(DebugMode::Off);
    let up = Subject::new();

    let df = ctx.wrap(producer(&up), "quiet", WrapOptions::inherit()).unwrap();
    df.call((), ()).unwrap();
    ctx.wrap(producer(&up), "quiet", WrapOptions::inherit()).unwrap();

    assert!(rec.kinds().is_empty());
}

#[test]
fn level_threshold_filters_events() {
    let (ctx, rec) = with_recorder(DebugMode::Level(Level::Info));
    let up = Subject::new();

    let df = ctx.wrap(producer(&up), "lvl", WrapOptions::inherit()).unwrap();
    df.call((), ()).unwrap();
    ctx.wrap(producer(&up), "lvl", WrapOptions::inherit()).unwrap();

    assert_eq!(rec.kinds(), vec![EventKind::Reloaded]);
}

#[test]
fn per_wrap_debug_overrides_context() {
    let (ctx, rec) = with_recorder(DebugMode::Off);
    let up = Subject::new();

    let df = ctx
        .wrap(producer(&up), "loud", WrapOptions::inherit().with_debug(true))
        .unwrap();
    df.call((), ()).unwrap();

    let events = rec.of(EventKind::InstanceRegistered);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].slot.as_deref(), Some("loud"));
    assert_eq!(events[0].instance, Some(0));
}

#[test]
fn debug_mode_from_strings() {
    assert_eq!("".parse::<DebugMode>().unwrap(), DebugMode::Off);
    assert_eq!("true".parse::<DebugMode>().unwrap(), DebugMode::On);
    assert_eq!("warn".parse::<DebugMode>().unwrap(), DebugMode::Level(Level::Warn));
    assert_eq!("shout".parse::<DebugMode>().unwrap(), DebugMode::Level(Level::Debug));
}

#[test]
fn message_sink_receives_rendered_lines() {
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let out = Arc::clone(&lines);
    let ctx = ReloadContext::builder(Config {
        debug: DebugMode::On,
        ..Config::default()
    })
    .with_diagnostics(Arc::new(MessageSink::new(move |line: &str| {
        out.lock().unwrap().push(line.to_string())
    })))
    .build();

    let df = ctx
        .wrap(
            |_: &(), _: &()| Ok(Sink::<u32, &str>::Opaque("plain")),
            "msg",
            WrapOptions::inherit(),
        )
        .unwrap();
    df.call((), ()).unwrap();

    assert_eq!(
        *lines.lock().unwrap(),
        vec![
            "[hmr] proxy msg: created",
            "[hmr] proxy msg: execute",
            "[hmr] proxy msg: sink not a stream result",
        ]
    );
}

struct Panicky;

impl Diagnostics for Panicky {
    fn on_event(&self, _event: &Event) {
        panic!("sink exploded");
    }

    fn name(&self) -> &'static str {
        "panicky"
    }
}

#[test]
fn panicking_sink_does_not_break_reload() {
    let rec = Arc::new(Recorder::default());
    let ctx = ReloadContext::builder(Config {
        debug: DebugMode::On,
        ..Config::default()
    })
    .with_diagnostics(Arc::new(Panicky))
    .with_diagnostics(Arc::new(TracingWriter))
    .with_diagnostics(rec.clone())
    .build();
    let up = Subject::new();

    let df = ctx.wrap(producer(&up), "p", WrapOptions::inherit()).unwrap();
    df.call((), ()).unwrap();
    assert_eq!(ctx.instance_count("p"), 1);

    let panics = rec.of(EventKind::SinkPanicked);
    assert_eq!(panics.len(), 3);
    assert!(panics[0]
        .reason
        .as_deref()
        .is_some_and(|r| r.contains("panicky") && r.contains("sink exploded")));
    assert_eq!(rec.of(EventKind::Created).len(), 1);
}
