mod common;

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use flowswap::stream::{Stream, Subject};
use flowswap::{
    Channel, Config, ConfigError, DebugMode, Definition, EventKind, ProxyKey, ProxyMode,
    ReloadContext, Sink, SlotStatus, WrapError, WrapOptions,
};

use common::{record, taken, Recorder};

fn single(up: &Subject<u32>) -> impl Fn(&(), &()) -> anyhow::Result<Sink<u32>> + Send + Sync + 'static {
    let s = up.stream();
    move |_: &(), _: &()| Ok(Sink::Single(s.clone()))
}

fn context(proxy: ProxyMode) -> (Arc<ReloadContext>, Arc<Recorder>) {
    let rec = Arc::new(Recorder::default());
    let ctx = ReloadContext::builder(Config {
        proxy,
        debug: DebugMode::On,
    })
    .with_diagnostics(rec.clone())
    .build();
    (ctx, rec)
}

#[test]
fn single_stream_is_proxied() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let up = Subject::new();

    let df = ctx.wrap(single(&up), "a", WrapOptions::inherit()).unwrap();
    let out = df.call((), ()).unwrap().into_single().unwrap();
    let (_sub, seen) = record(&out);

    up.next(1);
    up.next(2);
    assert_eq!(taken(&seen), vec![1, 2]);
    assert_eq!(ctx.instance_count("a"), 1);
    assert_eq!(ctx.proxy_keys("a"), vec![ProxyKey::single("a", 0)]);
}

#[test]
fn named_channels_keep_plain_values() {
    let (ctx, rec) = context(ProxyMode::Passthrough);
    let x = Subject::<u32>::new();
    let xs = x.stream();

    let df = ctx
        .wrap(
            move |_: &(), _: &()| {
                Ok(Sink::named([
                    ("x", Channel::Stream(xs.clone())),
                    ("y", Channel::Value("literal")),
                ]))
            },
            "b",
            WrapOptions::inherit(),
        )
        .unwrap();
    let out = df.call((), ()).unwrap();

    assert_eq!(out.value("y"), Some(&"literal"));
    let proxied = ctx.proxy_stream::<u32>(&ProxyKey::new("b", 0, "x")).unwrap();
    assert!(Stream::ptr_eq(out.stream("x").unwrap(), &proxied));
    assert!(ctx.proxy(&ProxyKey::new("b", 0, "y")).is_none());

    let (_sub, seen) = record(out.stream("x").unwrap());
    x.next(7);
    assert_eq!(taken(&seen), vec![7]);

    let skipped = rec.of(EventKind::NoProxyStream);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].channel.as_deref(), Some("y"));
}

#[test]
fn buffered_proxy_replays_last_values() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let up = Subject::new();

    let df = ctx.wrap(single(&up), "c", WrapOptions::inherit().buffered(2)).unwrap();
    assert_eq!(df.proxy_mode(), ProxyMode::buffered(2));
    let out = df.call((), ()).unwrap().into_single().unwrap();

    up.next(1);
    up.next(2);
    up.next(3);
    let (_sub, seen) = record(&out);
    assert_eq!(taken(&seen), vec![2, 3]);

    up.next(4);
    assert_eq!(taken(&seen), vec![2, 3, 4]);
}

#[test]
fn buffered_proxy_replays_fewer_than_capacity() {
    let (ctx, _rec) = context(ProxyMode::buffered(5));
    let up = Subject::new();

    let df = ctx.wrap(single(&up), "c", WrapOptions::inherit()).unwrap();
    let out = df.call((), ()).unwrap().into_single().unwrap();
    up.next(1);
    up.next(2);

    let (_sub, seen) = record(&out);
    assert_eq!(taken(&seen), vec![1, 2]);
}

#[test]
fn static_definition_is_returned_unchanged() {
    let (ctx, rec) = context(ProxyMode::Passthrough);
    type F = fn(&(), &()) -> anyhow::Result<Sink<u32>>;

    let def: Definition<F, &str> = Definition::Static("component");
    let wrapped = ctx
        .wrap_definition::<(), (), u32, (), F, &str>(def, "", WrapOptions::inherit())
        .unwrap();

    assert_eq!(wrapped.into_static(), Some("component"));
    assert!(ctx.slots().is_empty());
    assert!(rec.kinds().is_empty());
}

#[test]
fn dataflow_definition_is_wrapped() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let up = Subject::new();

    let def: Definition<_, ()> = Definition::Dataflow(single(&up));
    let df = ctx
        .wrap_definition(def, "d", WrapOptions::inherit())
        .unwrap()
        .into_dataflow()
        .unwrap();
    df.call((), ()).unwrap();

    assert_eq!(df.slot().as_str(), "d");
    assert_eq!(ctx.instance_count("d"), 1);
}

#[test]
fn blank_slot_id_is_rejected() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let up = Subject::new();

    for bad in ["", "   "] {
        let err = ctx.wrap(single(&up), bad, WrapOptions::inherit()).err().unwrap();
        assert!(matches!(
            err.as_config(),
            Some(ConfigError::InvalidSlotId { got }) if got == bad
        ));
    }
    assert!(ctx.slots().is_empty());
}

#[test]
fn reload_keeps_proxy_identity() {
    let (ctx, _rec) = context(ProxyMode::buffered(1));
    let version = |v: u32| {
        move |input: &u32, _: &()| -> anyhow::Result<Sink<u32>> {
            Ok(Sink::named([
                ("a", Channel::Stream(Stream::of(vec![input * 10 + v]))),
                ("b", Channel::Stream(Stream::of(vec![input * 100 + v]))),
            ]))
        }
    };

    let df = ctx.wrap(version(1), "id", WrapOptions::inherit()).unwrap();
    let first = df.call(1, ()).unwrap();
    let second = df.call(2, ()).unwrap();
    let ids: Vec<usize> = ctx
        .proxy_keys("id")
        .iter()
        .map(|k| ctx.proxy(k).unwrap().stream_id())
        .collect();
    assert_eq!(ids.len(), 4);

    let (_s1, a1) = record(first.stream("a").unwrap());
    let (_s2, b2) = record(second.stream("b").unwrap());
    assert_eq!(taken(&a1), vec![11]);
    assert_eq!(taken(&b2), vec![201]);

    ctx.wrap(version(2), "id", WrapOptions::inherit()).unwrap();

    let after: Vec<usize> = ctx
        .proxy_keys("id")
        .iter()
        .map(|k| ctx.proxy(k).unwrap().stream_id())
        .collect();
    assert_eq!(ids, after);
    assert_eq!(taken(&a1), vec![11, 12]);
    assert_eq!(taken(&b2), vec![201, 202]);
    assert_eq!(ctx.status("id"), SlotStatus::Initialized { reloads: 1 });
    assert_eq!(ctx.instance_count("id"), 2);
}

#[test]
fn reload_stops_old_values() {
    let (ctx, rec) = context(ProxyMode::Passthrough);
    let old = Subject::new();
    let new = Subject::new();

    let df = ctx.wrap(single(&old), "app", WrapOptions::inherit()).unwrap();
    let out = df.call((), ()).unwrap().into_single().unwrap();
    let (_sub, seen) = record(&out);
    old.next(1);

    ctx.wrap(single(&new), "app", WrapOptions::inherit()).unwrap();
    assert_eq!(old.observer_count(), 0);
    assert_eq!(new.observer_count(), 1);

    old.next(2);
    new.next(3);
    assert_eq!(taken(&seen), vec![1, 3]);

    let reloaded = rec.of(EventKind::Reloaded);
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].reason.as_deref(), Some("1"));
    assert_eq!(
        rec.rendered().last().map(String::as_str),
        Some("[hmr] proxy app: reloaded 1 instance(s)")
    );
}

#[test]
fn passthrough_releases_upstream_with_last_consumer() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let up = Subject::new();

    let df = ctx.wrap(single(&up), "p", WrapOptions::inherit()).unwrap();
    let out = df.call((), ()).unwrap().into_single().unwrap();
    assert_eq!(up.observer_count(), 0);

    let (first, _) = record(&out);
    let (second, _) = record(&out);
    assert_eq!(up.observer_count(), 2);

    first.dispose();
    assert_eq!(up.observer_count(), 1);
    second.dispose();
    assert_eq!(up.observer_count(), 0);

    let proxy = ctx.proxy(&ProxyKey::single("p", 0)).unwrap();
    assert!(proxy.has_source());
    assert!(!proxy.is_connected());
    assert_eq!(proxy.watchers(), 0);
}

#[test]
fn passthrough_gives_each_consumer_its_own_upstream() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let version = Arc::new(Mutex::new(1u32));

    let v = version.clone();
    let df = ctx
        .wrap(
            move |_: &(), _: &()| {
                let base = *v.lock().unwrap() * 10;
                Ok(Sink::<u32>::Single(Stream::of(vec![base + 1, base + 2, base + 3])))
            },
            "cold",
            WrapOptions::inherit(),
        )
        .unwrap();
    let out = df.call((), ()).unwrap().into_single().unwrap();

    let (_a, seen_a) = record(&out);
    let (_b, seen_b) = record(&out);
    assert_eq!(taken(&seen_a), vec![11, 12, 13]);
    assert_eq!(taken(&seen_b), vec![11, 12, 13]);

    *version.lock().unwrap() = 2;
    let v = version.clone();
    ctx.wrap(
        move |_: &(), _: &()| {
            let base = *v.lock().unwrap() * 10;
            Ok(Sink::<u32>::Single(Stream::of(vec![base + 1, base + 2, base + 3])))
        },
        "cold",
        WrapOptions::inherit(),
    )
    .unwrap();
    assert_eq!(taken(&seen_a), vec![11, 12, 13, 21, 22, 23]);
    assert_eq!(taken(&seen_b), vec![11, 12, 13, 21, 22, 23]);
}

#[test]
fn reload_without_consumers_reports_no_subscription() {
    let (ctx, rec) = context(ProxyMode::Passthrough);
    let up = Subject::new();

    let df = ctx.wrap(single(&up), "idle", WrapOptions::inherit()).unwrap();
    df.call((), ()).unwrap();
    ctx.wrap(single(&up), "idle", WrapOptions::inherit()).unwrap();

    let missing = rec.of(EventKind::NoSubscription);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].instance, Some(0));
    assert_eq!(missing[0].channel.as_deref(), Some("sinks"));
    assert_eq!(up.observer_count(), 0);
}

#[test]
fn removed_channel_is_retired_then_revived() {
    let (ctx, rec) = context(ProxyMode::Passthrough);
    let a = Subject::<u32>::new();
    let b1 = Subject::<u32>::new();
    let b3 = Subject::<u32>::new();

    let shape = |a: &Subject<u32>, b: Option<&Subject<u32>>| {
        let a = a.stream();
        let b = b.map(Subject::stream);
        move |_: &(), _: &()| -> anyhow::Result<Sink<u32>> {
            let mut channels = vec![("a", Channel::Stream(a.clone()))];
            if let Some(b) = &b {
                channels.push(("b", Channel::Stream(b.clone())));
            }
            Ok(Sink::named(channels))
        }
    };

    let df = ctx.wrap(shape(&a, Some(&b1)), "r", WrapOptions::inherit()).unwrap();
    let out = df.call((), ()).unwrap();
    let (_sub, seen) = record(out.stream("b").unwrap());
    b1.next(1);

    ctx.wrap(shape(&a, None), "r", WrapOptions::inherit()).unwrap();
    let retired = rec.of(EventKind::ChannelRetired);
    assert_eq!(retired.len(), 1);
    assert_eq!(retired[0].channel.as_deref(), Some("b"));
    let b_proxy = ctx.proxy(&ProxyKey::new("r", 0, "b")).unwrap();
    assert!(!b_proxy.has_source());
    assert_eq!(b1.observer_count(), 0);

    b1.next(2);
    ctx.wrap(shape(&a, Some(&b3)), "r", WrapOptions::inherit()).unwrap();
    b3.next(3);

    assert!(b_proxy.is_connected());
    assert_eq!(taken(&seen), vec![1, 3]);
    assert_eq!(ctx.status("r"), SlotStatus::Initialized { reloads: 2 });
}

#[test]
fn new_channel_on_reload_is_ignored() {
    let (ctx, rec) = context(ProxyMode::buffered(0));
    let a = Subject::<u32>::new();
    let c = Subject::<u32>::new();

    let (a1, a2, cs) = (a.stream(), a.stream(), c.stream());
    let df = ctx
        .wrap(
            move |_: &(), _: &()| Ok(Sink::<u32>::named([("a", Channel::Stream(a1.clone()))])),
            "n",
            WrapOptions::inherit(),
        )
        .unwrap();
    df.call((), ()).unwrap();

    ctx.wrap(
        move |_: &(), _: &()| {
            Ok(Sink::<u32>::named([
                ("a", Channel::Stream(a2.clone())),
                ("c", Channel::Stream(cs.clone())),
            ]))
        },
        "n",
        WrapOptions::inherit(),
    )
    .unwrap();

    assert_eq!(rec.of(EventKind::UnknownChannel).len(), 1);
    assert!(ctx.proxy(&ProxyKey::new("n", 0, "c")).is_none());
    assert_eq!(c.observer_count(), 0);
    assert_eq!(a.observer_count(), 1);
}

#[test]
fn non_stream_result_is_not_registered() {
    let (ctx, rec) = context(ProxyMode::Passthrough);

    let df = ctx
        .wrap(
            |input: &u32, _: &()| Ok(Sink::<u32, u32>::Opaque(input + 1)),
            "o",
            WrapOptions::inherit(),
        )
        .unwrap();
    assert_eq!(df.call(4, ()).unwrap().into_opaque(), Some(5));

    let values = ctx
        .wrap(
            |_: &(), _: &()| Ok(Sink::<u32, &str>::named([("title", Channel::Value("t"))])),
            "v",
            WrapOptions::inherit(),
        )
        .unwrap();
    assert_eq!(values.call((), ()).unwrap().value("title"), Some(&"t"));

    assert_eq!(rec.of(EventKind::NotStreamResult).len(), 2);
    assert_eq!(ctx.instance_count("o"), 0);
    assert_eq!(ctx.instance_count("v"), 0);
}

#[test]
fn first_run_error_is_returned_unchanged() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let df = ctx
        .wrap(
            |_: &(), _: &()| -> anyhow::Result<Sink<u32>> { Err(anyhow!("boom")) },
            "e",
            WrapOptions::inherit(),
        )
        .unwrap();

    let err = df.call((), ()).err().unwrap();
    assert_eq!(err.to_string(), "boom");
    assert_eq!(ctx.instance_count("e"), 0);
}

#[test]
fn reload_failure_stops_at_failing_instance() {
    let (ctx, rec) = context(ProxyMode::buffered(0));
    let v1 = Subject::<u32>::new();
    let v2 = Subject::<u32>::new();

    let s1 = v1.stream();
    let df = ctx
        .wrap(move |_: &u32, _: &()| Ok(Sink::<u32>::Single(s1.clone())), "f", WrapOptions::inherit())
        .unwrap();
    for input in 0..3 {
        df.call(input, ()).unwrap();
    }
    assert_eq!(v1.observer_count(), 3);

    let s2 = v2.stream();
    let err = ctx
        .wrap(
            move |input: &u32, _: &()| {
                if *input == 1 {
                    return Err(anyhow!("bad input {input}"));
                }
                Ok(Sink::<u32>::Single(s2.clone()))
            },
            "f",
            WrapOptions::inherit(),
        )
        .err()
        .unwrap();

    match &err {
        WrapError::Reload { slot, instance, source } => {
            assert_eq!(slot, "f");
            assert_eq!(*instance, 1);
            assert_eq!(source.to_string(), "bad input 1");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.as_label(), "wrap_reload_failed");

    let connected = |i| ctx.proxy(&ProxyKey::single("f", i)).unwrap();
    assert!(connected(0).is_connected());
    assert!(!connected(1).is_connected());
    assert!(!connected(1).has_source());
    assert!(connected(2).is_connected());
    assert_eq!(v1.observer_count(), 1);
    assert_eq!(v2.observer_count(), 1);

    assert_eq!(ctx.status("f"), SlotStatus::Initialized { reloads: 0 });
    let failed = rec.of(EventKind::ReloadFailed);
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].instance, Some(1));
    assert!(rec.of(EventKind::Reloaded).is_empty());

    let s3 = v2.stream();
    ctx.wrap(
        move |_: &u32, _: &()| Ok(Sink::<u32>::Single(s3.clone())),
        "f",
        WrapOptions::inherit(),
    )
    .unwrap();
    assert!((0..3).all(|i| connected(i).is_connected()));
    assert_eq!(v1.observer_count(), 0);
    assert_eq!(v2.observer_count(), 3);
    assert_eq!(ctx.status("f"), SlotStatus::Initialized { reloads: 1 });
}

#[test]
fn reentrant_wrap_is_rejected() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let up = Subject::<u32>::new();

    let df = ctx.wrap(single(&up), "loop", WrapOptions::inherit()).unwrap();
    df.call((), ()).unwrap();

    let nested: Arc<Mutex<Option<WrapError>>> = Arc::default();
    let (inner_ctx, slot_err, s) = (Arc::clone(&ctx), Arc::clone(&nested), up.stream());
    let inner_up = up.clone();
    ctx.wrap(
        move |_: &(), _: &()| {
            let again = inner_ctx.wrap(single(&inner_up), "loop", WrapOptions::inherit());
            *slot_err.lock().unwrap() = again.err();
            Ok(Sink::<u32>::Single(s.clone()))
        },
        "loop",
        WrapOptions::inherit(),
    )
    .unwrap();

    let err = nested.lock().unwrap().take().unwrap();
    assert!(matches!(
        err.as_config(),
        Some(ConfigError::ReloadInProgress { slot }) if slot == "loop"
    ));
    assert_eq!(ctx.status("loop"), SlotStatus::Initialized { reloads: 1 });
}

#[test]
fn slot_types_must_match() {
    let (ctx, _rec) = context(ProxyMode::Passthrough);
    let numbers = Subject::<u32>::new();
    let words = Subject::<String>::new();

    let df = ctx.wrap(single(&numbers), "t", WrapOptions::inherit()).unwrap();
    df.call((), ()).unwrap();

    let ws = words.stream();
    let err = ctx
        .wrap(
            move |_: &(), _: &()| Ok(Sink::<String>::Single(ws.clone())),
            "t",
            WrapOptions::inherit(),
        )
        .err()
        .unwrap();
    assert_eq!(
        err.as_config(),
        Some(&ConfigError::TypeMismatch { slot: "t".into() })
    );
    assert_eq!(ctx.status("t"), SlotStatus::Initialized { reloads: 0 });
}
