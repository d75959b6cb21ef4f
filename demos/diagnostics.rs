//! # Example: diagnostics
//!
//! Demonstrates the built-in diagnostics sinks and per-slot reporting.
//!
//! Shows how to:
//! - Print `[hmr] proxy <slot>: ...` lines with [`MessageSink`].
//! - Forward events to `tracing` with [`TracingWriter`]; the host installs the subscriber.
//! - Narrow reporting per wrap with [`DebugMode::Level`].
//! - Read the typed [`WrapError`] of a failed reload.
//!
//! ## Run
//! With the `logging` feature the stdout [`LogWriter`] is attached as well.
//! ```bash
//! cargo run --example diagnostics
//! cargo run --example diagnostics --features logging
//! ```

use std::sync::Arc;

use anyhow::anyhow;

use flowswap::stream::Subject;
use flowswap::{
    Channel, Config, DebugMode, Level, MessageSink, ProxyMode, ReloadContext, Sink,
    TracingWriter, WrapError, WrapOptions,
};

fn main() -> anyhow::Result<()> {
    #[allow(unused_mut)]
    let mut builder = ReloadContext::builder(Config {
        proxy: ProxyMode::buffered(1),
        debug: DebugMode::On,
    })
    .with_diagnostics(Arc::new(MessageSink::new(|line: &str| println!("{line}"))))
    .with_diagnostics(Arc::new(TracingWriter));

    #[cfg(feature = "logging")]
    {
        builder = builder.with_diagnostics(Arc::new(flowswap::LogWriter));
    }
    let ctx = builder.build();

    let dom = Subject::<String>::new();
    let http = Subject::<String>::new();

    println!("--- first run: every event is reported");
    let (d, h) = (dom.stream(), http.stream());
    let page = ctx.wrap(
        move |_: &(), _: &()| {
            Ok(Sink::<String>::named([
                ("dom", Channel::Stream(d.clone())),
                ("http", Channel::Stream(h.clone())),
            ]))
        },
        "page",
        WrapOptions::inherit(),
    )?;
    page.call((), ())?;

    println!("--- reload dropping `http`: only warnings and above");
    let d = dom.stream();
    ctx.wrap(
        move |_: &(), _: &()| Ok(Sink::<String>::named([("dom", Channel::Stream(d.clone()))])),
        "page",
        WrapOptions::inherit().with_debug(DebugMode::Level(Level::Warn)),
    )?;

    println!("--- failing reload");
    let failed = ctx.wrap(
        |_: &(), _: &()| -> anyhow::Result<Sink<String>> { Err(anyhow!("template missing")) },
        "page",
        WrapOptions::inherit(),
    );
    match failed {
        Err(err @ WrapError::Reload { .. }) => println!("wrap failed: {} ({})", err, err.as_label()),
        Err(other) => return Err(other.into()),
        Ok(_) => println!("wrap unexpectedly succeeded"),
    }

    for key in ctx.proxy_keys("page") {
        if let Some(proxy) = ctx.proxy(&key) {
            println!(
                "{key}: connected={} source={}",
                proxy.is_connected(),
                proxy.has_source()
            );
        }
    }
    Ok(())
}
