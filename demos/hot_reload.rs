//! # Example: hot_reload
//!
//! Walks through one reload of a wrapped dataflow.
//!
//! Shows how to:
//! - Wrap a producer under a slot id and call it.
//! - Consume the proxy stream from an async task via [`Stream::into_async`].
//! - Re-wrap a new producer under the same slot while the consumer keeps running.
//! - Follow the reload on a [`Bus`] through [`BusForwarder`].
//!
//! ## Flow
//! ```text
//! wrap(v1, "counter") ──► call() ──► proxy stream ──► consumer task
//!                                         ▲
//! wrap(v2, "counter") ──► reload pass ────┘ (same proxy, new upstream)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example hot_reload
//! ```

use std::sync::Arc;

use anyhow::anyhow;
use futures::StreamExt;
use tokio::sync::broadcast::error::TryRecvError;

use flowswap::stream::{Stream, Subject};
use flowswap::{
    Bus, BusForwarder, Config, DebugMode, Level, ProxyMode, ReloadContext, Sink, WrapOptions,
};

/// A counter producer: scales every tick by `factor`.
fn counter(
    ticks: &Subject<u32>,
    factor: u32,
) -> impl Fn(&(), &()) -> anyhow::Result<Sink<u32>> + Send + Sync + 'static {
    let ticks = ticks.stream();
    move |_: &(), _: &()| {
        let scaled = ticks.clone();
        Ok(Sink::Single(Stream::create(move |observer| {
            scaled.subscribe_fn(move |tick| observer.on_next(tick * factor))
        })))
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let bus = Bus::new(32).with_min_level(Level::Info);
    let mut reloads = bus.subscribe();

    let ctx = ReloadContext::builder(Config {
        proxy: ProxyMode::Passthrough,
        debug: DebugMode::On,
    })
    .with_diagnostics(Arc::new(BusForwarder::new(bus)))
    .build();

    let ticks = Subject::new();
    let app = ctx.wrap(counter(&ticks, 1), "counter", WrapOptions::inherit())?;
    let out = app
        .call((), ())?
        .into_single()
        .ok_or_else(|| anyhow!("counter should return a single stream"))?;

    let (_sub, mut rx) = out.into_async();
    let consumer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Some(v) = rx.next().await {
            println!("[consumer] got {v}");
            seen.push(v);
            if seen.len() == 4 {
                break;
            }
        }
        seen
    });

    ticks.next(1);
    ticks.next(2);

    // New code for the same slot: the consumer above is not touched.
    ctx.wrap(counter(&ticks, 100), "counter", WrapOptions::inherit())?;
    ticks.next(3);
    ticks.next(4);

    let seen = consumer.await?;
    println!("[main] consumer saw {seen:?} across the reload");

    loop {
        match reloads.try_recv() {
            Ok(ev) => println!("[bus] {}", ev.render()),
            Err(TryRecvError::Lagged(n)) => println!("[bus] skipped {n} events"),
            Err(_) => break,
        }
    }
    Ok(())
}
