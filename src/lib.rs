//! # flowswap
//!
//! **flowswap** keeps the outputs of reactive dataflows alive across hot
//! reloads of the code that produces them.
//!
//! A *dataflow* is a producer function `(inputs, extra) -> sink` whose sink
//! exposes one or more streams. When the producer is wrapped under a slot id,
//! every stream it returns is replaced by a stable **proxy** stream. Wrapping a
//! new version of the producer under the same slot re-runs it for every
//! instance created so far and reconnects the existing proxies to the new
//! streams, so consumers keep the objects they subscribed to and simply start
//! seeing the new behaviour.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   wrap(producer v1, "counter")        wrap(producer v2, "counter")
//!            │                                   │
//!            ▼                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ReloadContext                                                    │
//! │  - Registry (slot → instances, proxy arena)                       │
//! │  - Diagnostics (Noop / TracingWriter / BusForwarder / ...)        │
//! │  - Config (default proxy variant, debug mode)                     │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ Dataflow::call(inputs, extra)                    │ reload pass
//!        ▼                                                  ▼
//!   ┌──────────────┐   connect    ┌──────────────┐   ┌─────────────────┐
//!   │ v1 sink      │ ───────────► │  Proxy       │ ◄─│ v2 sink         │
//!   │ (streams)    │  disconnect  │ feed │ stream│   │ (same channels) │
//!   └──────────────┘ ◄─ ─ ─ ─ ─ ─ └──────┴───┬───┘   └─────────────────┘
//!                                            │ stable identity
//!                                            ▼
//!                                       consumers
//! ```
//!
//! ### Reload pass
//! ```text
//! for each instance of the slot (registration order):
//!   ├─► publish Reloading
//!   ├─► disconnect every proxy (old upstreams released)
//!   ├─► sink = new_producer(&inputs, &extra)
//!   │       └─ Err ──► publish ReloadFailed, stop, WrapError::Reload
//!   └─► connect every stream channel into the same proxy
//!         ├─ channel gone ──► ChannelRetired (proxy stays quiescent)
//!         └─ channel new  ──► UnknownChannel (stream not proxied)
//! publish Reloaded
//! ```
//!
//! ## Features
//! | Area              | Description                                                    | Key types / traits                          |
//! |-------------------|----------------------------------------------------------------|---------------------------------------------|
//! | **Wrapping**      | Wrap producers under slot ids, reload by re-wrapping.          | [`ReloadContext`], [`Dataflow`]             |
//! | **Shapes**        | Single stream, named channels, or opaque results.              | [`Sink`], [`Channel`], [`Definition`]       |
//! | **Proxies**       | Passthrough or replaying proxies, introspectable by key.       | [`ProxyMode`], [`ProxyKey`], [`ProxyRecord`]|
//! | **Diagnostics**   | Leveled events into pluggable sinks.                           | [`Diagnostics`], [`Event`], [`DebugMode`]   |
//! | **Errors**        | Typed configuration and reload errors.                         | [`ConfigError`], [`WrapError`]              |
//! | **Streams**       | Minimal push streams, subjects and an async bridge.            | [`stream::Stream`], [`stream::Subject`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in `LogWriter` _(demo/reference only)_.
//!
//! ## Runnable demos
//! The `demos/` directory holds walk-throughs registered as cargo examples:
//! - `hot_reload`: wrap, call, consume asynchronously, re-wrap (`cargo run --example hot_reload`).
//! - `diagnostics`: sinks and per-slot debug levels (`cargo run --example diagnostics --features logging`).
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use flowswap::{ReloadContext, Sink, WrapOptions};
//! use flowswap::stream::Subject;
//!
//! let ctx = ReloadContext::new();
//! let v1 = Subject::<&'static str>::new();
//! let v2 = Subject::<&'static str>::new();
//!
//! let s1 = v1.stream();
//! let app = ctx
//!     .wrap(move |_: &(), _: &()| Ok(Sink::<&str>::Single(s1.clone())), "app", WrapOptions::inherit())
//!     .unwrap();
//! let out = app.call((), ()).unwrap().into_single().unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let log = seen.clone();
//! let _sub = out.subscribe_fn(move |v| log.lock().unwrap().push(v));
//! v1.next("old");
//!
//! // Hot reload: same slot, new producer.
//! let s2 = v2.stream();
//! ctx.wrap(move |_: &(), _: &()| Ok(Sink::<&str>::Single(s2.clone())), "app", WrapOptions::inherit())
//!     .unwrap();
//! v1.next("stale");
//! v2.next("new");
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["old", "new"]);
//! ```
mod core;
mod diagnostics;
mod error;
mod events;
pub mod stream;

// ---- Public re-exports ----

pub use core::{
    Channel, Config, Dataflow, DebugMode, Definition, Producer, Proxy, ProxyKey, ProxyMode,
    ProxyRecord, ReloadContext, ReloadContextBuilder, Sink, SlotId, SlotStatus, WrapOptions,
    SINGLE_CHANNEL,
};
pub use diagnostics::{BusForwarder, DiagnosticSet, Diagnostics, MessageSink, Noop, TracingWriter};
pub use error::{ConfigError, WrapError};
pub use events::{Bus, Event, EventKind, Level, UnknownLevel};

// Optional: expose a simple built-in logger sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use diagnostics::LogWriter;
