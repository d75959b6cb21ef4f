//! Reload core: proxies, slot registry and the wrap/reload pass.
//!
//! The public surface of this module is [`ReloadContext`] (with its builder),
//! the [`Dataflow`] handle it returns, the producer result shapes and the
//! proxy introspection types.
//!
//! Internal modules:
//! - [`proxy`]: stable outward stream + inward feed per channel, two variants;
//! - [`subscriptions`]: connect/disconnect of proxy upstreams;
//! - [`registry`]: slot → instances map and the proxy arena;
//! - [`dataflow`]: first run and reload pass;
//! - [`report`]: per-slot gated reporting into the diagnostics sink.

mod builder;
mod config;
mod context;
mod dataflow;
mod proxy;
mod registry;
mod report;
mod sink;
mod slot;
mod subscriptions;

pub use builder::ReloadContextBuilder;
pub use config::{Config, DebugMode, ProxyMode, WrapOptions};
pub use context::ReloadContext;
pub use dataflow::{Dataflow, Producer};
pub use proxy::{Proxy, ProxyKey, ProxyRecord};
pub use sink::{Channel, Definition, Sink, SINGLE_CHANNEL};
pub use slot::{SlotId, SlotStatus};
