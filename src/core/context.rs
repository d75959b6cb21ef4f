//! # ReloadContext: owns the slot registry and the diagnostics sink.
//!
//! One context is one hot-reload "session". Every [`Dataflow`](crate::Dataflow)
//! wrapped through it shares its registry, so a later
//! [`wrap`](ReloadContext::wrap) under the same slot id reloads every instance
//! created by earlier wraps.
//!
//! ## High-level architecture
//! ```text
//! ReloadContextBuilder ──► ReloadContext { cfg, diagnostics, registry }
//!                                 │
//!      wrap(producer, slot, opts) ┤
//!                                 ├─► Dataflow::call(inputs, extra) ──► registry.register(...)
//!                                 └─► (slot known) reload pass over registry.instances_for(slot)
//!
//! Introspection:
//!   slots() / status(slot) / instance_count(slot) / proxy(key) / proxy_stream::<T>(key)
//! ```
//!
//! Contexts are independent: nothing is shared between two contexts, so tests
//! (and embedders running several sessions) never observe each other's slots.
//!
//! ## Example
//! ```rust
//! use flowswap::{ReloadContext, Sink, WrapOptions};
//! use flowswap::stream::Subject;
//!
//! let ctx = ReloadContext::new();
//! let ticks = Subject::<u32>::new();
//!
//! let stream = ticks.stream();
//! let counter = ctx
//!     .wrap(move |_: &(), _: &()| Ok(Sink::<u32>::Single(stream.clone())), "counter", WrapOptions::inherit())
//!     .unwrap();
//!
//! let out = counter.call((), ()).unwrap().into_single().unwrap();
//! let _sub = out.subscribe_fn(|v| println!("tick {v}"));
//! ticks.next(1);
//! assert_eq!(ctx.instance_count("counter"), 1);
//! ```

use std::sync::Arc;

use super::builder::ReloadContextBuilder;
use super::config::Config;
use super::proxy::{Proxy, ProxyKey, ProxyRecord};
use super::registry::Registry;
use super::slot::SlotStatus;
use crate::diagnostics::{Diagnostics, Noop};
use crate::stream::Stream;

/// Hot-reload session: slot registry plus diagnostics.
pub struct ReloadContext {
    cfg: Config,
    diagnostics: Arc<dyn Diagnostics>,
    registry: Registry,
}

impl ReloadContext {
    /// Context with default [`Config`] and no diagnostics.
    pub fn new() -> Arc<Self> {
        Self::builder(Config::default()).build()
    }

    /// Returns a builder for a context with `cfg`.
    pub fn builder(cfg: Config) -> ReloadContextBuilder {
        ReloadContextBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            cfg,
            diagnostics,
            registry: Registry::new(),
        }
    }

    /// Context-wide defaults.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub(crate) fn diagnostics(&self) -> Arc<dyn Diagnostics> {
        Arc::clone(&self.diagnostics)
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Known slot ids, sorted.
    pub fn slots(&self) -> Vec<String> {
        self.registry.slots()
    }

    /// Lifecycle state of `slot` (`Uninitialized` if never wrapped).
    pub fn status(&self, slot: &str) -> SlotStatus {
        self.registry.status(slot)
    }

    /// Number of registered instances of `slot`.
    pub fn instance_count(&self, slot: &str) -> usize {
        self.registry.instance_count(slot)
    }

    /// Untyped view of the proxy at `key`.
    pub fn proxy(&self, key: &ProxyKey) -> Option<Arc<dyn ProxyRecord>> {
        self.registry.proxy(key)
    }

    /// Keys of every proxy created under `slot`, ordered by instance then channel.
    pub fn proxy_keys(&self, slot: &str) -> Vec<ProxyKey> {
        self.registry.proxy_keys(slot)
    }

    /// Outward stream of the proxy at `key`, if it carries items of type `T`.
    pub fn proxy_stream<T>(&self, key: &ProxyKey) -> Option<Stream<T>>
    where
        T: Clone + Send + 'static,
    {
        let record = self.registry.proxy(key)?;
        record
            .as_any()
            .downcast_ref::<Proxy<T>>()
            .map(|p| p.stream().clone())
    }
}

impl Default for ReloadContext {
    fn default() -> Self {
        Self::new_internal(Config::default(), Arc::new(Noop))
    }
}

impl std::fmt::Debug for ReloadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadContext")
            .field("cfg", &self.cfg)
            .field("diagnostics", &self.diagnostics.name())
            .field("slots", &self.registry.slots())
            .finish()
    }
}
