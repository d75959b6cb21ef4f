//! # Wrapped dataflow: first run vs. reload.
//!
//! [`ReloadContext::wrap`] is the entry point. It validates the slot id and
//! then, depending on whether the slot was seen before, either only returns a
//! [`Dataflow`] handle, or first re-runs every registered instance of the slot
//! with the new producer.
//!
//! ## State machine (per slot)
//! ```text
//!   Uninitialized ──wrap──► Initialized ──wrap──► Reloading ──► Initialized
//!                               ▲                                   │
//!                               └───────────────────────────────────┘
//! ```
//!
//! ## Reload pass
//! ```text
//! for instance in registry.instances_for(slot):      (registration order)
//!   ├─► disconnect(instance.proxies)                 (all old upstreams released)
//!   ├─► sink = producer(&instance.inputs, &instance.extra)
//!   │        └─ Err ──► ReloadFailed, stop, WrapError::Reload
//!   └─► connect(instance.proxies, sink)              (same proxies, new upstreams)
//! ```
//!
//! ## First run ([`Dataflow::call`])
//! ```text
//! sink = producer(&inputs, &extra)?                  (producer error returned as is)
//!   ├─ no stream channel ──► NotStreamResult, return sink unregistered
//!   └─ stream channels   ──► build proxies ─► connect ─► register ─► outward shape
//! ```

use std::fmt;
use std::sync::Arc;

use crate::core::config::{ProxyMode, WrapOptions};
use crate::core::context::ReloadContext;
use crate::core::proxy::{Proxies, ProxyFactory};
use crate::core::registry::Instance;
use crate::core::report::Reporter;
use crate::core::sink::{Channel, Definition, Sink, SINGLE_CHANNEL};
use crate::core::slot::SlotId;
use crate::core::subscriptions::{connect, disconnect};
use crate::error::WrapError;
use crate::events::{Event, EventKind};

/// Producer function type: `(inputs, extra) -> sink`.
pub type Producer<I, A, T, V> = dyn Fn(&I, &A) -> anyhow::Result<Sink<T, V>> + Send + Sync;

/// A dataflow wrapped under a slot.
///
/// Calling it runs the producer and, for stream-shaped results, returns proxy
/// streams that survive later reloads of the slot.
pub struct Dataflow<I, A, T, V> {
    ctx: Arc<ReloadContext>,
    slot: SlotId,
    producer: Arc<Producer<I, A, T, V>>,
    factory: ProxyFactory,
    report: Reporter,
}

impl<I, A, T, V> Clone for Dataflow<I, A, T, V> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            slot: self.slot.clone(),
            producer: Arc::clone(&self.producer),
            factory: self.factory,
            report: self.report.clone(),
        }
    }
}

impl<I, A, T, V> fmt::Debug for Dataflow<I, A, T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataflow")
            .field("slot", &self.slot)
            .field("proxy", &self.factory.mode())
            .finish()
    }
}

impl<I, A, T, V> Dataflow<I, A, T, V>
where
    I: Send + Sync + 'static,
    A: Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    V: 'static,
{
    /// Slot this dataflow is registered under.
    pub fn slot(&self) -> &SlotId {
        &self.slot
    }

    /// Proxy variant used for new instances.
    pub fn proxy_mode(&self) -> ProxyMode {
        self.factory.mode()
    }

    /// Runs the producer once with `inputs` and `extra`.
    ///
    /// Stream-shaped results are proxied and registered as a new instance of
    /// the slot; the returned sink carries the proxies' outward streams in
    /// place of the producer's streams and every plain value unchanged.
    /// Other results are returned as produced. Producer errors are returned
    /// unmodified.
    pub fn call(&self, inputs: I, extra: A) -> anyhow::Result<Sink<T, V>> {
        self.report.kind(EventKind::Executed);
        let sink = (self.producer)(&inputs, &extra)?;

        let Some(proxies) = self.factory.build(&sink) else {
            self.report.kind(EventKind::NotStreamResult);
            return Ok(sink);
        };

        connect(&proxies, &sink, &self.report);
        let index = self.ctx.registry().register(
            &self.slot,
            Instance {
                inputs,
                extra,
                proxies: proxies.clone(),
            },
        )?;
        self.report
            .report(Event::new(EventKind::InstanceRegistered).with_instance(index));

        Ok(self.outward(sink, &proxies))
    }

    /// Substitutes proxy streams for the producer's stream channels.
    fn outward(&self, sink: Sink<T, V>, proxies: &Proxies<T>) -> Sink<T, V> {
        match sink {
            Sink::Single(original) => match proxies.get(SINGLE_CHANNEL) {
                Some(proxy) => Sink::Single(proxy.stream().clone()),
                None => {
                    self.report.channel(EventKind::NoProxyStream, SINGLE_CHANNEL);
                    Sink::Single(original)
                }
            },
            Sink::Named(channels) => Sink::Named(
                channels
                    .into_iter()
                    .map(|(key, channel)| {
                        let channel = match channel {
                            Channel::Stream(original) => match proxies.get(&key) {
                                Some(proxy) => Channel::Stream(proxy.stream().clone()),
                                None => {
                                    self.report.channel(EventKind::NoProxyStream, &key);
                                    Channel::Stream(original)
                                }
                            },
                            Channel::Value(v) => {
                                self.report.channel(EventKind::NoProxyStream, &key);
                                Channel::Value(v)
                            }
                        };
                        (key, channel)
                    })
                    .collect(),
            ),
            Sink::Opaque(v) => Sink::Opaque(v),
        }
    }
}

impl ReloadContext {
    /// Wraps `producer` under `slot`.
    ///
    /// If `slot` already has registered instances, each of them is re-run with
    /// `producer` and its proxies are fed from the new result before this
    /// returns (see the module docs for the exact pass).
    ///
    /// # Errors
    /// - [`ConfigError::InvalidSlotId`](crate::ConfigError::InvalidSlotId) for a blank slot id;
    /// - [`ConfigError::TypeMismatch`](crate::ConfigError::TypeMismatch) if the slot was
    ///   registered with other input/extra/item types;
    /// - [`ConfigError::ReloadInProgress`](crate::ConfigError::ReloadInProgress) when
    ///   called while the same slot is reloading;
    /// - [`WrapError::Reload`] if the producer fails for a registered instance.
    pub fn wrap<I, A, T, V, F>(
        self: &Arc<Self>,
        producer: F,
        slot: &str,
        options: WrapOptions,
    ) -> Result<Dataflow<I, A, T, V>, WrapError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        V: 'static,
        F: Fn(&I, &A) -> anyhow::Result<Sink<T, V>> + Send + Sync + 'static,
    {
        let slot = SlotId::new(slot)?;
        let (mode, debug) = options.resolve(self.config());
        let report = Reporter::new(self.diagnostics(), slot.as_arc(), debug);
        report.kind(EventKind::Created);

        let producer: Arc<Producer<I, A, T, V>> = Arc::new(producer);

        if let Some(guard) = self.registry().claim::<I, A, T>(&slot)? {
            self.reload(&slot, producer.as_ref(), &report)?;
            guard.complete();
        }

        Ok(Dataflow {
            ctx: Arc::clone(self),
            slot,
            producer,
            factory: ProxyFactory::new(mode),
            report,
        })
    }

    /// Wraps a [`Definition`]: static values come back unchanged, without
    /// slot validation or registration; dataflows go through [`ReloadContext::wrap`].
    pub fn wrap_definition<I, A, T, V, F, S>(
        self: &Arc<Self>,
        definition: Definition<F, S>,
        slot: &str,
        options: WrapOptions,
    ) -> Result<Definition<Dataflow<I, A, T, V>, S>, WrapError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        V: 'static,
        F: Fn(&I, &A) -> anyhow::Result<Sink<T, V>> + Send + Sync + 'static,
    {
        match definition {
            Definition::Static(value) => Ok(Definition::Static(value)),
            Definition::Dataflow(f) => self.wrap(f, slot, options).map(Definition::Dataflow),
        }
    }

    /// Re-runs every instance of `slot` with `producer`, in registration order.
    fn reload<I, A, T, V>(
        &self,
        slot: &SlotId,
        producer: &Producer<I, A, T, V>,
        report: &Reporter,
    ) -> Result<(), WrapError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
        V: 'static,
    {
        let instances = self.registry().instances_for::<I, A, T>(slot)?;

        for (index, instance) in instances.iter().enumerate() {
            let report = report.for_instance(index);
            report.kind(EventKind::Reloading);

            disconnect(&instance.proxies, &report);
            match producer(&instance.inputs, &instance.extra) {
                Ok(sink) => connect(&instance.proxies, &sink, &report),
                Err(source) => {
                    report.report(
                        Event::new(EventKind::ReloadFailed).with_reason(format!("{source:#}")),
                    );
                    return Err(WrapError::Reload {
                        slot: slot.to_string(),
                        instance: index,
                        source,
                    });
                }
            }
        }

        report.report(Event::new(EventKind::Reloaded).with_reason(instances.len().to_string()));
        Ok(())
    }
}
