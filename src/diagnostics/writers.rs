//! # Built-in sinks backed by `tracing` and the event [`Bus`].
//!
//! - [`TracingWriter`] turns each event into a `tracing` event at the event's level,
//!   with `slot`, `instance`, `channel` and `kind` as structured fields.
//! - [`BusForwarder`] republishes events on a [`Bus`] for async consumers.

use crate::events::{Bus, Event, Level};

use super::Diagnostics;

/// Emits events through the `tracing` facade (target `flowswap`).
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingWriter;

impl Diagnostics for TracingWriter {
    fn on_event(&self, ev: &Event) {
        let slot = ev.slot.as_deref().unwrap_or("");
        let channel = ev.channel.as_deref().unwrap_or("");
        let instance = ev.instance.map(|i| i as i64).unwrap_or(-1);
        let kind = ev.kind.as_label();
        let message = ev.message();

        match ev.level() {
            Level::Trace => {
                tracing::trace!(target: "flowswap", seq = ev.seq, slot, instance, channel, kind, "{message}")
            }
            Level::Debug => {
                tracing::debug!(target: "flowswap", seq = ev.seq, slot, instance, channel, kind, "{message}")
            }
            Level::Info => {
                tracing::info!(target: "flowswap", seq = ev.seq, slot, instance, channel, kind, "{message}")
            }
            Level::Warn => {
                tracing::warn!(target: "flowswap", seq = ev.seq, slot, instance, channel, kind, "{message}")
            }
            Level::Error => {
                tracing::error!(target: "flowswap", seq = ev.seq, slot, instance, channel, kind, "{message}")
            }
        }
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}

/// Republishes events on a [`Bus`], subject to the bus's minimum level.
#[derive(Clone, Debug)]
pub struct BusForwarder {
    bus: Bus,
}

impl BusForwarder {
    /// Forwards into `bus`.
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// The bus events are forwarded to.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }
}

impl Diagnostics for BusForwarder {
    fn on_event(&self, ev: &Event) {
        self.bus.publish(ev);
    }

    fn name(&self) -> &'static str {
        "bus"
    }
}
