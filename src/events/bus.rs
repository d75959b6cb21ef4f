//! # Broadcast of diagnostic events to async consumers.
//!
//! The reload core is synchronous: it reports from inside `wrap` and `call`.
//! [`Bus`] hands those reports to tasks on a tokio runtime through
//! [`tokio::sync::broadcast`], so a UI or log shipper can follow reloads
//! without ever blocking the core.
//!
//! ```text
//! ReloadContext ──► BusForwarder ──► Bus (level gate) ──► receiver 1..N
//! ```
//!
//! ## Rules
//! - `publish` never blocks and never fails; events nobody listens to are dropped.
//! - Events below the bus's minimum [`Level`] are not broadcast.
//! - Receivers that fall more than `capacity` events behind get
//!   `RecvError::Lagged(n)` and resume from the oldest retained event.

use tokio::sync::broadcast;

use super::event::{Event, Level};

/// Broadcast channel for diagnostic events.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
    min_level: Level,
}

impl Bus {
    /// Creates a bus keeping up to `capacity` undelivered events (at least 1),
    /// broadcasting every level.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self {
            tx,
            min_level: Level::Trace,
        }
    }

    /// Only broadcast events at `level` or above.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = level;
        self
    }

    /// Lowest level this bus broadcasts.
    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Broadcasts a copy of `ev` and returns how many receivers it reached
    /// (0 when filtered out by level or when nobody is subscribed).
    pub fn publish(&self, ev: &Event) -> usize {
        if ev.level() < self.min_level {
            return 0;
        }
        self.tx.send(ev.clone()).unwrap_or(0)
    }

    /// A receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
