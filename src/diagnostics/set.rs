//! # DiagnosticSet: fan-out over multiple sinks
//!
//! [`DiagnosticSet`] delivers each [`Event`] to several sinks in registration
//! order, on the caller's context.
//!
//! ## What it guarantees
//! - Every sink sees every event, in order.
//! - A panicking sink does not stop delivery to the others; the panic is
//!   reported to the remaining sinks as `EventKind::SinkPanicked`.
//!
//! ## Diagram
//! ```text
//!    on_event(&Event)
//!        ├──► sink 1 (catch_unwind)
//!        ├──► sink 2 (catch_unwind) ── panic ──► SinkPanicked ──► sinks != 2
//!        └──► sink N (catch_unwind)
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::Event;

use super::Diagnostics;

/// Composite sink delivering to each member.
#[derive(Clone, Default)]
pub struct DiagnosticSet {
    sinks: Vec<Arc<dyn Diagnostics>>,
}

impl DiagnosticSet {
    /// Creates a set from the given sinks.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn Diagnostics>>) -> Self {
        Self { sinks }
    }

    /// Adds a sink.
    pub fn push(&mut self, sink: Arc<dyn Diagnostics>) {
        self.sinks.push(sink);
    }

    /// True if there are no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Number of sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    fn deliver(sink: &Arc<dyn Diagnostics>, event: &Event) -> Result<(), String> {
        panic::catch_unwind(AssertUnwindSafe(|| sink.on_event(event))).map_err(|payload| {
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string())
        })
    }
}

impl Diagnostics for DiagnosticSet {
    fn on_event(&self, event: &Event) {
        for (idx, sink) in self.sinks.iter().enumerate() {
            if let Err(info) = Self::deliver(sink, event) {
                let report = Event::sink_panicked(sink.name(), info);
                for (other, peer) in self.sinks.iter().enumerate() {
                    if other != idx {
                        let _ = Self::deliver(peer, &report);
                    }
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "set"
    }
}
