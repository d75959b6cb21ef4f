use std::sync::Arc;

use crate::core::config::DebugMode;
use crate::diagnostics::Diagnostics;
use crate::events::{Event, EventKind};

/// Per-slot reporting handle: stamps the slot (and instance) on events and
/// drops what the slot's [`DebugMode`] does not let through.
#[derive(Clone)]
pub(crate) struct Reporter {
    sink: Arc<dyn Diagnostics>,
    slot: Arc<str>,
    instance: Option<usize>,
    debug: DebugMode,
}

impl Reporter {
    pub(crate) fn new(sink: Arc<dyn Diagnostics>, slot: Arc<str>, debug: DebugMode) -> Self {
        Self {
            sink,
            slot,
            instance: None,
            debug,
        }
    }

    /// Same reporter, stamping `index` on every event.
    pub(crate) fn for_instance(&self, index: usize) -> Self {
        Self {
            instance: Some(index),
            ..self.clone()
        }
    }

    pub(crate) fn report(&self, ev: Event) {
        if !self.debug.allows(ev.level()) {
            return;
        }
        let mut ev = ev.with_slot(Arc::clone(&self.slot));
        if let (None, Some(i)) = (ev.instance, self.instance) {
            ev = ev.with_instance(i);
        }
        self.sink.on_event(&ev);
    }

    pub(crate) fn kind(&self, kind: EventKind) {
        self.report(Event::new(kind))
    }

    pub(crate) fn channel(&self, kind: EventKind, channel: &str) {
        self.report(Event::new(kind).with_channel(channel))
    }
}
