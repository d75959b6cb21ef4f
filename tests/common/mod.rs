#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use flowswap::stream::{Stream, Subscription};
use flowswap::{Diagnostics, Event, EventKind};

/// Collects every value a stream emits.
pub fn record<T>(stream: &Stream<T>) -> (Subscription, Arc<Mutex<Vec<T>>>)
where
    T: Send + 'static,
{
    let seen = Arc::new(Mutex::new(Vec::new()));
    let out = Arc::clone(&seen);
    let sub = stream.subscribe_fn(move |v| out.lock().unwrap().push(v));
    (sub, seen)
}

pub fn taken<T: Clone>(seen: &Arc<Mutex<Vec<T>>>) -> Vec<T> {
    seen.lock().unwrap().clone()
}

/// Diagnostics sink keeping every event it receives.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().unwrap().iter().map(|e| e.kind).collect()
    }

    pub fn of(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.events.lock().unwrap().iter().map(Event::render).collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Diagnostics for Recorder {
    fn on_event(&self, event: &Event) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}
