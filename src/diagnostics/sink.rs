//! # Diagnostics sink trait.
//!
//! Provides [`Diagnostics`], the extension point the reload core reports
//! through. The core is synchronous, so sinks are called inline on the
//! reporting context; they must be quick and must not block.
//!
//! ## Rules
//! - Sinks never influence control flow: nothing they do can fail a wrap or a reload.
//! - Panics are isolated when sinks are combined in a [`DiagnosticSet`](super::DiagnosticSet).
//! - Events arrive in `seq` order per reporting context.
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use flowswap::{Diagnostics, Event, EventKind};
//!
//! #[derive(Default)]
//! struct Retired(AtomicUsize);
//!
//! impl Diagnostics for Retired {
//!     fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::ChannelRetired) {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "retired" }
//! }
//! ```

use crate::events::Event;

/// Receiver of diagnostic events.
pub trait Diagnostics: Send + Sync + 'static {
    /// Handles a single event.
    fn on_event(&self, event: &Event);

    /// Returns the sink name used in panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Sink that drops everything. The default for a new context.
#[derive(Clone, Copy, Debug, Default)]
pub struct Noop;

impl Diagnostics for Noop {
    fn on_event(&self, _event: &Event) {}

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Adapts a plain message callback into a sink.
///
/// Each event is rendered as `[hmr] proxy <slot>: <message>` before being passed on.
pub struct MessageSink<F> {
    f: F,
}

impl<F> MessageSink<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Diagnostics for MessageSink<F>
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn on_event(&self, event: &Event) {
        (self.f)(&event.render())
    }

    fn name(&self) -> &'static str {
        "message"
    }
}
