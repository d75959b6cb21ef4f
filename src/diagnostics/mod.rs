//! Diagnostics sinks for the reload core.
//!
//! This module provides the [`Diagnostics`] trait and built-in implementations
//! for handling the [`Event`](crate::Event)s the core reports.
//!
//! ## Architecture
//! ```text
//! ReloadContext ── report(Event) ──► level gate (per-slot DebugMode)
//!                                         │
//!                                         ▼
//!                                   Diagnostics::on_event(&Event)
//!                                         │
//!                       ┌─────────────┬───┴──────────┬─────────────┐
//!                       ▼             ▼              ▼             ▼
//!                 TracingWriter  BusForwarder   MessageSink    LogWriter
//!                   (tracing)     (Bus → async)  (Fn(&str))   (stdout, feature)
//! ```
//!
//! Combine several with [`DiagnosticSet`]. The default is [`Noop`].

#[cfg(feature = "logging")]
mod log;
mod set;
mod sink;
mod writers;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::DiagnosticSet;
pub use sink::{Diagnostics, MessageSink, Noop};
pub use writers::{BusForwarder, TracingWriter};
