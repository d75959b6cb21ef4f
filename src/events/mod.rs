//! Diagnostic events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** async consumers
//! can use to observe what the reload core reports.
//!
//! ## Contents
//! - [`EventKind`], [`Event`], [`Level`] event classification, payload and severity
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ReloadContext`, `Dataflow`, the subscription manager.
//! - **Consumers**: whatever [`Diagnostics`](crate::Diagnostics) sink the
//!   context was built with; `BusForwarder` bridges them onto a [`Bus`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, Level, UnknownLevel};
