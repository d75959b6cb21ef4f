//! Minimal push-based stream capability consumed by the reload core.
//!
//! The core never implements stream operators; it only needs to subscribe,
//! dispose, multicast and replay. This module provides exactly that.
//!
//! ## Contents
//! - [`Observer`], [`Observable`], [`Stream`] receiver/source traits and the shared handle
//! - [`Subscription`] disposable registration (released at most once)
//! - [`Subject`], [`ReplaySubject`] hot multicast, optionally with replay
//! - [`Stream::into_async`] bridge into `futures::Stream`

mod bridge;
mod observable;
mod subject;
mod subscription;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use observable::{Observable, Observer, Stream};
pub use subject::{ReplaySubject, Subject};
pub use subscription::Subscription;

/// Locks `m`, recovering the guard if a previous holder panicked.
///
/// All state behind these mutexes stays consistent between statements, so a
/// poisoned lock carries no torn data.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
