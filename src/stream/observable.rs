//! # Push-based stream capability.
//!
//! [`Observer`] receives values, [`Observable`] hands out [`Subscription`]s,
//! and [`Stream`] is the cloneable handle the rest of the crate passes around.
//!
//! ## Identity
//! Two [`Stream`] handles are the *same stream* when they share the underlying
//! observable allocation ([`Stream::ptr_eq`]). Proxy outward streams rely on
//! this: a reload must never change what a consumer's handle points at.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use flowswap::stream::Stream;
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let s = seen.clone();
//!
//! let numbers = Stream::of(vec![1, 2, 3]);
//! let _sub = numbers.subscribe_fn(move |v| s.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
//! ```

use std::fmt;
use std::sync::Arc;

use super::subscription::Subscription;

/// Receiver side of a stream.
///
/// Implementations must not block; values are delivered synchronously on the
/// emitting context.
pub trait Observer<T>: Send + Sync {
    /// Delivers one value.
    fn on_next(&self, value: T);

    /// Signals that no further values will arrive.
    fn on_complete(&self) {}
}

/// Source side of a stream.
pub trait Observable<T>: Send + Sync {
    /// Registers `observer` and returns the handle that unregisters it.
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription;
}

/// Shared handle to an [`Observable`].
///
/// Cheap to clone; clones compare equal under [`Stream::ptr_eq`].
pub struct Stream<T> {
    inner: Arc<dyn Observable<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("id", &self.id())
            .finish()
    }
}

impl<T: 'static> Stream<T> {
    /// Wraps an observable.
    pub fn new(observable: impl Observable<T> + 'static) -> Self {
        Self {
            inner: Arc::new(observable),
        }
    }

    /// Wraps an already shared observable without re-allocating.
    pub fn from_arc(inner: Arc<dyn Observable<T>>) -> Self {
        Self { inner }
    }

    /// Creates a cold stream: `on_subscribe` runs once per subscriber.
    pub fn create<F>(on_subscribe: F) -> Self
    where
        F: Fn(Arc<dyn Observer<T>>) -> Subscription + Send + Sync + 'static,
    {
        Self::new(Create(on_subscribe))
    }

    /// Cold stream that emits `values` to each subscriber, then completes.
    pub fn of(values: Vec<T>) -> Self
    where
        T: Clone + Send + Sync,
    {
        Self::create(move |observer| {
            for v in &values {
                observer.on_next(v.clone());
            }
            observer.on_complete();
            Subscription::empty()
        })
    }

    /// Stream that never emits and never completes.
    pub fn never() -> Self {
        Self::create(|_| Subscription::empty())
    }

    /// Registers an observer.
    pub fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        self.inner.subscribe(observer)
    }

    /// Registers a closure as observer.
    pub fn subscribe_fn<F>(&self, f: F) -> Subscription
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnObserver(f)))
    }
}

impl<T> Stream<T> {
    /// True if both handles point at the same observable.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        a.id() == b.id()
    }

    /// Address of the underlying observable, stable for the stream's lifetime.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }
}

/// Observer backed by a closure.
pub(crate) struct FnObserver<F>(pub(crate) F);

impl<T, F> Observer<T> for FnObserver<F>
where
    F: Fn(T) + Send + Sync,
{
    fn on_next(&self, value: T) {
        (self.0)(value)
    }
}

struct Create<F>(F);

impl<T, F> Observable<T> for Create<F>
where
    F: Fn(Arc<dyn Observer<T>>) -> Subscription + Send + Sync,
{
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        (self.0)(observer)
    }
}
