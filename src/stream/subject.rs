//! # Hot multicast streams.
//!
//! [`Subject`] forwards each value to every observer registered at the time of
//! emission. [`ReplaySubject`] additionally keeps the last `capacity` values and
//! replays them to each new observer before live values.
//!
//! Both are [`Observer`]s as well as [`Observable`]s, so they can sit at the
//! receiving end of another stream's subscription (a *feed*).
//!
//! ## Rules
//! - Observers are called outside the internal lock (re-entrant emit/subscribe is safe).
//! - After `complete()`, new values are ignored; new observers receive the replay
//!   buffer (if any) followed by `on_complete`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use super::lock;
use super::observable::{Observable, Observer, Stream};
use super::subscription::Subscription;

struct Hub<T> {
    next_id: u64,
    observers: Vec<(u64, Arc<dyn Observer<T>>)>,
    buffer: VecDeque<T>,
    capacity: usize,
    completed: bool,
}

/// Shared core of [`Subject`] and [`ReplaySubject`].
struct Multicast<T> {
    hub: Arc<Mutex<Hub<T>>>,
}

impl<T> Clone for Multicast<T> {
    fn clone(&self) -> Self {
        Self {
            hub: Arc::clone(&self.hub),
        }
    }
}

impl<T: Clone + Send + 'static> Multicast<T> {
    fn new(capacity: usize) -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub {
                next_id: 0,
                observers: Vec::new(),
                buffer: VecDeque::with_capacity(capacity),
                capacity,
                completed: false,
            })),
        }
    }

    fn next(&self, value: T) {
        let targets = {
            let mut hub = lock(&self.hub);
            if hub.completed {
                return;
            }
            if hub.capacity > 0 {
                if hub.buffer.len() == hub.capacity {
                    hub.buffer.pop_front();
                }
                hub.buffer.push_back(value.clone());
            }
            hub.observers
                .iter()
                .map(|(_, o)| Arc::clone(o))
                .collect::<Vec<_>>()
        };

        for observer in targets {
            observer.on_next(value.clone());
        }
    }

    fn complete(&self) {
        let targets = {
            let mut hub = lock(&self.hub);
            if hub.completed {
                return;
            }
            hub.completed = true;
            std::mem::take(&mut hub.observers)
        };

        for (_, observer) in targets {
            observer.on_complete();
        }
    }

    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let (id, replay, completed) = {
            let mut hub = lock(&self.hub);
            let replay: Vec<T> = hub.buffer.iter().cloned().collect();
            if hub.completed {
                (None, replay, true)
            } else {
                let id = hub.next_id;
                hub.next_id += 1;
                hub.observers.push((id, Arc::clone(&observer)));
                (Some(id), replay, false)
            }
        };

        for v in replay {
            observer.on_next(v);
        }
        if completed {
            observer.on_complete();
        }

        match id {
            Some(id) => {
                let weak: Weak<Mutex<Hub<T>>> = Arc::downgrade(&self.hub);
                Subscription::new(move || {
                    if let Some(hub) = weak.upgrade() {
                        lock(&hub).observers.retain(|(oid, _)| *oid != id);
                    }
                })
            }
            None => Subscription::empty(),
        }
    }

    fn observer_count(&self) -> usize {
        lock(&self.hub).observers.len()
    }

    fn is_completed(&self) -> bool {
        lock(&self.hub).completed
    }
}

/// Hot multicast stream without replay.
pub struct Subject<T> {
    inner: Multicast<T>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Subject<T> {
    /// Creates an empty subject.
    pub fn new() -> Self {
        Self {
            inner: Multicast::new(0),
        }
    }

    /// Emits `value` to every current observer.
    pub fn next(&self, value: T) {
        self.inner.next(value)
    }

    /// Completes the subject and releases all observers.
    pub fn complete(&self) {
        self.inner.complete()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observer_count()
    }

    /// True after [`Subject::complete`].
    pub fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }

    /// Returns a [`Stream`] handle sharing this subject.
    pub fn stream(&self) -> Stream<T> {
        Stream::new(self.clone())
    }
}

impl<T: Clone + Send + 'static> Observable<T> for Subject<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        self.inner.subscribe(observer)
    }
}

impl<T: Clone + Send + 'static> Observer<T> for Subject<T> {
    fn on_next(&self, value: T) {
        self.next(value)
    }

    fn on_complete(&self) {
        self.complete()
    }
}

/// Hot multicast stream that replays its last `capacity` values.
///
/// `capacity = 0` behaves like [`Subject`].
pub struct ReplaySubject<T> {
    inner: Multicast<T>,
}

impl<T> Clone for ReplaySubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone + Send + 'static> ReplaySubject<T> {
    /// Creates a replay subject keeping at most `capacity` values.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Multicast::new(capacity),
        }
    }

    /// Emits `value`, buffering it for late observers.
    pub fn next(&self, value: T) {
        self.inner.next(value)
    }

    /// Completes the subject and releases all observers.
    pub fn complete(&self) {
        self.inner.complete()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observer_count()
    }

    /// Configured replay capacity.
    pub fn capacity(&self) -> usize {
        lock(&self.inner.hub).capacity
    }

    /// Returns a [`Stream`] handle sharing this subject.
    pub fn stream(&self) -> Stream<T> {
        Stream::new(self.clone())
    }
}

impl<T: Clone + Send + 'static> Observable<T> for ReplaySubject<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        self.inner.subscribe(observer)
    }
}

impl<T: Clone + Send + 'static> Observer<T> for ReplaySubject<T> {
    fn on_next(&self, value: T) {
        self.next(value)
    }

    fn on_complete(&self) {
        self.complete()
    }
}
