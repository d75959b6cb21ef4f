//! # Per-channel proxies.
//!
//! A [`Proxy`] stands between one producer channel (the *upstream*) and every
//! consumer of that channel. Consumers hold the proxy's outward [`Stream`],
//! which never changes; reloads only swap what feeds it.
//!
//! ```text
//!  producer v1 ──╮ (upstream handles, released on reload)
//!                ├──► bridge(s) ──► outward stream ──► consumers (never re-subscribe)
//!  producer v2 ──╯ (upstream handles, installed after release)
//! ```
//!
//! ## Variants ([`ProxyMode`])
//! - **Passthrough**: the outward stream is cold. Each consumer subscription
//!   opens its own bridge and subscribes the current upstream into it, so a
//!   cold upstream replays for every consumer. Disposing a consumer releases
//!   only its own upstream handle. Nothing is buffered.
//! - **Buffered**: a [`ReplaySubject`] is the single bridge and the outward
//!   stream; the upstream is attached immediately and late consumers get the
//!   replay buffer.
//!
//! ## Rules
//! - At most one upstream handle is held per bridge.
//! - Upstream completion is not forwarded: a later reload may feed the same proxy again.
//! - No lock is held while subscribing upstream or delivering values.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::core::config::ProxyMode;
use crate::core::sink::Sink;
use crate::stream::{lock, Observable, Observer, ReplaySubject, Stream, Subscription};

/// Proxies of one instance, by channel key.
pub(crate) type Proxies<T> = BTreeMap<String, Arc<Proxy<T>>>;

/// Arena address of a proxy: `(slot, instance index, channel key)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyKey {
    /// Slot id.
    pub slot: Arc<str>,
    /// Instance index within the slot, in registration order.
    pub instance: usize,
    /// Channel key ([`SINGLE_CHANNEL`](crate::SINGLE_CHANNEL) for single-stream sinks).
    pub channel: Arc<str>,
}

impl ProxyKey {
    /// Creates a key.
    pub fn new(slot: impl Into<Arc<str>>, instance: usize, channel: impl Into<Arc<str>>) -> Self {
        Self {
            slot: slot.into(),
            instance,
            channel: channel.into(),
        }
    }

    /// Key of the single-stream channel of an instance.
    pub fn single(slot: impl Into<Arc<str>>, instance: usize) -> Self {
        Self::new(slot, instance, crate::core::sink::SINGLE_CHANNEL)
    }
}

impl fmt::Display for ProxyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}/{}", self.slot, self.instance, self.channel)
    }
}

/// Type-erased view of a proxy record, as stored in the context's arena.
pub trait ProxyRecord: Send + Sync {
    /// Variant this proxy was built with.
    fn mode(&self) -> ProxyMode;

    /// True while an upstream handle is held.
    fn is_connected(&self) -> bool;

    /// True while a producer channel is attached (possibly not yet subscribed,
    /// for a passthrough proxy nobody listens to).
    fn has_source(&self) -> bool;

    /// Consumers currently subscribed to a passthrough proxy (0 for buffered).
    fn watchers(&self) -> usize;

    /// Identity of the outward stream (see [`Stream::id`]).
    fn stream_id(&self) -> usize;

    /// For typed access to the outward stream.
    fn as_any(&self) -> &dyn Any;
}

struct Link<T> {
    source: Option<Stream<T>>,
    /// Observers the source is bridged into, by bridge id.
    feeds: BTreeMap<u64, Arc<dyn Observer<T>>>,
    /// Upstream handle of each connected bridge.
    upstreams: BTreeMap<u64, Subscription>,
    next_id: u64,
}

impl<T> Link<T> {
    fn new() -> Self {
        Self {
            source: None,
            feeds: BTreeMap::new(),
            upstreams: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn open(&mut self, feed: Arc<dyn Observer<T>>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.feeds.insert(id, feed);
        id
    }
}

/// Upstream-facing observer: forwards values, swallows completion.
struct Inlet<T> {
    target: Arc<dyn Observer<T>>,
}

impl<T> Observer<T> for Inlet<T> {
    fn on_next(&self, value: T) {
        self.target.on_next(value)
    }
}

/// Stable outward stream + inward bridges for one channel.
pub struct Proxy<T> {
    mode: ProxyMode,
    stream: Stream<T>,
    link: Arc<Mutex<Link<T>>>,
}

impl<T: Clone + Send + 'static> Proxy<T> {
    fn new(mode: ProxyMode) -> Self {
        let link = Arc::new(Mutex::new(Link::new()));

        match mode {
            ProxyMode::Passthrough => {
                let stream = Stream::new(Passthrough {
                    link: Arc::clone(&link),
                });
                Self { mode, stream, link }
            }
            ProxyMode::Buffered { replay } => {
                let subject = ReplaySubject::new(replay);
                lock(&link).open(Arc::new(Inlet {
                    target: Arc::new(subject.clone()),
                }));
                Self {
                    mode,
                    stream: subject.stream(),
                    link,
                }
            }
        }
    }

    /// The outward stream. Same handle for the proxy's whole life.
    pub fn stream(&self) -> &Stream<T> {
        &self.stream
    }

    /// Points the proxy at `source` and returns the previously held upstream
    /// handles as one handle, which the caller must dispose.
    ///
    /// The new source is subscribed immediately into every open bridge: the
    /// replay buffer of a buffered proxy, or each current consumer of a
    /// passthrough proxy. A passthrough proxy nobody listens to attaches it on
    /// the next consumer subscription. `None` detaches the source.
    pub fn replace_upstream(&self, source: Option<Stream<T>>) -> Option<Subscription> {
        let (previous, bridges) = {
            let mut link = lock(&self.link);
            let previous = std::mem::take(&mut link.upstreams);
            link.source = source.clone();
            let bridges: Vec<_> = match source {
                Some(_) => link
                    .feeds
                    .iter()
                    .map(|(id, feed)| (*id, Arc::clone(feed)))
                    .collect(),
                None => Vec::new(),
            };
            (previous, bridges)
        };

        if let Some(source) = source {
            for (id, feed) in bridges {
                attach(&self.link, id, &source, &feed);
            }
        }
        merge(previous)
    }

    /// Detaches the source and hands back the held upstream handles, if any.
    pub fn take_upstream(&self) -> Option<Subscription> {
        let previous = {
            let mut link = lock(&self.link);
            link.source = None;
            std::mem::take(&mut link.upstreams)
        };
        merge(previous)
    }
}

impl<T: Clone + Send + 'static> ProxyRecord for Proxy<T> {
    fn mode(&self) -> ProxyMode {
        self.mode
    }

    fn is_connected(&self) -> bool {
        !lock(&self.link).upstreams.is_empty()
    }

    fn has_source(&self) -> bool {
        lock(&self.link).source.is_some()
    }

    fn watchers(&self) -> usize {
        match self.mode {
            ProxyMode::Passthrough => lock(&self.link).feeds.len(),
            ProxyMode::Buffered { .. } => 0,
        }
    }

    fn stream_id(&self) -> usize {
        self.stream.id()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Folds upstream handles into one; `None` when nothing was held.
fn merge(handles: BTreeMap<u64, Subscription>) -> Option<Subscription> {
    let mut handles: Vec<Subscription> = handles.into_values().collect();
    match handles.len() {
        0 => None,
        1 => handles.pop(),
        _ => Some(Subscription::new(move || {
            for handle in handles {
                handle.dispose();
            }
        })),
    }
}

/// Subscribes `source` into bridge `id` and stores the handle, unless the link
/// moved on (bridge closed, handle installed or source swapped) meanwhile.
fn attach<T: 'static>(
    link: &Mutex<Link<T>>,
    id: u64,
    source: &Stream<T>,
    feed: &Arc<dyn Observer<T>>,
) {
    let handle = source.subscribe(Arc::clone(feed));
    let stale = {
        let mut link = lock(link);
        let current = link
            .source
            .as_ref()
            .is_some_and(|s| Stream::ptr_eq(s, source));
        if current && link.feeds.contains_key(&id) && !link.upstreams.contains_key(&id) {
            link.upstreams.insert(id, handle);
            None
        } else {
            Some(handle)
        }
    };
    if let Some(handle) = stale {
        handle.dispose();
    }
}

/// Cold outward stream of a passthrough proxy: every consumer gets its own
/// bridge from the current source.
struct Passthrough<T> {
    link: Arc<Mutex<Link<T>>>,
}

impl<T: Clone + Send + 'static> Observable<T> for Passthrough<T> {
    fn subscribe(&self, observer: Arc<dyn Observer<T>>) -> Subscription {
        let feed: Arc<dyn Observer<T>> = Arc::new(Inlet { target: observer });
        let (id, source) = {
            let mut link = lock(&self.link);
            let id = link.open(Arc::clone(&feed));
            (id, link.source.clone())
        };
        if let Some(source) = source {
            attach(&self.link, id, &source, &feed);
        }

        let link = Arc::clone(&self.link);
        Subscription::new(move || {
            let released = {
                let mut link = lock(&link);
                link.feeds.remove(&id);
                link.upstreams.remove(&id)
            };
            if let Some(upstream) = released {
                upstream.dispose();
            }
        })
    }
}

/// Builds proxies in the configured variant.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ProxyFactory {
    mode: ProxyMode,
}

impl ProxyFactory {
    pub(crate) fn new(mode: ProxyMode) -> Self {
        Self { mode }
    }

    pub(crate) fn mode(&self) -> ProxyMode {
        self.mode
    }

    /// One unconnected proxy.
    pub(crate) fn make<T: Clone + Send + 'static>(&self) -> Arc<Proxy<T>> {
        Arc::new(Proxy::new(self.mode))
    }

    /// A proxy per stream channel of `sink`; `None` when no channel is a
    /// stream (nothing to proxy, the sink is returned as is).
    pub(crate) fn build<T, V>(&self, sink: &Sink<T, V>) -> Option<Proxies<T>>
    where
        T: Clone + Send + 'static,
    {
        let channels = sink.stream_channels();
        if channels.is_empty() {
            return None;
        }
        Some(
            channels
                .into_iter()
                .map(|(key, _)| (key.to_string(), self.make()))
                .collect(),
        )
    }
}
