//! # Producer result shapes.
//!
//! A dataflow producer returns a [`Sink`]: exactly one of
//! - [`Sink::Single`] one stream (treated as the channel [`SINGLE_CHANNEL`]),
//! - [`Sink::Named`] named channels, each a stream or a plain value,
//! - [`Sink::Opaque`] a value that is not stream-shaped at all.
//!
//! The shape is chosen by the producer, once, instead of being detected at run time.
//!
//! ## Example
//! ```rust
//! use flowswap::{Channel, Sink};
//! use flowswap::stream::Subject;
//!
//! let clicks = Subject::<u32>::new();
//! let sink: Sink<u32, &str> = Sink::named([
//!     ("clicks", Channel::Stream(clicks.stream())),
//!     ("title", Channel::Value("counter")),
//! ]);
//!
//! assert!(sink.is_stream_shaped());
//! assert_eq!(sink.value("title"), Some(&"counter"));
//! ```

use std::collections::BTreeMap;

use crate::stream::Stream;

/// Channel key under which a [`Sink::Single`] stream is proxied.
pub const SINGLE_CHANNEL: &str = "sinks";

/// One named output of a producer.
#[derive(Debug)]
pub enum Channel<T, V> {
    /// A stream; gets a proxy.
    Stream(Stream<T>),
    /// A plain value; passed through unmodified.
    Value(V),
}

impl<T, V> Channel<T, V> {
    /// The stream, if this channel carries one.
    pub fn as_stream(&self) -> Option<&Stream<T>> {
        match self {
            Channel::Stream(s) => Some(s),
            Channel::Value(_) => None,
        }
    }

    /// The value, if this channel carries one.
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Channel::Stream(_) => None,
            Channel::Value(v) => Some(v),
        }
    }
}

/// A producer's return value.
#[derive(Debug)]
pub enum Sink<T, V = ()> {
    /// A single stream.
    Single(Stream<T>),
    /// Named channels.
    Named(BTreeMap<String, Channel<T, V>>),
    /// Anything else; returned to the caller unmodified and never registered.
    Opaque(V),
}

impl<T, V> Sink<T, V> {
    /// Builds a [`Sink::Named`] from `(name, channel)` pairs.
    pub fn named<K, It>(channels: It) -> Self
    where
        K: Into<String>,
        It: IntoIterator<Item = (K, Channel<T, V>)>,
    {
        Sink::Named(channels.into_iter().map(|(k, c)| (k.into(), c)).collect())
    }

    /// True if at least one channel is a stream.
    pub fn is_stream_shaped(&self) -> bool {
        match self {
            Sink::Single(_) => true,
            Sink::Named(map) => map.values().any(|c| c.as_stream().is_some()),
            Sink::Opaque(_) => false,
        }
    }

    /// Stream under `key`. A single stream answers to [`SINGLE_CHANNEL`].
    pub fn stream(&self, key: &str) -> Option<&Stream<T>> {
        match self {
            Sink::Single(s) if key == SINGLE_CHANNEL => Some(s),
            Sink::Named(map) => map.get(key).and_then(Channel::as_stream),
            _ => None,
        }
    }

    /// Plain value under `key`.
    pub fn value(&self, key: &str) -> Option<&V> {
        match self {
            Sink::Named(map) => map.get(key).and_then(Channel::as_value),
            _ => None,
        }
    }

    /// The stream of a [`Sink::Single`].
    pub fn into_single(self) -> Option<Stream<T>> {
        match self {
            Sink::Single(s) => Some(s),
            _ => None,
        }
    }

    /// The value of a [`Sink::Opaque`].
    pub fn into_opaque(self) -> Option<V> {
        match self {
            Sink::Opaque(v) => Some(v),
            _ => None,
        }
    }

    /// Every stream channel as `(key, stream)`, in key order.
    pub(crate) fn stream_channels(&self) -> Vec<(&str, &Stream<T>)> {
        match self {
            Sink::Single(s) => vec![(SINGLE_CHANNEL, s)],
            Sink::Named(map) => map
                .iter()
                .filter_map(|(k, c)| c.as_stream().map(|s| (k.as_str(), s)))
                .collect(),
            Sink::Opaque(_) => Vec::new(),
        }
    }
}

/// What gets wrapped: a dataflow function, or a static value that is
/// returned as is.
#[derive(Debug)]
pub enum Definition<F, S> {
    /// A producer function; wrapped with reload semantics.
    Dataflow(F),
    /// Not a function; wrapping is the identity.
    Static(S),
}

impl<F, S> Definition<F, S> {
    /// The wrapped dataflow, if any.
    pub fn into_dataflow(self) -> Option<F> {
        match self {
            Definition::Dataflow(f) => Some(f),
            Definition::Static(_) => None,
        }
    }

    /// The static value, if any.
    pub fn into_static(self) -> Option<S> {
        match self {
            Definition::Dataflow(_) => None,
            Definition::Static(s) => Some(s),
        }
    }
}
