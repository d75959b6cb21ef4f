//! # Diagnostic events emitted by the reload core.
//!
//! The [`EventKind`] enum classifies events across two categories:
//! - **Lifecycle events**: slot and instance flow (created, executed, reloaded)
//! - **Anomalies**: conditions that are reported but never raised as errors
//!   (missing subscription, retired channel, non-stream result, ...)
//!
//! The [`Event`] struct carries the metadata: slot id, instance index, channel
//! key, a human-readable reason, and a leveled severity via [`Event::level`].
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use flowswap::{Event, EventKind, Level};
//!
//! let ev = Event::new(EventKind::NoSubscription)
//!     .with_slot("counter")
//!     .with_instance(0)
//!     .with_channel("dom");
//!
//! assert_eq!(ev.level(), Level::Debug);
//! assert_eq!(ev.message(), "no subscription for sink `dom`");
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use thiserror::Error;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Severity of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Finest detail; nothing in the crate emits at this level yet.
    Trace,
    /// Lifecycle steps and benign anomalies.
    Debug,
    /// Completed reloads.
    Info,
    /// Shape drift between producer versions and misbehaving sinks.
    Warn,
    /// Failed reloads.
    Error,
}

impl Level {
    /// Lowercase name, as accepted by [`Level::from_str`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown level `{0}`")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    /// Accepts `trace`, `debug`, `info`, `warn`, `error` (any case).
    /// `log` and `warning` are accepted as aliases for `info` and `warn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" | "log" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(UnknownLevel(s.to_string())),
        }
    }
}

/// Classification of diagnostic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Lifecycle events ===
    /// A wrapper was constructed for a slot.
    ///
    /// Sets:
    /// - `slot`: slot id
    Created,

    /// A wrapped dataflow was invoked (first run of a new instance).
    ///
    /// Sets:
    /// - `slot`: slot id
    Executed,

    /// An instance was registered under its slot.
    ///
    /// Sets:
    /// - `slot`: slot id
    /// - `instance`: index of the new instance
    InstanceRegistered,

    /// One instance is being re-invoked with the new producer.
    ///
    /// Sets:
    /// - `slot`: slot id
    /// - `instance`: instance index
    Reloading,

    /// All instances of a slot were reloaded.
    ///
    /// Sets:
    /// - `slot`: slot id
    /// - `reason`: number of instances reloaded
    Reloaded,

    /// Re-invoking the producer failed; the reload pass stopped.
    ///
    /// Sets:
    /// - `slot`, `instance`
    /// - `reason`: producer error message
    ReloadFailed,

    // === Anomalies (reported, never raised) ===
    /// Disconnect found a proxy holding no upstream handle.
    ///
    /// Sets:
    /// - `slot`, `instance`, `channel`
    NoSubscription,

    /// A channel carried no stream when assembling the returned shape;
    /// its value was passed through.
    ///
    /// Sets:
    /// - `slot`, `channel`
    NoProxyStream,

    /// The producer's result needed no proxying and was returned as is.
    ///
    /// Sets:
    /// - `slot`
    NotStreamResult,

    /// A reloaded result lacks a channel the instance had; its proxy stays quiescent.
    ///
    /// Sets:
    /// - `slot`, `instance`, `channel`
    ChannelRetired,

    /// A reloaded result has a stream channel no proxy exists for; it is ignored.
    ///
    /// Sets:
    /// - `slot`, `instance`, `channel`
    UnknownChannel,

    /// A diagnostics sink panicked while handling an event.
    ///
    /// Sets:
    /// - `reason`: sink name and panic payload
    SinkPanicked,
}

impl EventKind {
    /// Default severity of this kind.
    pub fn level(&self) -> Level {
        match self {
            EventKind::Created
            | EventKind::Executed
            | EventKind::InstanceRegistered
            | EventKind::Reloading
            | EventKind::NoSubscription
            | EventKind::NoProxyStream
            | EventKind::NotStreamResult => Level::Debug,
            EventKind::Reloaded => Level::Info,
            EventKind::ChannelRetired | EventKind::UnknownChannel | EventKind::SinkPanicked => {
                Level::Warn
            }
            EventKind::ReloadFailed => Level::Error,
        }
    }

    /// Short stable label (snake_case) for logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::Created => "created",
            EventKind::Executed => "executed",
            EventKind::InstanceRegistered => "instance_registered",
            EventKind::Reloading => "reloading",
            EventKind::Reloaded => "reloaded",
            EventKind::ReloadFailed => "reload_failed",
            EventKind::NoSubscription => "no_subscription",
            EventKind::NoProxyStream => "no_proxy_stream",
            EventKind::NotStreamResult => "not_stream_result",
            EventKind::ChannelRetired => "channel_retired",
            EventKind::UnknownChannel => "unknown_channel",
            EventKind::SinkPanicked => "sink_panicked",
        }
    }
}

/// Diagnostic event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Slot id, if applicable.
    pub slot: Option<Arc<str>>,
    /// Instance index within the slot.
    pub instance: Option<usize>,
    /// Channel key within the instance.
    pub channel: Option<Arc<str>>,
    /// Human-readable reason (errors, counts, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            slot: None,
            instance: None,
            channel: None,
            reason: None,
        }
    }

    /// Attaches a slot id.
    #[inline]
    pub fn with_slot(mut self, slot: impl Into<Arc<str>>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Attaches an instance index.
    #[inline]
    pub fn with_instance(mut self, index: usize) -> Self {
        self.instance = Some(index);
        self
    }

    /// Attaches a channel key.
    #[inline]
    pub fn with_channel(mut self, channel: impl Into<Arc<str>>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Severity of this event.
    #[inline]
    pub fn level(&self) -> Level {
        self.kind.level()
    }

    /// Message body without the slot prefix.
    pub fn message(&self) -> String {
        let channel = self.channel.as_deref().unwrap_or("?");
        let reason = self.reason.as_deref().unwrap_or("");
        match self.kind {
            EventKind::Created => "created".to_string(),
            EventKind::Executed => "execute".to_string(),
            EventKind::InstanceRegistered => match self.instance {
                Some(i) => format!("registered instance #{i}"),
                None => "registered instance".to_string(),
            },
            EventKind::Reloading => match self.instance {
                Some(i) => format!("reload instance #{i}"),
                None => "reload".to_string(),
            },
            EventKind::Reloaded => format!("reloaded {reason} instance(s)"),
            EventKind::ReloadFailed => format!("reload failed: {reason}"),
            EventKind::NoSubscription => format!("no subscription for sink `{channel}`"),
            EventKind::NoProxyStream => format!("no proxy stream for sink `{channel}`"),
            EventKind::NotStreamResult => "sink not a stream result".to_string(),
            EventKind::ChannelRetired => format!("sink `{channel}` missing after reload; proxy left quiescent"),
            EventKind::UnknownChannel => format!("sink `{channel}` has no proxy; ignored"),
            EventKind::SinkPanicked => format!("diagnostics sink panicked: {reason}"),
        }
    }

    /// Full message in the `[hmr] proxy <slot>: <message>` format.
    pub fn render(&self) -> String {
        match self.slot.as_deref() {
            Some(slot) => format!("[hmr] proxy {slot}: {}", self.message()),
            None => format!("[hmr] {}", self.message()),
        }
    }

    /// Creates a sink panic event.
    #[inline]
    pub fn sink_panicked(sink: &'static str, info: String) -> Self {
        Event::new(EventKind::SinkPanicked).with_reason(format!("sink={sink} info={info}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::Created);
        let b = Event::new(EventKind::Created);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("WARN".parse::<Level>(), Ok(Level::Warn));
        assert_eq!("log".parse::<Level>(), Ok(Level::Info));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_unknown_level_is_an_error() {
        let err = "loud".parse::<Level>().unwrap_err();
        assert_eq!(err, UnknownLevel("loud".into()));
        assert_eq!(err.to_string(), "unknown level `loud`");

        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert_eq!(boxed.to_string(), "unknown level `loud`");
    }

    #[test]
    fn test_render_prefixes_slot() {
        let ev = Event::new(EventKind::NotStreamResult).with_slot("app");
        assert_eq!(ev.render(), "[hmr] proxy app: sink not a stream result");
    }

    #[test]
    fn test_levels_are_ordered() {
        assert!(Level::Trace < Level::Debug);
        assert!(Level::Warn < Level::Error);
        assert_eq!(EventKind::ReloadFailed.level(), Level::Error);
    }
}
