//! # Reload configuration.
//!
//! Provides [`Config`] (context-wide defaults) and [`WrapOptions`] (per-wrap
//! overrides), plus the two knobs they carry:
//!
//! - [`ProxyMode`] which proxy variant to build for stream channels;
//! - [`DebugMode`] whether, and from which level, the slot reports diagnostics.
//!
//! Config is used in two ways:
//! 1. **Context creation**: `ReloadContext::builder(cfg)`
//! 2. **Wrap defaults**: `WrapOptions::inherit()` resolves against the context's config
//!
//! ## String forms
//! Both knobs parse from the loose strings a host's own configuration tends to carry:
//! ```rust
//! use flowswap::{DebugMode, Level, ProxyMode};
//!
//! assert_eq!("".parse::<ProxyMode>().unwrap(), ProxyMode::Passthrough);
//! assert_eq!("false".parse::<ProxyMode>().unwrap(), ProxyMode::Passthrough);
//! assert_eq!("3".parse::<ProxyMode>().unwrap(), ProxyMode::Buffered { replay: 3 });
//!
//! assert_eq!("true".parse::<DebugMode>().unwrap(), DebugMode::On);
//! assert_eq!("warn".parse::<DebugMode>().unwrap(), DebugMode::Level(Level::Warn));
//! ```

use std::convert::Infallible;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::events::Level;

/// Proxy variant built for each stream channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProxyMode {
    /// Cold outward stream; the upstream is connected while someone listens.
    /// No buffering.
    #[default]
    Passthrough,

    /// Replay multicast; the upstream is connected immediately and the last
    /// `replay` values are replayed to late subscribers (`0` = no replay).
    Buffered {
        /// Replay capacity.
        replay: usize,
    },
}

impl ProxyMode {
    /// Buffered mode with the given replay capacity.
    pub fn buffered(replay: usize) -> Self {
        ProxyMode::Buffered { replay }
    }

    /// True for [`ProxyMode::Buffered`].
    pub fn is_buffered(&self) -> bool {
        matches!(self, ProxyMode::Buffered { .. })
    }
}

impl From<Option<usize>> for ProxyMode {
    /// `None` → passthrough, `Some(n)` → buffered with replay `n`.
    fn from(replay: Option<usize>) -> Self {
        match replay {
            Some(replay) => ProxyMode::Buffered { replay },
            None => ProxyMode::Passthrough,
        }
    }
}

impl FromStr for ProxyMode {
    type Err = ConfigError;

    /// Falsy strings (`""`, `"false"`, `"off"`, `"no"`, `"none"`) select passthrough;
    /// `"true"` selects buffered without replay; a non-negative integer selects
    /// buffered with that replay capacity.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_ascii_lowercase();
        match v.as_str() {
            "" | "false" | "off" | "no" | "none" => Ok(ProxyMode::Passthrough),
            "true" | "on" | "yes" => Ok(ProxyMode::Buffered { replay: 0 }),
            _ => v
                .parse::<usize>()
                .map(|replay| ProxyMode::Buffered { replay })
                .map_err(|_| ConfigError::InvalidProxyMode { got: s.to_string() }),
        }
    }
}

/// Whether a slot reports diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugMode {
    /// Report nothing.
    #[default]
    Off,
    /// Report every event at its own level.
    On,
    /// Report events at or above this level.
    Level(Level),
}

impl DebugMode {
    /// Lowest level this mode lets through, or `None` when disabled.
    pub fn threshold(&self) -> Option<Level> {
        match self {
            DebugMode::Off => None,
            DebugMode::On => Some(Level::Trace),
            DebugMode::Level(l) => Some(*l),
        }
    }

    /// True if an event at `level` should be reported.
    pub fn allows(&self, level: Level) -> bool {
        self.threshold().is_some_and(|t| level >= t)
    }
}

impl From<bool> for DebugMode {
    fn from(on: bool) -> Self {
        if on { DebugMode::On } else { DebugMode::Off }
    }
}

impl FromStr for DebugMode {
    type Err = Infallible;

    /// `""`/`"false"`/`"off"` disable; `"true"`/`"on"` enable everything; a
    /// level name enables from that level. Unknown names fall back to
    /// `Level::Debug` rather than failing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s.trim().to_ascii_lowercase();
        Ok(match v.as_str() {
            "" | "false" | "off" | "no" | "0" => DebugMode::Off,
            "true" | "on" | "yes" | "1" => DebugMode::On,
            other => DebugMode::Level(other.parse::<Level>().unwrap_or(Level::Debug)),
        })
    }
}

/// Context-wide defaults.
///
/// ## Field semantics
/// - `proxy`: proxy variant for wraps that do not choose one
/// - `debug`: diagnostics mode for wraps that do not choose one
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    /// Default proxy variant.
    pub proxy: ProxyMode,
    /// Default diagnostics mode.
    pub debug: DebugMode,
}

/// Per-wrap options. `None` fields inherit from the context's [`Config`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WrapOptions {
    /// Proxy variant override.
    pub proxy: Option<ProxyMode>,
    /// Diagnostics override.
    pub debug: Option<DebugMode>,
}

impl WrapOptions {
    /// Options that take everything from the context.
    pub fn inherit() -> Self {
        Self::default()
    }

    /// Sets the proxy variant.
    pub fn with_proxy(mut self, proxy: ProxyMode) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets buffered proxies with `replay` capacity.
    pub fn buffered(self, replay: usize) -> Self {
        self.with_proxy(ProxyMode::Buffered { replay })
    }

    /// Sets the diagnostics mode.
    pub fn with_debug(mut self, debug: impl Into<DebugMode>) -> Self {
        self.debug = Some(debug.into());
        self
    }

    /// Resolves against `cfg`.
    pub(crate) fn resolve(&self, cfg: &Config) -> (ProxyMode, DebugMode) {
        (
            self.proxy.unwrap_or(cfg.proxy),
            self.debug.unwrap_or(cfg.debug),
        )
    }
}

impl From<Level> for DebugMode {
    fn from(level: Level) -> Self {
        DebugMode::Level(level)
    }
}
