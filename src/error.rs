//! Error types used by the reload core.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`]: misuse detected synchronously when wrapping a dataflow.
//! - [`WrapError`]: everything a wrap call can return, including a producer
//!   failure while re-invoking registered instances.
//!
//! Producer failures on a plain [`Dataflow::call`](crate::Dataflow::call) are
//! *not* wrapped: the producer's `anyhow::Error` reaches the caller unmodified.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

/// # Configuration errors.
///
/// Fatal, raised at construction, never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Slot id was empty or whitespace only.
    ///
    /// Even `""` is rejected: a blank id would silently merge every unnamed
    /// dataflow into one slot, so that reloading one would re-run all of them.
    #[error("you should provide a non-empty string value of proxy id (got {got:?})")]
    InvalidSlotId {
        /// The rejected value.
        got: String,
    },

    /// A proxy mode string was neither falsy nor a non-negative integer.
    #[error("invalid proxy mode {got:?}: expected a falsy value or a non-negative replay count")]
    InvalidProxyMode {
        /// The rejected value.
        got: String,
    },

    /// A slot was reused with a producer of different input/output types.
    #[error("slot `{slot}` was registered with different dataflow types")]
    TypeMismatch {
        /// The slot id.
        slot: String,
    },

    /// A reload of this slot is already running (re-entrant or concurrent wrap).
    #[error("slot `{slot}` is already reloading")]
    ReloadInProgress {
        /// The slot id.
        slot: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use flowswap::ConfigError;
    ///
    /// let err = ConfigError::InvalidSlotId { got: String::new() };
    /// assert_eq!(err.as_label(), "config_invalid_slot_id");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidSlotId { .. } => "config_invalid_slot_id",
            ConfigError::InvalidProxyMode { .. } => "config_invalid_proxy_mode",
            ConfigError::TypeMismatch { .. } => "config_type_mismatch",
            ConfigError::ReloadInProgress { .. } => "config_reload_in_progress",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::InvalidSlotId { got } => format!("invalid slot id: {got:?}"),
            ConfigError::InvalidProxyMode { got } => format!("invalid proxy mode: {got:?}"),
            ConfigError::TypeMismatch { slot } => format!("type mismatch in slot={slot}"),
            ConfigError::ReloadInProgress { slot } => format!("reload in progress in slot={slot}"),
        }
    }
}

/// # Errors returned by [`ReloadContext::wrap`](crate::ReloadContext::wrap).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WrapError {
    /// The wrap call itself was misconfigured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Re-invoking the new producer for a registered instance failed.
    ///
    /// The reload pass stopped at `instance`: its proxies are disconnected,
    /// later instances keep their previous connections.
    #[error("reload of slot `{slot}` failed at instance {instance}: {source}")]
    Reload {
        /// The slot id.
        slot: String,
        /// Index of the instance whose producer failed.
        instance: usize,
        /// The producer's own error, unmodified.
        #[source]
        source: anyhow::Error,
    },
}

impl WrapError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WrapError::Config(e) => e.as_label(),
            WrapError::Reload { .. } => "wrap_reload_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WrapError::Config(e) => e.as_message(),
            WrapError::Reload { slot, instance, source } => {
                format!("reload failed: slot={slot} instance={instance} error={source}")
            }
        }
    }

    /// The configuration error, if this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            WrapError::Config(e) => Some(e),
            WrapError::Reload { .. } => None,
        }
    }

    /// Takes the producer's error out of a reload failure.
    pub fn into_producer_error(self) -> Option<anyhow::Error> {
        match self {
            WrapError::Reload { source, .. } => Some(source),
            WrapError::Config(_) => None,
        }
    }
}
