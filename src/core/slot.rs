use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ConfigError;

/// Validated name of one hot-reloadable producer.
///
/// Any non-blank string is accepted; surrounding whitespace is kept as given.
/// The empty string is not a valid id (see [`ConfigError::InvalidSlotId`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(Arc<str>);

impl SlotId {
    /// Validates `id`.
    pub fn new(id: impl AsRef<str>) -> Result<Self, ConfigError> {
        let id = id.as_ref();
        if id.trim().is_empty() {
            return Err(ConfigError::InvalidSlotId { got: id.to_string() });
        }
        Ok(Self(Arc::from(id)))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn as_arc(&self) -> Arc<str> {
        Arc::clone(&self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SlotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SlotId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for SlotId {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        SlotId::new(value)
    }
}

impl TryFrom<String> for SlotId {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SlotId::new(value)
    }
}

/// Lifecycle of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Slot id never wrapped in this context.
    Uninitialized,

    /// Registered; proxies of its instances are live.
    Initialized {
        /// Completed reload passes.
        reloads: u64,
    },

    /// A reload pass is re-invoking the slot's instances.
    Reloading {
        /// When the pass started.
        started_at: Instant,
        /// Completed reload passes before this one.
        reloads: u64,
    },
}

impl SlotStatus {
    /// Completed reload passes (0 for an unseen slot).
    pub fn reloads(&self) -> u64 {
        match self {
            SlotStatus::Uninitialized => 0,
            SlotStatus::Initialized { reloads } | SlotStatus::Reloading { reloads, .. } => *reloads,
        }
    }
}
