//! # Slot registry - per-context record of live producer instances.
//!
//! The registry maps each slot id to the ordered list of instances created
//! under it, and keeps an arena of every proxy addressed by
//! [`ProxyKey`] `(slot, instance, channel)`.
//!
//! ## Architecture
//! ```text
//! slots: SlotId ─► SlotRecord { status, entry: SlotEntry<I, A, T> (type-erased) }
//!                                            └─► [Instance #0, Instance #1, ...]
//!                                                  { inputs, extra, proxies }
//! arena: ProxyKey(slot, instance, channel) ─► Arc<dyn ProxyRecord>
//! ```
//!
//! ## Rules
//! - Instances are appended, never removed or replaced; reload walks them in
//!   registration order.
//! - A slot is bound to the input/extra/item types of its first wrap; reuse
//!   with other types is a [`ConfigError::TypeMismatch`].
//! - Only one reload pass per slot at a time ([`ConfigError::ReloadInProgress`]).
//! - No lock is held while callers run producers or touch streams.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::core::proxy::{Proxies, ProxyKey, ProxyRecord};
use crate::core::slot::{SlotId, SlotStatus};
use crate::error::ConfigError;
use crate::stream::lock;

/// One invocation of a wrapped dataflow, kept for re-invocation on reload.
pub(crate) struct Instance<I, A, T> {
    pub(crate) inputs: I,
    pub(crate) extra: A,
    pub(crate) proxies: Proxies<T>,
}

/// Instances of one slot, typed.
pub(crate) struct SlotEntry<I, A, T> {
    instances: Mutex<Vec<Arc<Instance<I, A, T>>>>,
}

/// Type-erased slot entry.
trait ErasedSlot: Send + Sync {
    fn instance_count(&self) -> usize;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<I, A, T> ErasedSlot for SlotEntry<I, A, T>
where
    I: Send + Sync + 'static,
    A: Send + Sync + 'static,
    T: Send + 'static,
{
    fn instance_count(&self) -> usize {
        lock(&self.instances).len()
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

struct SlotRecord {
    status: SlotStatus,
    entry: Arc<dyn ErasedSlot>,
}

/// Registry of slots, instances and proxies.
#[derive(Default)]
pub(crate) struct Registry {
    slots: Mutex<HashMap<SlotId, SlotRecord>>,
    arena: Mutex<BTreeMap<ProxyKey, Arc<dyn ProxyRecord>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Typed entry for `slot`, created on first use.
    fn entry<I, A, T>(&self, slot: &SlotId) -> Result<Arc<SlotEntry<I, A, T>>, ConfigError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let erased = {
            let mut slots = lock(&self.slots);
            let record = slots.entry(slot.clone()).or_insert_with(|| SlotRecord {
                status: SlotStatus::Initialized { reloads: 0 },
                entry: Arc::new(SlotEntry::<I, A, T> {
                    instances: Mutex::new(Vec::new()),
                }),
            });
            Arc::clone(&record.entry)
        };

        erased
            .into_any()
            .downcast::<SlotEntry<I, A, T>>()
            .map_err(|_| ConfigError::TypeMismatch {
                slot: slot.to_string(),
            })
    }

    /// Prepares `slot` for a wrap.
    ///
    /// Returns `None` for a slot seen for the first time (its entry is
    /// created), or a [`ReloadGuard`] marking the slot as reloading.
    pub(crate) fn claim<I, A, T>(&self, slot: &SlotId) -> Result<Option<ReloadGuard<'_>>, ConfigError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        let existed = lock(&self.slots).contains_key(slot);
        self.entry::<I, A, T>(slot)?;
        if !existed {
            return Ok(None);
        }

        let mut slots = lock(&self.slots);
        let Some(record) = slots.get_mut(slot) else {
            return Ok(None);
        };
        let reloads = match record.status {
            SlotStatus::Reloading { .. } => {
                return Err(ConfigError::ReloadInProgress {
                    slot: slot.to_string(),
                });
            }
            other => other.reloads(),
        };
        record.status = SlotStatus::Reloading {
            started_at: Instant::now(),
            reloads,
        };

        Ok(Some(ReloadGuard {
            registry: self,
            slot: slot.clone(),
            reloads,
            completed: false,
        }))
    }

    /// Appends `instance` to `slot` and indexes its proxies in the arena.
    ///
    /// Returns the instance index.
    pub(crate) fn register<I, A, T>(
        &self,
        slot: &SlotId,
        instance: Instance<I, A, T>,
    ) -> Result<usize, ConfigError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        let entry = self.entry::<I, A, T>(slot)?;
        let records: Vec<(String, Arc<dyn ProxyRecord>)> = instance
            .proxies
            .iter()
            .map(|(k, p)| (k.clone(), Arc::clone(p) as Arc<dyn ProxyRecord>))
            .collect();

        let index = {
            let mut list = lock(&entry.instances);
            list.push(Arc::new(instance));
            list.len() - 1
        };

        let mut arena = lock(&self.arena);
        for (channel, record) in records {
            arena.insert(ProxyKey::new(slot.as_arc(), index, channel), record);
        }
        Ok(index)
    }

    /// Instances of `slot` in registration order (snapshot).
    pub(crate) fn instances_for<I, A, T>(
        &self,
        slot: &SlotId,
    ) -> Result<Vec<Arc<Instance<I, A, T>>>, ConfigError>
    where
        I: Send + Sync + 'static,
        A: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        if !lock(&self.slots).contains_key(slot) {
            return Ok(Vec::new());
        }
        let entry = self.entry::<I, A, T>(slot)?;
        let list = lock(&entry.instances);
        Ok(list.clone())
    }

    /// Sorted list of known slot ids.
    pub(crate) fn slots(&self) -> Vec<String> {
        let slots = lock(&self.slots);
        let mut names: Vec<String> = slots.keys().map(SlotId::to_string).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn status(&self, slot: &str) -> SlotStatus {
        lock(&self.slots)
            .get(slot)
            .map(|r| r.status)
            .unwrap_or(SlotStatus::Uninitialized)
    }

    pub(crate) fn instance_count(&self, slot: &str) -> usize {
        let entry = lock(&self.slots).get(slot).map(|r| Arc::clone(&r.entry));
        entry.map(|e| e.instance_count()).unwrap_or(0)
    }

    pub(crate) fn proxy(&self, key: &ProxyKey) -> Option<Arc<dyn ProxyRecord>> {
        lock(&self.arena).get(key).cloned()
    }

    pub(crate) fn proxy_keys(&self, slot: &str) -> Vec<ProxyKey> {
        lock(&self.arena)
            .keys()
            .filter(|k| &*k.slot == slot)
            .cloned()
            .collect()
    }

    fn finish_reload(&self, slot: &SlotId, reloads: u64) {
        if let Some(record) = lock(&self.slots).get_mut(slot) {
            record.status = SlotStatus::Initialized { reloads };
        }
    }
}

/// Marks a slot as reloading until dropped.
///
/// Dropping without [`ReloadGuard::complete`] (producer error or panic) puts
/// the slot back to `Initialized` without counting the pass.
pub(crate) struct ReloadGuard<'a> {
    registry: &'a Registry,
    slot: SlotId,
    reloads: u64,
    completed: bool,
}

impl ReloadGuard<'_> {
    /// Counts the pass as completed.
    pub(crate) fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        let reloads = if self.completed {
            self.reloads + 1
        } else {
            self.reloads
        };
        self.registry.finish_reload(&self.slot, reloads);
    }
}
