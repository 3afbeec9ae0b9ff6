//! Cache Store Module
//!
//! Concurrent key-value storage for the aging-list design. Holds values only;
//! expiration instants are tracked by the sweeper's aging list.

use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::cache::TrackedValue;
use crate::tasks::Evict;

// == Tracked Store ==
/// Sharded concurrent map from key to epoch-stamped value.
///
/// Reads never block other reads and writes only contend on the shard that
/// holds the key, so callers never wait on the sweeper to read.
#[derive(Debug)]
pub struct TrackedStore<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, TrackedValue<V>>,
    next_epoch: AtomicU64,
}

impl<K, V> Default for TrackedStore<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TrackedStore<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_epoch: AtomicU64::new(0),
        }
    }

    // == Insert ==
    /// Upserts `value` under `key` and returns the epoch stamped on it.
    ///
    /// Does not grant any lifetime by itself; the caller forwards the epoch to
    /// the sweeper as part of the renewal.
    pub fn insert(&self, key: K, value: V) -> u64 {
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed) + 1;
        self.entries.insert(key, TrackedValue { value, epoch });
        epoch
    }

    // == Get ==
    /// Returns a clone of the value for `key`, if present.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Remove ==
    /// Removes `key` immediately. Returns true if a value was present.
    pub fn remove(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Rollback ==
    /// Undoes the write stamped `epoch`, unless a later write replaced it.
    pub fn rollback(&self, key: &K, epoch: u64) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.epoch == epoch)
            .is_some()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Evict<K> for TrackedStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    /// Removes `key` only if its value was written no later than `epoch`.
    fn evict(&self, key: &K, epoch: u64) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.epoch <= epoch)
            .is_some()
    }
}
