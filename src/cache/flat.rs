//! Flat Store Module
//!
//! Baseline design: one reader/writer lock over a plain map of timed entries.
//! Reads treat expired entries as absent; a periodic full scan removes them.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use crate::cache::TimedEntry;

// == Flat Store ==
/// Key-value map with per-key TTLs guarded by a single `RwLock`.
#[derive(Debug)]
pub struct FlatStore<K, V> {
    entries: RwLock<HashMap<K, TimedEntry<V>>>,
}

impl<K, V> Default for FlatStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FlatStore<K, V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    // == Length ==
    /// Returns the number of physically present entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> FlatStore<K, V>
where
    K: Eq + Hash,
{
    // == Set ==
    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// If the key already exists, the value is overwritten and its TTL reset.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let entry = TimedEntry::new(value, ttl);
        self.entries.write().insert(key, entry);
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// Expired entries are left in place for the next scan.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let now = Instant::now();
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes `key` immediately. Returns true if a live entry was removed.
    pub fn delete(&self, key: &K) -> bool {
        let removed = self.entries.write().remove(key);
        removed.is_some_and(|entry| !entry.is_expired())
    }

    // == Cleanup Expired ==
    /// Removes every entry expired at `now`.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }
}
