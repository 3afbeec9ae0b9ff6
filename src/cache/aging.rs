//! Aging List Module
//!
//! Tracks keys in renewal order so expired keys can be popped from the back
//! without scanning the whole map.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::time::Instant;

// == Aging Node ==
/// A key's position in the aging order together with its expiration instant.
#[derive(Debug, Clone)]
pub struct AgingNode<K> {
    pub key: K,
    pub expires_at: Instant,
    /// Highest store epoch that renewed this key
    pub epoch: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Outcome of [`AgingList::renew`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renewed {
    Inserted,
    Moved,
}

// == Aging List ==
/// Doubly linked renewal order over an index of keys.
///
/// Nodes live in a slot vector and link by index:
/// - Front = most recently renewed
/// - Back = next expiration candidate
///
/// With a uniform TTL, expiration instants are non-decreasing from back to
/// front, so the back node is always the soonest to expire. At most one node
/// exists per key.
#[derive(Debug)]
pub struct AgingList<K> {
    slots: Vec<Option<AgingNode<K>>>,
    free: Vec<usize>,
    index: HashMap<K, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K> Default for AgingList<K>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> AgingList<K>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    // == Renew ==
    /// Records a renewal of `key`.
    ///
    /// An existing node takes the later of its current and the new expiration
    /// (and the higher epoch) and moves to the front. A new key gets a new
    /// node at the front.
    pub fn renew(&mut self, key: K, expires_at: Instant, epoch: u64) -> Renewed {
        if let Some(&id) = self.index.get(&key) {
            if let Some(node) = self.slots[id].as_mut() {
                node.expires_at = node.expires_at.max(expires_at);
                node.epoch = node.epoch.max(epoch);
            }
            if self.head != Some(id) {
                self.detach(id);
                self.attach_front(id);
            }
            return Renewed::Moved;
        }

        let node = AgingNode {
            key: key.clone(),
            expires_at,
            epoch,
            prev: None,
            next: None,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.index.insert(key, id);
        self.attach_front(id);
        Renewed::Inserted
    }

    // == Pop Expired ==
    /// Removes and returns the back node if it has expired at `now`.
    pub fn pop_expired(&mut self, now: Instant) -> Option<AgingNode<K>> {
        let tail = self.tail?;
        let expired = self.slots[tail]
            .as_ref()
            .is_some_and(|node| node.expires_at <= now);
        if !expired {
            return None;
        }
        self.remove_slot(tail)
    }

    /// Returns the next expiration candidate without removing it.
    pub fn back(&self) -> Option<&AgingNode<K>> {
        self.tail.and_then(|id| self.slots[id].as_ref())
    }

    /// Returns the most recently renewed node.
    pub fn front(&self) -> Option<&AgingNode<K>> {
        self.head.and_then(|id| self.slots[id].as_ref())
    }

    pub fn get(&self, key: &K) -> Option<&AgingNode<K>> {
        self.index.get(key).and_then(|&id| self.slots[id].as_ref())
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates nodes from front (newest) to back (oldest).
    pub fn iter(&self) -> impl Iterator<Item = &AgingNode<K>> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.slots[cursor?].as_ref()?;
            cursor = node.next;
            Some(node)
        })
    }

    fn remove_slot(&mut self, id: usize) -> Option<AgingNode<K>> {
        self.detach(id);
        let node = self.slots[id].take()?;
        self.free.push(id);
        self.index.remove(&node.key);
        Some(node)
    }

    fn detach(&mut self, id: usize) {
        let (prev, next) = match self.slots[id].as_ref() {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_id) => {
                if let Some(prev_node) = self.slots[prev_id].as_mut() {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }

        match next {
            Some(next_id) => {
                if let Some(next_node) = self.slots[next_id].as_mut() {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }

        if let Some(node) = self.slots[id].as_mut() {
            node.prev = None;
            node.next = None;
        }
    }

    fn attach_front(&mut self, id: usize) {
        let old_head = self.head;
        if let Some(node) = self.slots[id].as_mut() {
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(head_id) => {
                if let Some(head_node) = self.slots[head_id].as_mut() {
                    head_node.prev = Some(id);
                }
            }
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }
}
