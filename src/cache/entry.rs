//! Cache Entry Module
//!
//! Defines the records stored by the two map designs.

use std::time::Duration;

use tokio::time::Instant;

// == Timed Entry ==
/// A value together with the instant it stops being observable.
///
/// Used by the flat-map store, which checks expiration on every read.
#[derive(Debug, Clone)]
pub struct TimedEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration instant
    pub expires_at: Instant,
}

impl<V> TimedEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl` from now.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: expiration_from_now(ttl),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches its
    /// expiration instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

// == Tracked Value ==
/// A value stamped with the renewal epoch that wrote it.
///
/// Used by the aging-list store; the expiration instant lives only in the
/// sweeper's aging list.
#[derive(Debug, Clone)]
pub struct TrackedValue<V> {
    pub value: V,
    pub epoch: u64,
}

// == Utility Functions ==
/// Returns `now + ttl`, saturating far in the future instead of overflowing.
pub fn expiration_from_now(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl)
        .unwrap_or_else(|| now + Duration::from_secs(100 * 365 * 24 * 60 * 60))
}
