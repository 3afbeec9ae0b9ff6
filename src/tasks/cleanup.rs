//! TTL Cleanup Task
//!
//! Background task that periodically scans the flat store and removes
//! expired entries.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{CacheCounters, FlatStore};

/// Spawns a background task that periodically cleans up expired entries.
///
/// The task sleeps for `interval` between full scans of the store. Each scan
/// holds the store's write lock for its whole duration.
///
/// # Arguments
/// * `store` - Shared flat store to scan
/// * `interval` - Time between scans
/// * `counters` - Receives the number of expired entries removed
/// * `shutdown` - Stop signal; the task also exits if the sender is dropped
///
/// # Returns
/// A JoinHandle that completes once the task observes the stop signal.
pub fn spawn_cleanup_task<K, V>(
    store: Arc<FlatStore<K, V>>,
    interval: Duration,
    counters: Arc<CacheCounters>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let removed = store.cleanup_expired(Instant::now());
                    counters.record_expirations(removed);

                    if removed > 0 {
                        info!("TTL cleanup: removed {} expired entries", removed);
                    } else {
                        debug!("TTL cleanup: no expired entries found");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("TTL cleanup task stopped");
    })
}
