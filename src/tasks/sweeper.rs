//! Aging-List Sweeper
//!
//! Single background worker that owns the aging list. It applies renewals in
//! the order callers hand them off and pops expired keys from the back of the
//! list on every tick and after every renewal.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{AgingList, CacheCounters, Renewed};

// == Evict ==
/// Removal hook the sweeper calls for every expired key.
///
/// Implementors decide whether the stored value is still covered by the
/// expired node: `epoch` is the newest store epoch the node was renewed with.
pub trait Evict<K>: Send + Sync {
    /// Removes `key` if its stored value is no newer than `epoch`.
    fn evict(&self, key: &K, epoch: u64) -> bool;
}

// == Renewal ==
/// A store notification handed from a caller to the sweeper.
#[derive(Debug, Clone)]
pub struct Renewal<K> {
    pub key: K,
    pub expires_at: Instant,
    pub epoch: u64,
}

// == Sweeper ==
pub struct Sweeper<K> {
    list: AgingList<K>,
    target: Arc<dyn Evict<K>>,
    counters: Arc<CacheCounters>,
    tick: Duration,
}

impl<K> Sweeper<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new(target: Arc<dyn Evict<K>>, counters: Arc<CacheCounters>, tick: Duration) -> Self {
        Self {
            list: AgingList::new(),
            target,
            counters,
            tick,
        }
    }

    /// Applies one renewal to the aging list.
    pub fn apply(&mut self, renewal: Renewal<K>) -> Renewed {
        self.list.renew(renewal.key, renewal.expires_at, renewal.epoch)
    }

    // == Sweep Expired ==
    /// Pops expired nodes off the back of the list and evicts their keys.
    ///
    /// Stops at the first node still live at `now`. Returns the number of
    /// values actually removed from the store.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(node) = self.list.pop_expired(now) {
            if self.target.evict(&node.key, node.epoch) {
                removed += 1;
            }
        }
        self.counters.record_expirations(removed);
        removed
    }

    #[cfg(test)]
    pub(crate) fn aging(&self) -> &AgingList<K> {
        &self.list
    }

    /// Runs until a stop signal arrives or every renewal sender is dropped.
    pub async fn run(
        mut self,
        mut renewals: mpsc::Receiver<Renewal<K>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("Starting aging sweeper with tick of {:?}", self.tick);

        let mut ticker = tokio::time::interval_at(Instant::now() + self.tick, self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep_expired(Instant::now());
                    if removed > 0 {
                        debug!(removed, "Aging sweep: removed expired entries");
                    }
                }
                renewal = renewals.recv() => {
                    let Some(renewal) = renewal else {
                        debug!("Renewal channel closed");
                        break;
                    };
                    self.apply(renewal);
                    let removed = self.sweep_expired(Instant::now());
                    if removed > 0 {
                        debug!(removed, "Renewal sweep: removed expired entries");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(tracked = self.list.len(), "Aging sweeper stopped");
    }
}

/// Spawns the sweeper on the current Tokio runtime.
pub fn spawn_sweeper<K>(
    sweeper: Sweeper<K>,
    renewals: mpsc::Receiver<Renewal<K>>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    tokio::spawn(sweeper.run(renewals, shutdown))
}
