//! Cache Facade Module
//!
//! Public entry point composing a store with its background expiration worker.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{expiration_from_now, CacheCounters, CacheStats, FlatStore, TrackedStore};
use crate::config::{CacheConfig, ExpirationMode};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_cleanup_task, spawn_sweeper, Evict, Renewal, Sweeper};

enum Backend<K, V>
where
    K: Eq + Hash,
{
    Aging {
        store: Arc<TrackedStore<K, V>>,
        renewals: mpsc::Sender<Renewal<K>>,
    },
    Flat {
        store: Arc<FlatStore<K, V>>,
    },
}

// == Cache ==
/// Concurrent key-value cache whose entries disappear after a TTL.
///
/// The expiration design is chosen at construction by
/// [`CacheConfig::mode`]:
/// - [`ExpirationMode::AgingList`]: one uniform TTL. Every `store` hands a
///   renewal to a single sweeper task that keeps keys in renewal order and
///   pops expired ones off the back every second and after every renewal.
///   Reads never wait on the sweeper; an expired key may stay readable for up
///   to one tick.
/// - [`ExpirationMode::FlatMap`]: per-key TTLs in one locked map. Reads
///   check expiration themselves and a periodic full scan reclaims memory.
///
/// The worker stops on [`Cache::close`] or when the cache is dropped.
///
/// # Example
///
/// ```rust,no_run
/// use expiring_cache::Cache;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let cache = Cache::new(Duration::from_secs(5), Duration::from_secs(1));
///     cache.store("1".to_string(), 42u32).await.unwrap();
///     assert_eq!(cache.load(&"1".to_string()), Some(42));
///     cache.close().await;
/// }
/// ```
pub struct Cache<K, V>
where
    K: Eq + Hash,
{
    backend: Backend<K, V>,
    config: CacheConfig,
    counters: Arc<CacheCounters>,
    shutdown: watch::Sender<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an aging-list cache.
    ///
    /// A zero `ttl` becomes five minutes. `sweep_interval` does not apply to
    /// the aging-list design, which always ticks once per second; use
    /// [`Cache::with_config`] to pick the flat-map design instead.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self::with_config(
            CacheConfig::new()
                .with_ttl(ttl)
                .with_sweep_interval(sweep_interval),
        )
    }

    /// Creates a cache from a configuration. Zero durations are replaced by
    /// defaults as described in [`CacheConfig::normalized`].
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The cache needs a
    /// runtime to spawn its background worker.
    pub fn with_config(config: CacheConfig) -> Self {
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "expiring_cache::Cache requires a Tokio runtime. \
                 Create it from within #[tokio::main], #[tokio::test] \
                 or other code running on a Tokio runtime."
            );
        }

        let config = config.normalized();
        let counters = Arc::new(CacheCounters::new());
        let (shutdown, shutdown_rx) = watch::channel(false);

        let (backend, worker) = match config.mode {
            ExpirationMode::AgingList => {
                let store = Arc::new(TrackedStore::new());
                // Capacity one: a store waits until the sweeper takes the previous renewal
                let (renewals, renewals_rx) = mpsc::channel(1);
                let target: Arc<dyn Evict<K>> = store.clone();
                let sweeper = Sweeper::new(target, counters.clone(), config.sweep_interval);
                let worker = spawn_sweeper(sweeper, renewals_rx, shutdown_rx);
                (Backend::Aging { store, renewals }, worker)
            }
            ExpirationMode::FlatMap => {
                let store = Arc::new(FlatStore::new());
                let worker = spawn_cleanup_task(
                    store.clone(),
                    config.sweep_interval,
                    counters.clone(),
                    shutdown_rx,
                );
                (Backend::Flat { store }, worker)
            }
        };

        info!(
            "Cache initialized: mode={:?}, ttl={:?}, sweep_interval={:?}",
            config.mode, config.ttl, config.sweep_interval
        );

        Self {
            backend,
            config,
            counters,
            shutdown,
            worker: Mutex::new(Some(worker)),
            closed: AtomicBool::new(false),
        }
    }

    // == Store ==
    /// Upserts `key` with the cache's default TTL.
    ///
    /// In aging-list mode the value is visible to `load` as soon as it is
    /// written; the call then waits until the sweeper accepts the renewal.
    /// If the handoff fails the write is undone, unless a later store has
    /// already replaced it.
    ///
    /// # Errors
    /// - [`CacheError::Closed`] after [`Cache::close`] or if the worker exited
    /// - [`CacheError::Unavailable`] if the sweeper did not accept the renewal
    ///   within the configured handoff timeout
    pub async fn store(&self, key: K, value: V) -> Result<()> {
        self.ensure_open()?;
        match &self.backend {
            Backend::Aging { store, renewals } => {
                let epoch = store.insert(key.clone(), value);
                let renewal = Renewal {
                    key: key.clone(),
                    expires_at: expiration_from_now(self.config.ttl),
                    epoch,
                };
                // Without a renewal the sweeper would never expire this value
                if let Err(err) = self.hand_off(renewals, renewal).await {
                    store.rollback(&key, epoch);
                    return Err(err);
                }
                Ok(())
            }
            Backend::Flat { store } => {
                store.set(key, value, self.config.ttl);
                Ok(())
            }
        }
    }

    /// Upserts `key` with its own TTL; a zero `ttl` means the default TTL.
    ///
    /// Only the flat-map design supports per-key TTLs. The aging-list design
    /// returns [`CacheError::PerKeyTtlUnsupported`] without storing anything.
    pub async fn store_with_expiration(&self, key: K, value: V, ttl: Duration) -> Result<()> {
        self.ensure_open()?;
        match &self.backend {
            Backend::Aging { .. } => Err(CacheError::PerKeyTtlUnsupported),
            Backend::Flat { store } => {
                let ttl = if ttl.is_zero() { self.config.ttl } else { ttl };
                store.set(key, value, ttl);
                Ok(())
            }
        }
    }

    // == Load ==
    /// Returns the value for `key` if a live entry exists.
    pub fn load(&self, key: &K) -> Option<V> {
        let value = match &self.backend {
            Backend::Aging { store, .. } => store.get(key),
            Backend::Flat { store } => store.get(key),
        };
        match value {
            Some(_) => self.counters.record_hit(),
            None => self.counters.record_miss(),
        }
        value
    }

    // == Delete ==
    /// Removes `key` immediately. Returns true if a live entry was removed.
    ///
    /// In aging-list mode the key's node stays in the aging list until it
    /// expires; the sweeper then finds nothing to remove.
    pub fn delete(&self, key: &K) -> Result<bool> {
        self.ensure_open()?;
        let removed = match &self.backend {
            Backend::Aging { store, .. } => store.remove(key),
            Backend::Flat { store } => store.delete(key),
        };
        if removed {
            self.counters.record_deletion();
        }
        Ok(removed)
    }

    // == Close ==
    /// Stops the background worker and waits for it to exit.
    ///
    /// Mutating calls made afterwards fail with [`CacheError::Closed`];
    /// `load` keeps answering from whatever is left in the store.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _ = self.shutdown.send(true);

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(err) = worker.await {
                warn!("Cache worker ended abnormally: {}", err);
            }
        }
        info!("Cache closed");
    }

    async fn hand_off(
        &self,
        renewals: &mpsc::Sender<Renewal<K>>,
        renewal: Renewal<K>,
    ) -> Result<()> {
        let sent = match self.config.handoff_timeout {
            Some(limit) => match tokio::time::timeout(limit, renewals.send(renewal)).await {
                Ok(sent) => sent,
                Err(_) => {
                    warn!("Sweeper did not accept renewal within {:?}", limit);
                    return Err(CacheError::Unavailable { waited: limit });
                }
            },
            None => renewals.send(renewal).await,
        };
        sent.map_err(|_| CacheError::Closed)
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash,
{
    /// Returns the TTL applied by `store`.
    pub fn default_expiration(&self) -> Duration {
        self.config.ttl
    }

    /// Returns the effective sweep period.
    pub fn sweep_interval(&self) -> Duration {
        self.config.sweep_interval
    }

    pub fn mode(&self) -> ExpirationMode {
        self.config.mode
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Returns the number of physically present entries.
    ///
    /// May include entries already expired but not yet swept.
    pub fn len(&self) -> usize {
        match &self.backend {
            Backend::Aging { store, .. } => store.len(),
            Backend::Flat { store } => store.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(CacheError::Closed)
        } else {
            Ok(())
        }
    }
}

impl<K, V> Drop for Cache<K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        // Signal only; the worker cannot be joined from a synchronous drop
        let _ = self.shutdown.send(true);
    }
}
