//! Integration Tests for the Cache Facade
//!
//! Drives both expiration designs through the public API with a paused Tokio
//! clock, so expiration timings are exact and the tests run instantly.

use std::sync::Arc;
use std::time::Duration;

use expiring_cache::{Cache, CacheConfig, CacheError, ExpirationMode};
use tokio::time::sleep;

// == Helper Functions ==

fn aging_cache(ttl: Duration) -> Cache<String, String> {
    Cache::new(ttl, Duration::from_secs(1))
}

fn flat_cache(ttl: Duration, sweep_interval: Duration) -> Cache<String, String> {
    Cache::with_config(
        CacheConfig::new()
            .with_mode(ExpirationMode::FlatMap)
            .with_ttl(ttl)
            .with_sweep_interval(sweep_interval),
    )
}

fn key(k: &str) -> String {
    k.to_string()
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

// == Expiration Scenarios ==

async fn store_then_expire(cache: Cache<String, String>) {
    cache.store(key("1"), key("stored")).await.unwrap();

    sleep(secs(1.0)).await;
    assert_eq!(cache.load(&key("1")), Some(key("stored")));

    sleep(secs(5.5)).await;
    assert_eq!(cache.load(&key("1")), None);

    cache.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_store_then_expire_aging() {
    store_then_expire(aging_cache(secs(5.0))).await;
}

#[tokio::test(start_paused = true)]
async fn test_store_then_expire_flat() {
    store_then_expire(flat_cache(secs(5.0), secs(1.0))).await;
}

async fn renewal_extends_life(cache: Cache<String, String>) {
    cache.store(key("1"), key("first")).await.unwrap();

    sleep(secs(2.0)).await;
    cache.store(key("1"), key("second")).await.unwrap();

    // Past the original expiration, before the renewed one
    sleep(secs(4.0)).await;
    assert_eq!(cache.load(&key("1")), Some(key("second")));

    sleep(secs(1.5)).await;
    assert_eq!(cache.load(&key("1")), None);

    cache.close().await;
}

#[tokio::test(start_paused = true)]
async fn test_renewal_extends_life_aging() {
    renewal_extends_life(aging_cache(secs(5.0))).await;
}

#[tokio::test(start_paused = true)]
async fn test_renewal_extends_life_flat() {
    renewal_extends_life(flat_cache(secs(5.0), secs(1.0))).await;
}

#[tokio::test(start_paused = true)]
async fn test_renewal_reorders_expiration_aging() {
    let cache = aging_cache(secs(5.0));

    cache.store(key("a"), key("a")).await.unwrap();
    cache.store(key("b"), key("b")).await.unwrap();

    sleep(secs(3.0)).await;
    cache.store(key("a"), key("a2")).await.unwrap();

    sleep(secs(2.5)).await;
    assert_eq!(cache.load(&key("b")), None);
    assert_eq!(cache.load(&key("a")), Some(key("a2")));

    sleep(secs(3.0)).await;
    assert_eq!(cache.load(&key("a")), None);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().expirations, 2);
}

// == Construction Defaults ==

#[tokio::test(start_paused = true)]
async fn test_zero_durations_use_defaults() {
    let aging = aging_cache(Duration::ZERO);
    assert_eq!(aging.default_expiration(), Duration::from_secs(300));
    assert_eq!(aging.sweep_interval(), Duration::from_secs(1));
    assert_eq!(aging.mode(), ExpirationMode::AgingList);

    let flat = flat_cache(Duration::ZERO, Duration::ZERO);
    assert_eq!(flat.default_expiration(), Duration::from_secs(300));
    assert_eq!(flat.sweep_interval(), Duration::from_secs(300));
    assert_eq!(flat.mode(), ExpirationMode::FlatMap);
}

// == Load ==

#[tokio::test(start_paused = true)]
async fn test_load_never_stored_key() {
    let cache = aging_cache(secs(5.0));

    assert_eq!(cache.load(&key("ghost")), None);
    assert_eq!(cache.load(&key("ghost")), None);

    let stats = cache.stats();
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.hits, 0);
}

#[tokio::test(start_paused = true)]
async fn test_overwrite_returns_latest_value() {
    let cache = aging_cache(secs(5.0));

    cache.store(key("k"), key("v1")).await.unwrap();
    cache.store(key("k"), key("v2")).await.unwrap();

    assert_eq!(cache.load(&key("k")), Some(key("v2")));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().hits, 1);
}

// == Delete ==

#[tokio::test(start_paused = true)]
async fn test_delete_is_immediate_aging() {
    let cache = aging_cache(secs(5.0));

    cache.store(key("k"), key("v")).await.unwrap();
    assert_eq!(cache.delete(&key("k")), Ok(true));
    assert_eq!(cache.load(&key("k")), None);
    assert_eq!(cache.delete(&key("k")), Ok(false));

    // The leftover aging node expires without counting as an expiration
    sleep(secs(6.5)).await;
    let stats = cache.stats();
    assert_eq!(stats.deletions, 1);
    assert_eq!(stats.expirations, 0);
}

#[tokio::test(start_paused = true)]
async fn test_store_after_delete_renews_aging() {
    let cache = aging_cache(secs(5.0));

    cache.store(key("k"), key("v1")).await.unwrap();
    cache.delete(&key("k")).unwrap();

    sleep(secs(2.0)).await;
    cache.store(key("k"), key("v2")).await.unwrap();

    sleep(secs(4.0)).await;
    assert_eq!(cache.load(&key("k")), Some(key("v2")));

    sleep(secs(1.5)).await;
    assert_eq!(cache.load(&key("k")), None);
}

#[tokio::test(start_paused = true)]
async fn test_delete_is_immediate_flat() {
    let cache = flat_cache(secs(5.0), secs(1.0));

    cache.store(key("k"), key("v")).await.unwrap();
    assert_eq!(cache.delete(&key("k")), Ok(true));
    assert_eq!(cache.load(&key("k")), None);
    assert!(cache.is_empty());
}

// == Per-Key Expiration ==

#[tokio::test(start_paused = true)]
async fn test_store_with_expiration_flat() {
    let cache = flat_cache(secs(5.0), secs(60.0));

    cache
        .store_with_expiration(key("short"), key("s"), secs(1.0))
        .await
        .unwrap();
    cache
        .store_with_expiration(key("long"), key("l"), secs(10.0))
        .await
        .unwrap();
    cache
        .store_with_expiration(key("default"), key("d"), Duration::ZERO)
        .await
        .unwrap();

    sleep(secs(1.5)).await;
    assert_eq!(cache.load(&key("short")), None);
    assert_eq!(cache.load(&key("long")), Some(key("l")));
    assert_eq!(cache.load(&key("default")), Some(key("d")));

    sleep(secs(4.0)).await;
    assert_eq!(cache.load(&key("default")), None);
    assert_eq!(cache.load(&key("long")), Some(key("l")));
}

#[tokio::test(start_paused = true)]
async fn test_store_with_expiration_rejected_aging() {
    let cache = aging_cache(secs(5.0));

    let result = cache
        .store_with_expiration(key("k"), key("v"), secs(1.0))
        .await;

    assert_eq!(result, Err(CacheError::PerKeyTtlUnsupported));
    assert_eq!(cache.load(&key("k")), None);
}

// == Flat-Map Sweeping ==

#[tokio::test(start_paused = true)]
async fn test_flat_expired_entries_reclaimed_by_scan() {
    let cache = flat_cache(secs(1.0), secs(60.0));

    cache.store(key("k"), key("v")).await.unwrap();

    sleep(secs(2.0)).await;
    assert_eq!(cache.load(&key("k")), None);
    assert_eq!(cache.len(), 1, "Lazy expiration leaves the entry in place");

    sleep(secs(60.0)).await;
    assert!(cache.is_empty());
    assert_eq!(cache.stats().expirations, 1);
}

// == Teardown ==

#[tokio::test(start_paused = true)]
async fn test_close_rejects_mutations() {
    for cache in [aging_cache(secs(5.0)), flat_cache(secs(5.0), secs(1.0))] {
        cache.store(key("k"), key("v")).await.unwrap();
        cache.close().await;

        assert!(cache.is_closed());
        assert_eq!(cache.store(key("k"), key("v2")).await, Err(CacheError::Closed));
        assert_eq!(cache.delete(&key("k")), Err(CacheError::Closed));
        assert_eq!(cache.load(&key("k")), Some(key("v")));

        // Closing twice is a no-op
        cache.close().await;
    }
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_aging() {
    let cache: Arc<Cache<u64, u64>> = Arc::new(Cache::new(secs(60.0), secs(1.0)));
    let mut handles = Vec::new();

    for t in 0..8u64 {
        let cache = Arc::clone(&cache);
        handles.push(tokio::spawn(async move {
            for i in 0..100u64 {
                let k = t * 1000 + i;
                cache.store(k, i).await.unwrap();
                assert_eq!(cache.load(&k), Some(i));
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(cache.len(), 800);
    assert_eq!(cache.stats().hits, 800);
    cache.close().await;
}
