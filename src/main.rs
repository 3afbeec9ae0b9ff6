//! Expiring Cache demo
//!
//! Stores a few keys, waits until they expire (or Ctrl+C), then prints the
//! cache statistics as JSON.

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expiring_cache::{Cache, CacheConfig};

const DEMO_KEYS: [&str; 3] = ["demo:1", "demo:2", "demo:3"];

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Store the demo keys and read them back
/// 4. Wait past the TTL plus one sweep, or until Ctrl+C
/// 5. Read the keys again, print stats, close the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expiring_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: mode={:?}, ttl={:?}, sweep_interval={:?}",
        config.mode, config.ttl, config.sweep_interval
    );

    let cache: Cache<String, String> = Cache::with_config(config);

    for key in DEMO_KEYS {
        cache
            .store(key.to_string(), format!("value for {key}"))
            .await
            .with_context(|| format!("failed to store {key}"))?;
    }
    report(&cache, "after store");

    let wait = cache.default_expiration() + cache.sweep_interval();
    info!("Waiting {:?} for entries to expire (Ctrl+C to skip)", wait);
    tokio::select! {
        _ = tokio::time::sleep(wait) => {}
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            info!("Received Ctrl+C, skipping wait");
        }
    }
    report(&cache, "after wait");

    let stats = serde_json::to_string_pretty(&cache.stats()).context("failed to encode stats")?;
    println!("{stats}");

    cache.close().await;
    Ok(())
}

fn report(cache: &Cache<String, String>, stage: &str) {
    for key in DEMO_KEYS {
        match cache.load(&key.to_string()) {
            Some(value) => info!("{stage}: {key} = {value:?}"),
            None => info!("{stage}: {key} absent"),
        }
    }
}
