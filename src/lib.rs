//! Expiring Cache - a concurrent in-memory key-value cache with TTL expiration
//!
//! Entries become unobservable once their time-to-live passes, without callers
//! evicting anything by hand. Two expiration designs are available: an aging
//! list swept from the back by a single worker, and a flat locked map scanned
//! in full.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Cache, CacheStats};
pub use config::{CacheConfig, ExpirationMode};
pub use error::{CacheError, Result};
