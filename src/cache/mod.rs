//! Cache Module
//!
//! Provides the expiring key-value cache, its two store designs and the
//! aging list used by the sweeper.

mod aging;
mod entry;
mod facade;
mod flat;
mod stats;
mod store;


// Re-export public types
pub use aging::{AgingList, AgingNode, Renewed};
pub use entry::{expiration_from_now, TimedEntry, TrackedValue};
pub use facade::Cache;
pub use flat::FlatStore;
pub use stats::{CacheCounters, CacheStats};
pub use store::TrackedStore;
