//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for mutating cache operations.
///
/// Lookups never fail: a missing or expired key is reported as `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The sweeper did not accept a renewal within the handoff timeout
    #[error("Cache unavailable: sweeper did not accept renewal within {waited:?}")]
    Unavailable { waited: Duration },

    /// The cache has been closed or its background worker has exited
    #[error("Cache closed")]
    Closed,

    /// Per-key TTLs are not supported by the aging-list mode
    #[error("Per-key expiration is not supported in aging-list mode")]
    PerKeyTtlUnsupported,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
