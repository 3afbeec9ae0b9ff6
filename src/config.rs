//! Configuration Module
//!
//! Handles choosing the expiration design and its timing parameters, either
//! programmatically or from environment variables.

use std::env;
use std::time::Duration;

// == Defaults ==
/// TTL substituted when a zero TTL is configured.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(5 * 60);

/// Sweep interval substituted when a zero interval is configured (flat-map mode).
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Fixed tick of the aging-list sweeper. Not configurable.
pub const AGING_TICK: Duration = Duration::from_secs(1);

/// Default bound on how long `store` waits for the sweeper to accept a renewal.
pub const DEFAULT_HANDOFF_TIMEOUT: Duration = Duration::from_secs(5);

// == Expiration Mode ==
/// Which expiration design backs a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpirationMode {
    /// Uniform TTL, renewal-ordered aging list, O(1) amortized expiration.
    #[default]
    AgingList,
    /// Single locked map with per-key TTLs, lazy checks and full periodic scans.
    FlatMap,
}

impl ExpirationMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "aging" | "aging-list" | "aging_list" => Some(Self::AgingList),
            "flat" | "flat-map" | "flat_map" => Some(Self::FlatMap),
            _ => None,
        }
    }
}

/// Cache configuration parameters.
///
/// Zero durations are never rejected; [`CacheConfig::normalized`] replaces them
/// with the documented defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Expiration design
    pub mode: ExpirationMode,
    /// Time-to-live applied by `store`
    pub ttl: Duration,
    /// Full-scan period for flat-map mode (ignored by aging-list mode)
    pub sweep_interval: Duration,
    /// Upper bound on the renewal handoff, `None` waits indefinitely
    pub handoff_timeout: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            mode: ExpirationMode::AgingList,
            ttl: DEFAULT_EXPIRATION,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            handoff_timeout: Some(DEFAULT_HANDOFF_TIMEOUT),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MODE` - `aging` or `flat` (default: aging)
    /// - `CACHE_TTL_SECS` - TTL in seconds (default: 300)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Flat-map scan period in seconds (default: 300)
    /// - `CACHE_HANDOFF_TIMEOUT_MS` - Renewal handoff bound, 0 disables it (default: 5000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            mode: env::var("CACHE_MODE")
                .ok()
                .and_then(|v| ExpirationMode::parse(&v))
                .unwrap_or(defaults.mode),
            ttl: env::var("CACHE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval),
            handoff_timeout: match env::var("CACHE_HANDOFF_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
            {
                Some(0) => None,
                Some(ms) => Some(Duration::from_millis(ms)),
                None => defaults.handoff_timeout,
            },
        }
    }

    pub fn with_mode(mut self, mode: ExpirationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_handoff_timeout(mut self, timeout: Duration) -> Self {
        self.handoff_timeout = Some(timeout);
        self
    }

    /// Lets `store` wait for the sweeper without bound.
    pub fn without_handoff_timeout(mut self) -> Self {
        self.handoff_timeout = None;
        self
    }

    // == Normalize ==
    /// Returns a copy with defaults substituted for zero durations.
    ///
    /// A zero TTL becomes [`DEFAULT_EXPIRATION`]. In aging-list mode the sweep
    /// interval is always [`AGING_TICK`]; in flat-map mode a zero interval
    /// becomes [`DEFAULT_SWEEP_INTERVAL`]. A zero handoff timeout disables it.
    pub fn normalized(&self) -> Self {
        let ttl = if self.ttl.is_zero() {
            DEFAULT_EXPIRATION
        } else {
            self.ttl
        };
        let sweep_interval = match self.mode {
            ExpirationMode::AgingList => AGING_TICK,
            ExpirationMode::FlatMap if self.sweep_interval.is_zero() => DEFAULT_SWEEP_INTERVAL,
            ExpirationMode::FlatMap => self.sweep_interval,
        };
        Self {
            mode: self.mode,
            ttl,
            sweep_interval,
            handoff_timeout: self.handoff_timeout.filter(|t| !t.is_zero()),
        }
    }
}
