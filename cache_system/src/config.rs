use {
    serde::{Deserialize, Serialize},
    std::time::Duration,
};

pub const MIN_MAX_SIZE: usize = 1;
pub const MIN_TTL: Duration = Duration::from_millis(1);
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(100);
/// Longest default TTL a config accepts: one year.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Capacity and timing limits of a [`Cache`](crate::Cache).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries.
    pub max_size: usize,
    /// Default time-to-live for entries set without an explicit TTL.
    pub ttl: Duration,
    /// Period of the automatic expiry sweep.
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            ttl: Duration::from_secs(5 * 60),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    pub fn new(max_size: usize, ttl: Duration, cleanup_interval: Duration) -> Self {
        Self {
            max_size,
            ttl,
            cleanup_interval,
        }
        .sanitized()
    }

    /// Builds a config from loosely typed numbers (e.g. a settings file).
    /// Zero and negative values fall back to the minimums instead of failing.
    pub fn from_raw(max_size: i64, ttl_ms: i64, cleanup_interval_ms: i64) -> Self {
        let to_duration = |ms: i64| Duration::from_millis(ms.max(0) as u64);
        Self::new(
            usize::try_from(max_size).unwrap_or(0),
            to_duration(ttl_ms),
            to_duration(cleanup_interval_ms),
        )
    }

    pub fn sanitized(self) -> Self {
        Self {
            max_size: self.max_size.max(MIN_MAX_SIZE),
            ttl: self.ttl.clamp(MIN_TTL, MAX_TTL),
            cleanup_interval: self.cleanup_interval.max(MIN_CLEANUP_INTERVAL),
        }
    }
}

/// Per-entry overrides for [`Cache::set`](crate::Cache::set).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheOptions {
    /// Custom TTL (None = use the cache default)
    pub ttl: Option<Duration>,
    /// Higher priority entries are evicted last.
    pub priority: i32,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
