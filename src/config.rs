//! Configuration Module
//!
//! Per-store cache configuration with validation.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Configuration for a single cache store.
///
/// A store is always bounded by `capacity`. Expiration is optional: a store
/// without a TTL never expires entries, so capacity eviction and explicit
/// invalidation are its only removal paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the store can hold
    pub capacity: usize,
    /// Expire-after-write duration, None = entries never expire
    pub ttl: Option<Duration>,
    /// Interval for the active expiration sweep task, None = lazy expiry only.
    /// The store itself never sweeps; callers pass this to
    /// [`crate::tasks::spawn_sweep_task`].
    pub sweep_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a bounded configuration without expiration.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity,
            ttl: None,
            sweep_interval: None,
        }
    }

    /// Returns a copy of this configuration with an expire-after-write TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Returns a copy of this configuration with an active sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = Some(interval);
        self
    }

    /// Validates the configuration.
    ///
    /// A zero capacity can never hold an entry, so it is rejected at store
    /// creation time rather than surfacing as an eviction failure later. A
    /// zero sweep interval would spin the sweep task and is rejected too.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval == Some(Duration::ZERO) {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates a configuration from environment variables.
    ///
    /// Used by the demo binary; library callers normally construct configs
    /// directly.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries per store (default: 1000)
    /// - `CACHE_TTL_SECS` - Expire-after-write in seconds (default: unset)
    /// - `SWEEP_INTERVAL_SECS` - Active sweep frequency in seconds (default: unset)
    pub fn from_env() -> Self {
        let capacity = env::var("CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);
        let ttl = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs);
        let sweep_interval = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs);
        Self {
            capacity,
            ttl,
            sweep_interval,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl: None,
            sweep_interval: None,
        }
    }
}
