//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with expire-after-write
//! freshness tracking.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry owned exclusively by its store.
///
/// Freshness is measured from `written_at` (expire-after-write), not from the
/// last access, so a frequently read entry still goes stale once its store's
/// TTL has elapsed since the last put or load.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the value was written or last refreshed
    written_at: Instant,
    /// When the entry was last returned to a reader
    last_accessed_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a fresh entry, stamping both timestamps with the current time.
    pub fn new(value: V) -> Self {
        let now = Instant::now();
        Self {
            value,
            written_at: now,
            last_accessed_at: now,
        }
    }

    // == Is Expired ==
    /// Checks staleness against a store-level TTL.
    ///
    /// Boundary condition: an entry is stale once `now - written_at >= ttl`,
    /// so an entry is expired the instant the full TTL has elapsed. Entries
    /// in a store without a TTL never expire by this mechanism.
    pub fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.written_at.elapsed() >= ttl,
            None => false,
        }
    }

    // == Touch ==
    /// Records a read access.
    pub fn touch(&mut self) {
        self.last_accessed_at = Instant::now();
    }

    // == Age ==
    /// Time elapsed since the value was written.
    pub fn age(&self) -> Duration {
        self.written_at.elapsed()
    }

    /// Time elapsed since the entry was last read.
    #[allow(dead_code)]
    pub fn idle(&self) -> Duration {
        self.last_accessed_at.elapsed()
    }
}
