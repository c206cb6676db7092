//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! loader invocations.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time cache performance snapshot.
///
/// Hits and misses are counted only on read operations (`get` and
/// `get_or_load`), never on `put` or `invalidate`. Evictions cover both
/// capacity eviction and expiration removal. Counters are cumulative and
/// survive `invalidate_all`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads served from the cache
    pub hits: u64,
    /// Number of reads that found no fresh entry
    pub misses: u64,
    /// Number of entries removed by capacity or expiration eviction
    pub evictions: u64,
    /// Number of loader invocations
    pub loads: u64,
    /// Current number of entries in the store
    pub entry_count: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 before any reads.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Load ==
    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    // == Update Entry Count ==
    pub fn set_entry_count(&mut self, count: usize) {
        self.entry_count = count;
    }
}
