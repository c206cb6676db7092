//! Recency Tracking Module
//!
//! Deterministic least-recently-used ordering for capacity eviction.

use std::collections::VecDeque;

// == Recency List ==
/// Tracks key access order for LRU eviction.
///
/// Keys are kept in a VecDeque ordered from least recently used (front) to
/// most recently used (back). Ordering is by access sequence rather than by
/// timestamp, which makes eviction deterministic: among entries touched in
/// the same instant, the one inserted earliest sits closest to the front and
/// is evicted first.
#[derive(Debug, Default)]
pub struct RecencyList {
    /// Keys ordered front = LRU, back = MRU
    order: VecDeque<String>,
}

impl RecencyList {
    // == Constructor ==
    /// Creates an empty recency list.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record Access ==
    /// Marks a key as the most recently used.
    ///
    /// A key already present is moved to the back; a new key is appended.
    pub fn record_access(&mut self, key: &str) {
        self.forget(key);
        self.order.push_back(key.to_string());
    }

    // == Forget ==
    /// Drops a key from the ordering, if tracked.
    pub fn forget(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Pop LRU ==
    /// Removes and returns the least recently used key.
    pub fn pop_lru(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek LRU ==
    /// Returns the current eviction candidate without removing it.
    pub fn peek_lru(&self) -> Option<&String> {
        self.order.front()
    }

    // == Clear ==
    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
