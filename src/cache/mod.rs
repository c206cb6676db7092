//! Cache Module
//!
//! Bounded in-memory caching with expire-after-write TTL, LRU eviction and
//! single-flight read-through loading.

mod entry;
mod loader;
mod recency;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use loader::{BoxLoadFuture, LoadingCache};
pub use recency::RecencyList;
pub use stats::CacheStats;
pub use store::{CacheStore, LoadFailure};
