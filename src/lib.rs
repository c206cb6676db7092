//! loadcache - An in-process read-through cache library
//!
//! Bounded named caches with expire-after-write TTL, deterministic LRU
//! eviction, single-flight loading and pluggable key derivation.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod manager;
pub mod tasks;

pub use cache::{CacheStats, CacheStore, LoadFailure, LoadingCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use key::{DelimitedKeyStrategy, KeyStrategy, TimeBucketKeyStrategy};
pub use manager::CacheManager;
pub use tasks::spawn_sweep_task;
