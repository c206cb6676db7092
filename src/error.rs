//! Error types for the cache library
//!
//! Provides unified error handling using thiserror.
//!
//! All errors propagate to the immediate caller. The library never retries,
//! logs, or swallows an error on its own initiative; retry policy belongs to
//! the caller. `CacheError` is `Clone` so a single load failure can be
//! delivered to every caller waiting on the same in-flight load.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache library.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// An unregistered cache name was referenced via the manager
    #[error("Cache not found: {0}")]
    NotFound(String),

    /// The loader failed while materializing a value for a key.
    ///
    /// Delivered to the originating caller and to all concurrent waiters on
    /// the same key. The entry is left absent; failures are never cached.
    #[error("Load failed for key '{key}': {reason}")]
    Load { key: String, reason: String },

    /// Invalid store configuration detected at creation time
    #[error("Invalid cache configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Builds a `Load` error from a key and any loader failure.
    pub fn load(key: impl Into<String>, failure: impl std::fmt::Display) -> Self {
        CacheError::Load {
            key: key.into(),
            reason: failure.to_string(),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache library.
pub type Result<T> = std::result::Result<T, CacheError>;
