//! Key Strategy Module
//!
//! Deterministic cache-key derivation from a logical operation and its
//! arguments, decoupled from the store. Stores are key-scheme agnostic:
//! callers derive a key first and hand the string to the store.

use std::time::Duration;

use chrono::Utc;

/// Sentinel rendered for an absent argument, so "no argument" can never
/// collide with an argument whose string form matches another value.
pub const NULL_TOKEN: &str = "null";

// == Key Strategy ==
/// Maps a logical operation plus its arguments to a cache key.
///
/// Contract: equal operation and equal arguments (by value) must yield the
/// same key. That determinism is what makes cache hits possible at all.
pub trait KeyStrategy: Send + Sync {
    /// Derives the cache key for an operation invocation.
    ///
    /// # Arguments
    /// * `operation` - Logical operation identifier, e.g. "get_product"
    /// * `args` - Stringified arguments in call order; `None` for absent ones
    fn derive(&self, operation: &str, args: &[Option<&str>]) -> String;
}

// == Delimited Key Strategy ==
/// Default strategy: operation and arguments joined with a fixed delimiter,
/// argument order preserved, absent arguments rendered as [`NULL_TOKEN`].
#[derive(Debug, Clone)]
pub struct DelimitedKeyStrategy {
    delimiter: char,
}

impl DelimitedKeyStrategy {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimitedKeyStrategy {
    fn default() -> Self {
        Self::new(':')
    }
}

impl KeyStrategy for DelimitedKeyStrategy {
    fn derive(&self, operation: &str, args: &[Option<&str>]) -> String {
        let mut key = String::from(operation);
        for arg in args {
            key.push(self.delimiter);
            key.push_str(arg.unwrap_or(NULL_TOKEN));
        }
        key
    }
}

// == Time Bucket Key Strategy ==
/// Appends a wall-clock bucket index to another strategy's key.
///
/// The bucket index advances every `bucket` interval, so derived keys roll
/// over on that cadence and the previous bucket's entries simply stop being
/// referenced. This gives "refresh every hour" semantics without a TTL,
/// leaving the old entries to capacity eviction.
pub struct TimeBucketKeyStrategy<S> {
    inner: S,
    bucket_secs: i64,
}

impl<S: KeyStrategy> TimeBucketKeyStrategy<S> {
    /// Wraps `inner`, rolling keys over every `bucket`.
    ///
    /// Sub-second buckets round up to one second.
    pub fn new(inner: S, bucket: Duration) -> Self {
        Self {
            inner,
            bucket_secs: (bucket.as_secs() as i64).max(1),
        }
    }

    fn current_bucket(&self) -> i64 {
        Utc::now().timestamp() / self.bucket_secs
    }
}

impl<S: KeyStrategy> KeyStrategy for TimeBucketKeyStrategy<S> {
    fn derive(&self, operation: &str, args: &[Option<&str>]) -> String {
        format!(
            "{}@{}",
            self.inner.derive(operation, args),
            self.current_bucket()
        )
    }
}
