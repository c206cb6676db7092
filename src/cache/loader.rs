//! Loading Cache Module
//!
//! A self-loading wrapper around [`CacheStore`]: the loader is bound once at
//! construction instead of being supplied on every call, so `get` alone is a
//! full read-through operation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::cache::{CacheStats, CacheStore, LoadFailure};
use crate::error::Result;

/// Boxed future produced by an owned loader.
pub type BoxLoadFuture<V> =
    Pin<Box<dyn Future<Output = std::result::Result<V, LoadFailure>> + Send>>;

type SharedLoader<V> = Arc<dyn Fn(String) -> BoxLoadFuture<V> + Send + Sync>;

// == Loading Cache ==
/// A cache store paired with the loader that populates it.
///
/// Cheap to clone; clones share both the store and the loader.
#[derive(Clone)]
pub struct LoadingCache<V> {
    store: CacheStore<V>,
    loader: SharedLoader<V>,
}

impl<V> LoadingCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Binds a loader to a store.
    ///
    /// The loader receives the cache key and produces the value, typically by
    /// calling into a slow backing service. Its failures surface as
    /// [`crate::error::CacheError::Load`].
    pub fn new<F, Fut>(store: CacheStore<V>, loader: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<V, LoadFailure>> + Send + 'static,
    {
        Self {
            store,
            loader: Arc::new(move |key| -> BoxLoadFuture<V> { Box::pin(loader(key)) }),
        }
    }

    // == Get ==
    /// Returns the cached value for the key, loading it on a miss.
    ///
    /// Carries the store's single-flight guarantee: concurrent misses on the
    /// same key share one loader invocation.
    pub async fn get(&self, key: &str) -> Result<V> {
        let loader = Arc::clone(&self.loader);
        self.store.get_or_load(key, move |k| loader(k)).await
    }

    // == Invalidate ==
    /// Removes an entry if present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.invalidate(key).await
    }

    /// Empties the underlying store.
    pub async fn invalidate_all(&self) {
        self.store.invalidate_all().await;
    }

    // == Stats ==
    /// Statistics snapshot of the underlying store.
    pub async fn stats(&self) -> CacheStats {
        self.store.stats().await
    }

    // == Store ==
    /// Access to the underlying store, e.g. for explicit `put`.
    pub fn store(&self) -> &CacheStore<V> {
        &self.store
    }
}
