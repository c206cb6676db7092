//! Cache Manager Module
//!
//! Owns and exposes named cache stores. One manager handles one value type;
//! callers mixing value types run one manager per type.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{CacheStats, CacheStore};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

struct ManagerInner<V> {
    stores: HashMap<String, CacheStore<V>>,
    /// Registration order, for `names()`
    order: Vec<String>,
}

// == Cache Manager ==
/// Registry of named [`CacheStore`] instances.
///
/// Lives for the process (or a test scope). Stores are created lazily on
/// first request and kept until the manager is dropped; operations on
/// different stores are fully independent.
pub struct CacheManager<V> {
    inner: RwLock<ManagerInner<V>>,
}

impl<V> Default for CacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> CacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ManagerInner {
                stores: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    // == Get Or Create ==
    /// Returns the store registered under `name`, creating it with `config`
    /// if absent. Idempotent by name: an existing store wins and the new
    /// config is ignored.
    ///
    /// An invalid config fails with [`CacheError::InvalidConfig`] and nothing
    /// is registered.
    pub async fn get_or_create(&self, name: &str, config: &CacheConfig) -> Result<CacheStore<V>> {
        {
            let inner = self.inner.read().await;
            if let Some(store) = inner.stores.get(name) {
                return Ok(store.clone());
            }
        }

        let mut inner = self.inner.write().await;
        // Re-check: another caller may have registered while we upgraded.
        if let Some(store) = inner.stores.get(name) {
            return Ok(store.clone());
        }

        let store = CacheStore::new(name, config)?;
        inner.stores.insert(name.to_string(), store.clone());
        inner.order.push(name.to_string());
        debug!(cache = %name, capacity = config.capacity, ttl = ?config.ttl, "registered cache store");
        Ok(store)
    }

    // == Get ==
    /// Returns the store registered under `name`.
    ///
    /// Fails with [`CacheError::NotFound`] for an unregistered name; a typo'd
    /// name never silently yields a fresh empty store.
    pub async fn get(&self, name: &str) -> Result<CacheStore<V>> {
        let inner = self.inner.read().await;
        inner
            .stores
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(name.to_string()))
    }

    // == Names ==
    /// All registered store names, in registration order.
    pub async fn names(&self) -> Vec<String> {
        self.inner.read().await.order.clone()
    }

    // == Clear ==
    /// Invalidates every entry of the named store.
    ///
    /// Fails with [`CacheError::NotFound`] if the name is unregistered.
    pub async fn clear(&self, name: &str) -> Result<()> {
        let store = self.get(name).await?;
        store.invalidate_all().await;
        Ok(())
    }

    // == Clear All ==
    /// Invalidates every entry of every registered store.
    pub async fn clear_all(&self) {
        let stores: Vec<CacheStore<V>> = {
            let inner = self.inner.read().await;
            inner.stores.values().cloned().collect()
        };
        for store in stores {
            store.invalidate_all().await;
        }
    }

    // == Stats ==
    /// Statistics snapshot for the named store.
    pub async fn stats(&self, name: &str) -> Result<CacheStats> {
        let store = self.get(name).await?;
        Ok(store.stats().await)
    }

    /// Statistics snapshots for every registered store, in registration
    /// order.
    pub async fn stats_all(&self) -> Vec<(String, CacheStats)> {
        let stores: Vec<(String, CacheStore<V>)> = {
            let inner = self.inner.read().await;
            inner
                .order
                .iter()
                .filter_map(|name| {
                    inner
                        .stores
                        .get(name)
                        .map(|store| (name.clone(), store.clone()))
                })
                .collect()
        };

        let mut snapshots = Vec::with_capacity(stores.len());
        for (name, store) in stores {
            snapshots.push((name, store.stats().await));
        }
        snapshots
    }
}
