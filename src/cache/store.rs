//! Cache Store Module
//!
//! Main cache engine combining bounded HashMap storage with LRU eviction,
//! expire-after-write TTL and read-through loading. Concurrent misses for the
//! same key share a single in-flight load (single-flight), so an expensive
//! backing operation runs at most once per racing group.

use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, RwLock};
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, RecencyList};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Loader Failure ==
/// Any error a loader can fail with. Converted to [`CacheError::Load`] with
/// the failing key attached before fanning out to waiters.
pub type LoadFailure = Box<dyn std::error::Error + Send + Sync>;

/// Published outcome of an in-flight load; `None` while still loading.
type FlightResult<V> = Option<Result<V>>;
type FlightReceiver<V> = watch::Receiver<FlightResult<V>>;

// == Store Internals ==
#[derive(Debug)]
struct StoreInner<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    recency: RecencyList,
    /// Performance statistics
    stats: CacheStats,
}

// == Cache Store ==
/// Bounded key-value store with read-through semantics.
///
/// Cheap to clone: clones share the same underlying state, so a store can be
/// handed to background tasks and request handlers alike. All mutating state
/// sits behind a `tokio::sync::RwLock`; `put` and `invalidate` are atomic
/// with respect to concurrent readers.
pub struct CacheStore<V> {
    /// Logical cache name, used by the manager and in log output
    name: String,
    /// Maximum number of entries
    capacity: usize,
    /// Expire-after-write TTL, None = entries never expire
    ttl: Option<Duration>,
    inner: Arc<RwLock<StoreInner<V>>>,
    /// Pending loads keyed by cache key, for single-flight deduplication
    flights: Arc<Mutex<HashMap<String, FlightReceiver<V>>>>,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            capacity: self.capacity,
            ttl: self.ttl,
            inner: Arc::clone(&self.inner),
            flights: Arc::clone(&self.flights),
        }
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new store from a validated configuration.
    ///
    /// # Arguments
    /// * `name` - Logical cache name
    /// * `config` - Capacity and optional TTL
    ///
    /// Fails with [`CacheError::InvalidConfig`] for a configuration that can
    /// never hold an entry.
    pub fn new(name: impl Into<String>, config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            capacity: config.capacity,
            ttl: config.ttl,
            inner: Arc::new(RwLock::new(StoreInner {
                entries: HashMap::new(),
                recency: RecencyList::new(),
                stats: CacheStats::new(),
            })),
            flights: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    // == Accessors ==
    /// Returns the logical cache name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured expire-after-write TTL.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if present and not expired; refreshes the entry's
    /// access recency on a hit. A stale entry is removed at read time and the
    /// read counts as a miss (the removal counts as an eviction), so no
    /// reader ever observes a value older than the store's TTL.
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        match inner.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut slot) => {
                if slot.get().is_expired(self.ttl) {
                    slot.remove();
                    inner.recency.forget(key);
                    inner.stats.record_eviction();
                    inner.stats.record_miss();
                    let len = inner.entries.len();
                    inner.stats.set_entry_count(len);
                    debug!(cache = %self.name, key, "removed expired entry on read");
                    None
                } else {
                    let entry = slot.get_mut();
                    entry.touch();
                    let value = entry.value.clone();
                    inner.recency.record_access(key);
                    inner.stats.record_hit();
                    Some(value)
                }
            }
            MapEntry::Vacant(_) => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Get Or Load ==
    /// Read-through retrieval: returns the cached value, or invokes the
    /// loader to materialize one.
    ///
    /// Among callers racing on the same miss, the loader runs **at most
    /// once**; every other caller awaits the in-flight load and receives its
    /// result, success or failure. A failed load is never cached and the
    /// failure is delivered to all waiters; retrying is the caller's call.
    /// A loader that panics counts as a failed load: waiters receive a
    /// [`CacheError::Load`] and the key stays loadable.
    ///
    /// The load runs in its own task, so a caller abandoning this future does
    /// not cancel the shared load. Waiting carries no implicit timeout;
    /// callers wanting a bound wrap this call in their own timeout.
    pub async fn get_or_load<F, Fut>(&self, key: &str, loader: F) -> Result<V>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<V, LoadFailure>> + Send + 'static,
    {
        self.get_or_load_with(key, loader, |_, _| true).await
    }

    /// Read-through retrieval with conditional caching.
    ///
    /// `should_cache` is evaluated against the freshly loaded value before it
    /// is stored. When it returns false the value is still returned to every
    /// waiter, it just never enters the cache. A fallible predicate belongs
    /// to the caller: fold failures into `false` to skip caching.
    pub async fn get_or_load_with<F, Fut, P>(
        &self,
        key: &str,
        loader: F,
        should_cache: P,
    ) -> Result<V>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<V, LoadFailure>> + Send + 'static,
        P: FnOnce(&str, &V) -> bool + Send + 'static,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let mut rx = {
            let mut flights = self.flights.lock().await;
            match flights.get(key) {
                Some(rx) => rx.clone(),
                None => {
                    // A flight may have retired between our miss and taking
                    // this lock; its freshly cached value makes a new load
                    // redundant. Read without counting: joining callers do
                    // not record hits either.
                    {
                        let inner = self.inner.read().await;
                        if let Some(entry) = inner.entries.get(key) {
                            if !entry.is_expired(self.ttl) {
                                return Ok(entry.value.clone());
                            }
                        }
                    }
                    let (tx, rx) = watch::channel(None);
                    flights.insert(key.to_string(), rx.clone());
                    let future = loader(key.to_string());
                    let store = self.clone();
                    let key = key.to_string();
                    tokio::spawn(async move {
                        store.run_flight(key, future, should_cache, tx).await;
                    });
                    rx
                }
            }
        };

        self.await_flight(key, &mut rx).await
    }

    /// Drives a single in-flight load to completion and publishes the result.
    async fn run_flight<Fut, P>(
        &self,
        key: String,
        future: Fut,
        should_cache: P,
        tx: watch::Sender<FlightResult<V>>,
    ) where
        Fut: Future<Output = std::result::Result<V, LoadFailure>> + Send + 'static,
        P: FnOnce(&str, &V) -> bool,
    {
        self.inner.write().await.stats.record_load();

        // The loader runs on a task of its own: a panic inside it surfaces
        // here as a JoinError instead of unwinding past the flight
        // retirement below.
        let result = match tokio::spawn(future).await {
            Ok(Ok(value)) => {
                let mut inner = self.inner.write().await;
                if should_cache(&key, &value) {
                    Self::insert_entry(&mut inner, &key, value.clone(), self.capacity, &self.name);
                } else {
                    debug!(cache = %self.name, key = %key, "predicate suppressed caching of loaded value");
                }
                Ok(value)
            }
            Ok(Err(failure)) => Err(CacheError::load(&key, failure)),
            Err(panicked) => Err(CacheError::load(&key, panicked)),
        };

        // Retire the flight before publishing, so a caller arriving after
        // completion starts a fresh load instead of adopting a finished one.
        self.flights.lock().await.remove(&key);
        let _ = tx.send(Some(result));
    }

    /// Awaits the published outcome of an in-flight load.
    async fn await_flight(&self, key: &str, rx: &mut FlightReceiver<V>) -> Result<V> {
        loop {
            if let Some(result) = rx.borrow_and_update().as_ref() {
                return result.clone();
            }
            if rx.changed().await.is_err() {
                // Sender dropped without publishing: the flight task died.
                // Purge the dead flight so the key stays loadable.
                self.retire_dead_flight(key).await;
                return Err(CacheError::load(key, "load task aborted before completion"));
            }
        }
    }

    /// Removes a pending flight whose sender is gone. A live flight under the
    /// same key (a newer load already in progress) is left untouched.
    async fn retire_dead_flight(&self, key: &str) {
        let mut flights = self.flights.lock().await;
        if let Some(rx) = flights.get(key) {
            if rx.has_changed().is_err() {
                flights.remove(key);
            }
        }
    }

    // == Put ==
    /// Unconditionally (over)writes an entry, resetting its write time.
    ///
    /// Inserting a new key into a full store first evicts the least recently
    /// used entry. No hit or miss is counted.
    pub async fn put(&self, key: &str, value: V) {
        let mut inner = self.inner.write().await;
        Self::insert_entry(&mut inner, key, value, self.capacity, &self.name);
    }

    /// Writes an entry only when the predicate approves the value.
    ///
    /// The skipped write leaves any existing entry untouched.
    pub async fn put_if<P>(&self, key: &str, value: V, should_cache: P)
    where
        P: FnOnce(&str, &V) -> bool,
    {
        if !should_cache(key, &value) {
            debug!(cache = %self.name, key, "predicate suppressed put");
            return;
        }
        self.put(key, value).await;
    }

    /// Inserts an entry, evicting the LRU entry when a new key would exceed
    /// capacity. Caller holds the write lock.
    fn insert_entry(
        inner: &mut StoreInner<V>,
        key: &str,
        value: V,
        capacity: usize,
        name: &str,
    ) {
        let is_new = !inner.entries.contains_key(key);
        if is_new && inner.entries.len() >= capacity {
            if let Some(victim) = inner.recency.pop_lru() {
                inner.entries.remove(&victim);
                inner.stats.record_eviction();
                debug!(cache = %name, key = %victim, "evicted least recently used entry");
            }
        }
        inner.entries.insert(key.to_string(), CacheEntry::new(value));
        inner.recency.record_access(key);
        let len = inner.entries.len();
        inner.stats.set_entry_count(len);
    }

    // == Invalidate ==
    /// Removes an entry if present. Returns whether an entry was removed;
    /// no-op (and no error) for an absent key. Not counted as an eviction.
    pub async fn invalidate(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        if inner.entries.remove(key).is_some() {
            inner.recency.forget(key);
            let len = inner.entries.len();
            inner.stats.set_entry_count(len);
            true
        } else {
            false
        }
    }

    // == Invalidate All ==
    /// Empties the store. Cumulative hit/miss/eviction/load counters are
    /// preserved; only the entry count resets.
    pub async fn invalidate_all(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.recency.clear();
        inner.stats.set_entry_count(0);
        debug!(cache = %self.name, "invalidated all entries");
    }

    // == Sweep Expired ==
    /// Actively removes every currently expired entry, counting each removal
    /// as an eviction. Returns the number of entries removed.
    pub async fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let inner = &mut *inner;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(self.ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.remove(key);
            inner.recency.forget(key);
            inner.stats.record_eviction();
        }
        inner.stats.set_entry_count(inner.entries.len());
        expired.len()
    }

    // == Stats ==
    /// Returns a point-in-time statistics snapshot.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_entry_count(inner.entries.len());
        stats
    }

    // == Contents ==
    /// Returns a copied snapshot of the fresh entries for introspection.
    ///
    /// The copy keeps the live structure out of external hands; expired
    /// entries are filtered so no reader observes a stale value. Counters
    /// are not touched.
    pub async fn contents(&self) -> HashMap<String, V> {
        let inner = self.inner.read().await;
        inner
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(self.ttl))
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    // == Length ==
    /// Returns the current number of entries (expired but unswept entries
    /// included).
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
