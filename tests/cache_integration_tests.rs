//! Integration tests exercising the public cache API end to end:
//! read-through stores behind a manager, concurrent load deduplication,
//! TTL expiry, LRU eviction and key derivation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;

use loadcache::{
    CacheConfig, CacheError, CacheManager, CacheStore, DelimitedKeyStrategy, KeyStrategy,
    LoadingCache,
};

fn bounded(capacity: usize) -> CacheConfig {
    CacheConfig::bounded(capacity)
}

// == Concurrent Load Deduplication ==

#[tokio::test]
async fn concurrent_get_or_load_invokes_loader_once() {
    let store: CacheStore<String> = CacheStore::new("dedup", &bounded(10)).unwrap();
    let loads = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = store.clone();
        let loads = Arc::clone(&loads);
        handles.push(tokio::spawn(async move {
            store
                .get_or_load("answer", move |_| async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    // Slow load keeps every racer waiting on the same flight.
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    Ok("42".to_string())
                })
                .await
        }));
    }

    for handle in handles {
        let value = handle.await.unwrap().unwrap();
        assert_eq!(value, "42");
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(store.stats().await.loads, 1);
}

#[tokio::test]
async fn load_failure_reaches_every_waiter_and_is_not_cached() {
    let store: CacheStore<String> = CacheStore::new("failures", &bounded(10)).unwrap();
    let loads = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let loads = Arc::clone(&loads);
        handles.push(tokio::spawn(async move {
            store
                .get_or_load("broken", move |_| async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    Err(loadcache::LoadFailure::from("database unreachable"))
                })
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        match result {
            Err(CacheError::Load { key, reason }) => {
                assert_eq!(key, "broken");
                assert!(reason.contains("database unreachable"));
            }
            other => panic!("expected load error, got {other:?}"),
        }
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(store.is_empty().await);

    // A later retry starts a fresh load and can succeed.
    let value = store
        .get_or_load("broken", |_| async { Ok("recovered".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "recovered");
}

#[tokio::test]
async fn panicking_loader_fails_waiters_and_leaves_key_loadable() {
    let store: CacheStore<String> = CacheStore::new("explosive", &bounded(10)).unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .get_or_load("volatile", |_| async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    assert!(false, "backing call exploded");
                    Ok(String::new())
                })
                .await
        }));
    }

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(CacheError::Load { ref key, .. }) if key == "volatile"));
    }
    assert!(store.is_empty().await);

    // The key is not bricked: a retry invokes a fresh loader and succeeds.
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let value = assert_ok!(
        store
            .get_or_load("volatile", move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok("recovered".to_string())
            })
            .await
    );
    assert_eq!(value, "recovered");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn instant_loads_never_run_twice_for_one_key() {
    // Instant loaders retire their flights almost immediately, which is the
    // tightest squeeze on the miss-then-join window. Each key must still
    // load exactly once.
    let store: CacheStore<String> = CacheStore::new("tight", &bounded(200)).unwrap();
    let loads = Arc::new(AtomicUsize::new(0));

    for round in 0..100 {
        let key = format!("k{round}");
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let key = key.clone();
            let loads = Arc::clone(&loads);
            handles.push(tokio::spawn(async move {
                store
                    .get_or_load(&key, move |_| async move {
                        loads.fetch_add(1, Ordering::SeqCst);
                        Ok("v".to_string())
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }
    }

    assert_eq!(loads.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn abandoned_caller_does_not_cancel_shared_load() {
    let store: CacheStore<String> = CacheStore::new("abandon", &bounded(10)).unwrap();
    let loads = Arc::new(AtomicUsize::new(0));

    let initiator = {
        let store = store.clone();
        let loads = Arc::clone(&loads);
        tokio::spawn(async move {
            store
                .get_or_load("slow", move |_| async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(120)).await;
                    Ok("survived".to_string())
                })
                .await
        })
    };

    // Let the flight start, then abandon the initiating caller.
    tokio::time::sleep(Duration::from_millis(30)).await;
    initiator.abort();

    // A second caller joins the same flight and still gets the result.
    let value = store
        .get_or_load("slow", |_| async { Ok("must not load".to_string()) })
        .await
        .unwrap();
    assert_eq!(value, "survived");
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

// == TTL Scenarios ==

#[tokio::test]
async fn ttl_entry_fresh_before_and_absent_after_deadline() {
    let store: CacheStore<String> =
        CacheStore::new("ttl", &bounded(10).with_ttl(Duration::from_millis(100))).unwrap();

    store.put("k", "x".to_string()).await;

    // Well inside the TTL.
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(store.get("k").await, Some("x".to_string()));

    // Past the TTL.
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(store.get("k").await, None);

    // The next read-through loads again.
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    store
        .get_or_load("k", move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok("y".to_string())
        })
        .await
        .unwrap();
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

// == LRU Scenario ==

#[tokio::test]
async fn lru_eviction_prefers_least_recently_used() {
    let store: CacheStore<String> = CacheStore::new("lru", &bounded(2)).unwrap();

    store.put("a", "1".to_string()).await;
    store.put("b", "2".to_string()).await;

    // Refresh "a" so "b" becomes the eviction candidate.
    assert!(store.get("a").await.is_some());
    store.put("c", "3".to_string()).await;

    assert!(store.get("b").await.is_none());
    assert!(store.get("a").await.is_some());
    assert!(store.get("c").await.is_some());
    assert_eq!(store.stats().await.evictions, 1);
}

// == Manager Scenarios ==

#[tokio::test]
async fn named_caches_are_isolated() {
    let manager: CacheManager<String> = CacheManager::new();
    let products = manager
        .get_or_create("products", &bounded(10))
        .await
        .unwrap();
    let lists = manager.get_or_create("lists", &bounded(10)).await.unwrap();

    products.put("1", "laptop".to_string()).await;
    lists.put("all", "laptop,phone".to_string()).await;

    assert_ok!(manager.clear("products").await);

    assert!(products.is_empty().await);
    assert_eq!(lists.get("all").await, Some("laptop,phone".to_string()));
    assert_eq!(
        manager.names().await,
        vec!["products".to_string(), "lists".to_string()]
    );
}

#[tokio::test]
async fn manager_rejects_unknown_names() {
    let manager: CacheManager<String> = CacheManager::new();
    assert!(matches!(
        manager.get("typo").await,
        Err(CacheError::NotFound(name)) if name == "typo"
    ));
}

// == Key Strategy With Stores ==

#[tokio::test]
async fn derived_keys_produce_hits_across_call_sites() {
    let store: CacheStore<String> = CacheStore::new("keyed", &bounded(10)).unwrap();
    let keys = DelimitedKeyStrategy::default();
    let loads = Arc::new(AtomicUsize::new(0));

    // Two call sites deriving the key independently hit the same entry.
    for _ in 0..2 {
        let key = keys.derive("find_by_name_and_price", &[Some("phone"), Some("1000")]);
        let loads = Arc::clone(&loads);
        store
            .get_or_load(&key, move |_| async move {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok("phone-1000".to_string())
            })
            .await
            .unwrap();
    }
    assert_eq!(loads.load(Ordering::SeqCst), 1);
}

// == Loading Cache End To End ==

#[tokio::test]
async fn loading_cache_round_trip_with_invalidation() {
    let repository_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&repository_calls);

    let cache = LoadingCache::new(
        CacheStore::new("books", &bounded(10)).unwrap(),
        move |key: String| {
            let calls = Arc::clone(&calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(format!("book {key}"))
            }
        },
    );

    assert_eq!(cache.get("1").await.unwrap(), "book 1");
    assert_eq!(cache.get("1").await.unwrap(), "book 1");
    assert_eq!(repository_calls.load(Ordering::SeqCst), 1);

    cache.invalidate("1").await;
    assert_eq!(cache.get("1").await.unwrap(), "book 1");
    assert_eq!(repository_calls.load(Ordering::SeqCst), 2);

    let stats = cache.stats().await;
    assert_eq!(stats.loads, 2);
    assert_eq!(stats.hits, 1);
}
