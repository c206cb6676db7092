//! loadcache demo
//!
//! Walks through the library's caching patterns against a simulated slow
//! repository: cold vs. warm read-through timings, a self-loading cache,
//! conditional caching, invalidation, named-cache isolation and statistics
//! reporting.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loadcache::{
    spawn_sweep_task, CacheConfig, CacheManager, CacheStore, DelimitedKeyStrategy, KeyStrategy,
    LoadFailure, LoadingCache, TimeBucketKeyStrategy,
};

/// Demo value type standing in for a persisted entity.
#[derive(Debug, Clone, Serialize, PartialEq)]
struct Product {
    id: u64,
    name: String,
    price: f64,
}

/// Simulated slow repository lookup.
async fn fetch_product(id: u64) -> Result<Product, LoadFailure> {
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(Product {
        id,
        name: format!("Product #{id}"),
        price: 9.99 * id as f64,
    })
}

async fn timed_read_through(store: &CacheStore<Product>, key: &str, id: u64) -> Product {
    let started = Instant::now();
    let product = store
        .get_or_load(key, move |_| fetch_product(id))
        .await
        .expect("demo loader never fails");
    info!(key, elapsed_ms = started.elapsed().as_millis() as u64, "read-through completed");
    product
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter.
    // Defaults to "info" level, can be overridden with RUST_LOG env var.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let manager: CacheManager<Product> = CacheManager::new();
    let keys = DelimitedKeyStrategy::default();

    // -- Bounded cache: cold load, then warm hit --
    let products = manager
        .get_or_create("products", &CacheConfig::from_env())
        .await?;

    info!("first request (cold, goes to the repository)");
    let key = keys.derive("get_product", &[Some("1")]);
    let cold = timed_read_through(&products, &key, 1).await;

    info!("second request (warm, served from cache)");
    let warm = timed_read_through(&products, &key, 1).await;
    assert_eq!(cold, warm);

    // -- Expiring cache: entries go stale after the TTL --
    let sweep_interval = CacheConfig::from_env()
        .sweep_interval
        .unwrap_or(Duration::from_millis(100));
    let hot = manager
        .get_or_create(
            "hot_products",
            &CacheConfig::bounded(100)
                .with_ttl(Duration::from_millis(300))
                .with_sweep_interval(sweep_interval),
        )
        .await?;
    // Active sweeping evicts stale entries between reads.
    let sweeper = spawn_sweep_task(hot.clone(), sweep_interval);
    let hot_key = keys.derive("get_hot_product", &[Some("2")]);
    timed_read_through(&hot, &hot_key, 2).await;
    tokio::time::sleep(Duration::from_millis(350)).await;
    info!("request after TTL elapsed (reloads)");
    timed_read_through(&hot, &hot_key, 2).await;

    // -- Time-bucketed keys: periodic refresh without a TTL --
    let bucketed =
        TimeBucketKeyStrategy::new(DelimitedKeyStrategy::default(), Duration::from_secs(3600));
    let report_key = bucketed.derive("top_sellers", &[Some("electronics")]);
    info!(key = %report_key, "hourly report key (new bucket forces a reload next hour)");
    timed_read_through(&products, &report_key, 4).await;

    // -- Self-loading cache: the loader is bound once --
    let loading = LoadingCache::new(
        CacheStore::new("books", &CacheConfig::bounded(100))?,
        |key: String| async move {
            let id: u64 = key.parse().map_err(|e| Box::new(e) as LoadFailure)?;
            fetch_product(id).await
        },
    );
    info!("loading cache: first get");
    let book = loading.get("3").await?;
    info!(name = %book.name, "loaded");
    info!("loading cache: second get (cached)");
    loading.get("3").await?;

    // -- Conditional caching: expensive items are never cached --
    let pricey = products
        .get_or_load_with(
            &keys.derive("get_product", &[Some("500")]),
            move |_| fetch_product(500),
            |_, product: &Product| product.price <= 1000.0,
        )
        .await?;
    info!(price = pricey.price, "loaded but not cached (price above threshold)");

    // -- Invalidation and isolation --
    info!("invalidating product 1; hot_products is unaffected");
    products.invalidate(&key).await;
    manager.clear("products").await?;

    // -- Stats reporting --
    for (name, stats) in manager.stats_all().await {
        info!(cache = %name, stats = %serde_json::to_string(&stats)?, "cache statistics");
    }

    sweeper.abort();
    Ok(())
}
