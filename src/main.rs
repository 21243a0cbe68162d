//! TTL LRU - demo walkthrough
//!
//! Fills a small cache, shows LRU eviction and TTL expiry, then toggles the
//! background reaper. Configuration comes from `CACHE_*` environment variables.

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_lru::{CacheConfig, TtlCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CacheConfig::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}s, sweep_interval={}s",
        config.capacity,
        config.ttl.as_secs(),
        config.sweep_interval.as_secs()
    );

    let cache: TtlCache<String, String> =
        TtlCache::from_config(&config).context("invalid cache configuration")?;

    cache.put("foo".to_string(), "bar".to_string()).await;
    for i in 0..config.capacity {
        let key = if i == 0 {
            "john".to_string()
        } else {
            format!("john{i}")
        };
        cache.put(key, "doe".to_string()).await;
    }
    info!("Filled cache: {} entries", cache.len().await);

    // foo was the least recently used key when the cache overflowed
    info!("get(foo) = {:?}", cache.get("foo").await);
    info!("get(john1) = {:?}", cache.get("john1").await);

    cache.put("city".to_string(), "Blore".to_string()).await;
    info!("Most recent keys: {:?}", cache.keys().await.iter().take(3).collect::<Vec<_>>());

    cache.pause_cleaning().await;
    info!("Reaper running: {}", cache.is_cleaning().await);

    let wait = config.ttl + Duration::from_secs(1);
    info!("Sleeping {}s to let entries expire", wait.as_secs());
    tokio::time::sleep(wait).await;

    // Expiry on read does not depend on the reaper
    info!("get(city) = {:?}", cache.get("city").await);
    info!("Purged {} expired entries", cache.purge_expired().await);

    cache.resume_cleaning().await;
    info!("Reaper running: {}", cache.is_cleaning().await);

    info!("Demo complete");
    Ok(())
}
