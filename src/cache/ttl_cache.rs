//! TTL Cache Module
//!
//! Thread-safe cache handle owning the store and its background reaper.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::info;

use crate::cache::{SharedStore, Store};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{spawn_reaper, ReaperHandle};

// == TTL Cache ==
/// Concurrency-safe LRU cache whose entries expire after an idle TTL.
///
/// All reads and writes go through one lock around the store. A `get` that
/// finds an entry idle for at least the TTL drops it and misses, whether or
/// not the reaper is running; the reaper only reclaims entries nobody reads.
///
/// Dropping the cache stops its reaper.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    store: SharedStore<K, V>,
    reaper: Mutex<Option<ReaperHandle>>,
    sweep_interval: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its reaper.
    ///
    /// # Errors
    /// Returns a configuration error when `capacity`, `ttl` or
    /// `sweep_interval` is zero.
    ///
    /// # Panics
    /// Panics when called outside of a Tokio runtime.
    pub fn new(capacity: usize, ttl: Duration, sweep_interval: Duration) -> Result<Self> {
        Self::from_config(&CacheConfig::new(capacity, ttl, sweep_interval))
    }

    /// Creates a cache from a [`CacheConfig`] and starts its reaper.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(Mutex::new(Store::new(config.capacity, config.ttl)?));
        let reaper = spawn_reaper(Arc::clone(&store), config.sweep_interval);

        info!(
            "TTL cache created: capacity={}, ttl={}ms, sweep_interval={}ms",
            config.capacity,
            config.ttl.as_millis(),
            config.sweep_interval.as_millis()
        );

        Ok(Self {
            store,
            reaper: Mutex::new(Some(reaper)),
            sweep_interval: config.sweep_interval,
        })
    }

    // == Get ==
    /// Returns a clone of the value for `key` and marks it most recently used.
    ///
    /// Absent and expired keys both return None.
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: Clone,
    {
        let mut store = self.store.lock().await;
        store.get(key, Instant::now()).cloned()
    }

    // == Put ==
    /// Inserts or replaces the value for `key`, evicting the least recently
    /// used entry when a new key arrives at capacity.
    pub async fn put(&self, key: K, value: V) {
        let mut store = self.store.lock().await;
        store.put(key, value, Instant::now());
    }

    // == Remove ==
    /// Removes `key`, returning its value if it was present.
    pub async fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.remove(key)
    }

    /// Checks for a live entry without refreshing its recency.
    pub async fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.lock().await.contains_key(key, Instant::now())
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.store.lock().await.clear();
    }

    /// Keys from most to least recently used.
    pub async fn keys(&self) -> Vec<K> {
        self.store.lock().await.keys()
    }

    /// Number of entries held, expired ones included until reaped or read.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.lock().await.is_empty()
    }

    // == Purge Expired ==
    /// Sweeps the whole store now, without a time budget.
    ///
    /// Returns the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.lock().await;
        store.sweep_expired(now, || true).removed
    }

    // == Pause Cleaning ==
    /// Stops the reaper. Does nothing if it is already stopped.
    ///
    /// Expired entries are still dropped when read.
    pub async fn pause_cleaning(&self) {
        let mut reaper = self.reaper.lock().await;
        if let Some(handle) = reaper.take() {
            handle.cancel();
            info!("TTL cleaning paused");
        }
    }

    // == Resume Cleaning ==
    /// Starts a fresh reaper. Does nothing if one is already running.
    pub async fn resume_cleaning(&self) {
        let mut reaper = self.reaper.lock().await;
        if reaper.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return;
        }
        *reaper = Some(spawn_reaper(Arc::clone(&self.store), self.sweep_interval));
        info!("TTL cleaning resumed");
    }

    /// Returns true while the reaper is scheduled.
    pub async fn is_cleaning(&self) -> bool {
        self.reaper
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Maximum number of entries held before eviction.
    pub async fn capacity(&self) -> usize {
        self.store.lock().await.capacity()
    }

    /// Idle age at which an entry expires.
    pub async fn ttl(&self) -> Duration {
        self.store.lock().await.ttl()
    }

    /// Period between reaper sweeps, as configured.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    #[cfg(test)]
    pub(crate) async fn assert_consistent(&self) {
        self.store.lock().await.assert_consistent();
    }
}

impl<K, V> Drop for TtlCache<K, V> {
    fn drop(&mut self) {
        if let Some(handle) = self.reaper.get_mut().take() {
            handle.cancel();
        }
    }
}
