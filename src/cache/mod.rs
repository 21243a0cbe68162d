//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod store;
mod ttl_cache;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::{RecencyIter, RecencyList};
pub use store::{Store, SweepReport};
pub use ttl_cache::TtlCache;

/// Store shared between foreground callers and the reaper.
pub type SharedStore<K, V> = std::sync::Arc<tokio::sync::Mutex<Store<K, V>>>;
