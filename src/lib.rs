//! TTL LRU - A concurrency-safe in-memory cache
//!
//! Provides LRU eviction bounded by capacity, idle-age (TTL) expiration, and a
//! background reaper that can be paused and resumed.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::TtlCache;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
