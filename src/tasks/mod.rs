//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - Reaper: Removes entries idle past their TTL at a fixed interval

mod reaper;

pub use reaper::{
    spawn_reaper, sweep_once, sweep_once_until, ReaperHandle, MAX_SWEEP_INTERVAL,
    MIN_SWEEP_INTERVAL,
};
