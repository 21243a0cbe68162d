//! TTL Reaper Task
//!
//! Background task that periodically removes cache entries idle past their TTL.

use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cache::{SharedStore, SweepReport};

/// Shortest period the reaper will tick at.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Longest period the reaper will tick at, roughly 30 years.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(86400 * 365 * 30);

// == Reaper Handle ==
/// Handle to a running reaper task.
///
/// Each handle owns a fresh stop channel. Dropping the handle closes the
/// channel, which also stops the task.
#[derive(Debug)]
pub struct ReaperHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signals the task to stop. A sweep already in progress finishes the
    /// entry it is evaluating and then returns.
    pub fn cancel(&self) {
        self.stop.send_replace(true);
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the task to exit.
    pub async fn join(self) {
        if let Err(err) = self.task.await {
            warn!(error = %err, "Reaper task ended abnormally");
        }
    }
}

/// Spawns a background task that periodically reaps expired cache entries.
///
/// The first sweep runs one `interval` after the spawn. Ticks missed while a
/// sweep is running are not replayed. `interval` is clamped to
/// [`MIN_SWEEP_INTERVAL`]..=[`MAX_SWEEP_INTERVAL`].
///
/// # Arguments
/// * `store` - Store shared with the owning cache
/// * `interval` - Time between sweeps, also the time budget of each sweep
///
/// # Panics
/// Panics when called outside of a Tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(Store::new(1000, Duration::from_secs(300))?));
/// let reaper = spawn_reaper(store.clone(), Duration::from_secs(10));
/// // Later:
/// reaper.cancel();
/// ```
pub fn spawn_reaper<K, V>(store: SharedStore<K, V>, interval: Duration) -> ReaperHandle
where
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
{
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let interval = clamp_interval(interval);

    let task = tokio::spawn(async move {
        info!(
            "Starting TTL reaper with interval of {} ms",
            interval.as_millis()
        );

        let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                // Fires on cancel and when the handle is dropped
                _ = stop_rx.changed() => break,
            }
            let stopped = *stop_rx.borrow();
            if stopped {
                break;
            }

            sweep_once(&store, interval, &stop_rx).await;
        }

        info!("TTL reaper stopped");
    });

    ReaperHandle {
        stop: stop_tx,
        task,
    }
}

/// Runs a single sweep against one `now` snapshot.
///
/// Gives up without sweeping when the store lock is not acquired within
/// `budget`, and stops scanning once `budget` has elapsed since the
/// snapshot or `stop` turns true. Returns None when the sweep was skipped.
pub async fn sweep_once<K, V>(
    store: &SharedStore<K, V>,
    budget: Duration,
    stop: &watch::Receiver<bool>,
) -> Option<SweepReport>
where
    K: Hash + Eq + Clone,
{
    let now = Instant::now();
    sweep_once_until(store, now, now.checked_add(budget), stop).await
}

/// Runs a single sweep against `now`, bounded by an absolute `deadline`.
///
/// A `None` deadline means the sweep has no time budget: it waits for the
/// lock and scans until done or stopped.
pub async fn sweep_once_until<K, V>(
    store: &SharedStore<K, V>,
    now: Instant,
    deadline: Option<Instant>,
    stop: &watch::Receiver<bool>,
) -> Option<SweepReport>
where
    K: Hash + Eq + Clone,
{
    let mut guard = match deadline {
        Some(deadline) => {
            match time::timeout_at(time::Instant::from_std(deadline), store.lock()).await {
                Ok(guard) => guard,
                Err(_) => {
                    debug!("TTL reaper: store busy, skipping sweep");
                    return None;
                }
            }
        }
        None => store.lock().await,
    };
    let report = guard.sweep_expired(now, || {
        !*stop.borrow() && deadline.map_or(true, |deadline| Instant::now() < deadline)
    });
    drop(guard);

    if !report.completed {
        debug!(
            "TTL reaper: sweep cut short after {} entries, {} removed",
            report.scanned, report.removed
        );
    } else if report.removed > 0 {
        info!("TTL reaper: removed {} expired entries", report.removed);
    } else {
        debug!("TTL reaper: no expired entries found");
    }

    Some(report)
}

fn clamp_interval(interval: Duration) -> Duration {
    let clamped = interval.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
    if clamped != interval {
        warn!(
            "TTL reaper: sweep interval {:?} out of range, using {:?}",
            interval, clamped
        );
    }
    clamped
}
