//! Periodic sync task with an explicit start/stop lifecycle.
//!
//! # Responsibility
//! - Re-run [`Reconciler::sync`] on a fixed interval on the tokio runtime.
//! - Expose a handle that stops the task and reports how many cycles ran.
//!
//! # Invariants
//! - The first cycle runs immediately after start.
//! - No backoff or jitter: failures are logged and retried next tick.
//! - An in-flight cycle always completes before the task observes a stop.
//! - Dropping the handle stops the task after its current cycle.

use super::reconciler::{Reconciler, SyncError};
use super::remote::RemoteStore;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;

/// Default delay between two sync cycles.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(30);

/// Counters reported when the scheduler stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    pub cycles: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Ticks skipped because a manual sync was already in flight.
    pub skipped: u64,
}

/// Handle to a running periodic sync task.
pub struct SyncHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<SchedulerStats>,
}

impl SyncHandle {
    /// Returns whether the background task is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Signals the task to stop and waits for it to finish.
    pub async fn stop(self) -> Result<SchedulerStats, JoinError> {
        let _ = self.stop_tx.send(true);
        self.task.await
    }
}

/// Spawns periodic sync tasks.
pub struct SyncScheduler;

impl SyncScheduler {
    /// Starts calling `reconciler.sync()` every `interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<R>(reconciler: Arc<Reconciler<R>>, interval: Duration) -> SyncHandle
    where
        R: RemoteStore + 'static,
    {
        let (stop_tx, stop_rx) = watch::channel(false);
        let interval = interval.max(Duration::from_millis(1));
        let task = tokio::spawn(run(reconciler, interval, stop_rx));
        info!(
            "event=scheduler_start module=sync status=ok interval_ms={}",
            interval.as_millis()
        );
        SyncHandle { stop_tx, task }
    }
}

async fn run<R>(
    reconciler: Arc<Reconciler<R>>,
    interval: Duration,
    mut stop_rx: watch::Receiver<bool>,
) -> SchedulerStats
where
    R: RemoteStore + 'static,
{
    let mut stats = SchedulerStats::default();
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            changed = stop_rx.changed() => {
                // Err means every handle is gone.
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                stats.cycles += 1;
                match reconciler.sync().await {
                    Ok(_) => stats.succeeded += 1,
                    Err(SyncError::AlreadyRunning) => stats.skipped += 1,
                    Err(err) => {
                        stats.failed += 1;
                        warn!("event=scheduler_tick module=sync status=error cycle={} error={}", stats.cycles, err);
                    }
                }
            }
        }
    }

    info!(
        "event=scheduler_stop module=sync status=ok cycles={} succeeded={} failed={} skipped={}",
        stats.cycles, stats.succeeded, stats.failed, stats.skipped
    );
    stats
}
