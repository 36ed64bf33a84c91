//! Scheduler task that owns the sync engine.
//!
//! A single spawned task drives the initial fetch, the fixed one-second tick
//! and the optional periodic re-sync. All three are branches of one
//! `select!` loop, so they never run concurrently with each other or with the
//! update callback.
//!
//! # Lifecycle
//!
//! 1. `ClockTask::spawn` publishes the initial (unsynchronized) status and
//!    starts the first fetch
//! 2. Every tick calls `ClockSyncEngine::tick` and publishes the new status
//! 3. If a re-sync interval is configured, a new fetch starts each interval
//!    unless one is already in flight
//! 4. `ClockTask::cancel` (or dropping the handle) aborts the task and
//!    releases its timers

use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior, interval_at};

use super::engine::{ClockSyncEngine, SyncStatus, TICK_INTERVAL_MS};
use crate::time::{LocalClock, SyncError, TimePayload, TimeSource};

/// Configuration for the clock task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTaskConfig {
    /// Upper bound on a single fetch.
    pub fetch_timeout: Duration,
    /// Interval between re-syncs. `None` syncs exactly once per session.
    pub resync_interval: Option<Duration>,
}

impl ClockTaskConfig {
    /// Default bound on a single fetch.
    pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);
}

impl Default for ClockTaskConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Self::DEFAULT_FETCH_TIMEOUT,
            resync_interval: None,
        }
    }
}

/// Handle to a running clock task.
///
/// The task is aborted when the handle is cancelled or dropped, whichever
/// comes first.
#[derive(Debug)]
pub struct ClockTask {
    handle: Option<JoinHandle<()>>,
}

impl ClockTask {
    /// Spawn the clock task on the current tokio runtime.
    ///
    /// `on_update` receives the engine status after every step, in order. It
    /// runs inside the task, so a step is never started before the previous
    /// update has returned.
    pub fn spawn<C, S, F>(
        engine: ClockSyncEngine<C>,
        source: S,
        config: ClockTaskConfig,
        on_update: F,
    ) -> Self
    where
        C: LocalClock + Send + 'static,
        S: TimeSource + Send + Sync + 'static,
        F: FnMut(SyncStatus) + Send + 'static,
    {
        let handle = tokio::spawn(run(engine, source, config, on_update));
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the task and release its timers.
    ///
    /// Returns `true` if this call stopped the task, `false` if it had
    /// already been cancelled. Safe to call any number of times.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                tracing::debug!("clock task cancelled");
                true
            }
            None => false,
        }
    }

    /// Check if the task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for ClockTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn periodic(period: Duration) -> Interval {
    let mut interval = interval_at(tokio::time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

fn fetch_with_timeout<S: TimeSource + Sync>(
    source: &S,
    timeout: Duration,
) -> BoxFuture<'_, Result<TimePayload, SyncError>> {
    async move {
        tokio::time::timeout(timeout, source.fetch())
            .await
            .unwrap_or(Err(SyncError::Timeout(timeout)))
    }
    .boxed()
}

/// The task body. Runs until aborted.
async fn run<C, S, F>(
    mut engine: ClockSyncEngine<C>,
    source: S,
    config: ClockTaskConfig,
    mut on_update: F,
) where
    C: LocalClock,
    S: TimeSource + Sync,
    F: FnMut(SyncStatus),
{
    on_update(engine.status());

    let mut ticker = periodic(Duration::from_millis(TICK_INTERVAL_MS));
    let mut resync = config.resync_interval.map(periodic);
    let mut in_flight = Some(fetch_with_timeout(&source, config.fetch_timeout));

    loop {
        tokio::select! {
            result = async {
                match in_flight.as_mut() {
                    Some(fetch) => fetch.await,
                    None => std::future::pending().await,
                }
            } => {
                in_flight = None;
                // Failures are logged by the engine and leave its state alone.
                let _ = engine.complete_sync(result);
                on_update(engine.status());
            }

            _ = ticker.tick() => {
                engine.tick();
                on_update(engine.status());
            }

            () = async {
                match resync.as_mut() {
                    Some(interval) => {
                        interval.tick().await;
                    }
                    None => std::future::pending().await,
                }
            }, if in_flight.is_none() => {
                tracing::debug!("starting periodic re-sync");
                in_flight = Some(fetch_with_timeout(&source, config.fetch_timeout));
            }
        }
    }
}
