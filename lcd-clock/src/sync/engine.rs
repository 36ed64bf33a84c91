//! Client-side clock synchronization engine.
//!
//! The engine fetches an authoritative instant once and then extrapolates
//! locally, one fixed step per tick, without re-querying the source.
//!
//! # Usage
//!
//! ```
//! use lcd_clock::simulation::{ScriptedTimeSource, SimulatedClock};
//! use lcd_clock::sync::ClockSyncEngine;
//!
//! let runtime = tokio::runtime::Runtime::new().unwrap();
//! runtime.block_on(async {
//!     let source = ScriptedTimeSource::new().with_instant(1_000_000);
//!     let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
//!
//!     engine.initialize(&source).await.unwrap();
//!     assert_eq!(engine.tick().map(|t| t.epoch_millis()), Some(1_001_000));
//! });
//! ```
//!
//! # Guarantees
//!
//! - Ticks before the first successful fetch are no-ops
//! - After a sync at `T`, `N` ticks yield exactly `T + N * 1000ms`, no matter
//!   how much local time actually elapsed between them
//! - Once synchronized the engine never becomes unsynchronized again

use crate::time::{Instant, LocalClock, SyncError, TimePayload, TimeSource};

/// Fixed amount of authoritative time added by every tick.
pub const TICK_INTERVAL_MS: u64 = 1_000;

/// What the engine currently knows about authoritative time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No fetch has succeeded yet.
    Unsynchronized,
    /// The current estimate of authoritative time.
    Synchronized(Instant),
}

impl SyncStatus {
    /// The current instant, if synchronized.
    #[must_use]
    pub const fn instant(self) -> Option<Instant> {
        match self {
            Self::Unsynchronized => None,
            Self::Synchronized(instant) => Some(instant),
        }
    }
}

/// Reference point for extrapolation.
#[derive(Debug, Clone, Copy, Default)]
struct SyncState {
    /// Rebased on every tick; replaced on every successful fetch.
    last_fetched_instant: Option<Instant>,
    /// Local clock reading taken when the last fetch was received.
    last_fetch_local_ms: Option<u64>,
}

/// Clock synchronization engine.
///
/// Generic over a `LocalClock` so tests can control the readings recorded at
/// fetch time.
#[derive(Debug)]
pub struct ClockSyncEngine<C: LocalClock> {
    local_clock: C,
    state: SyncState,
    successful_syncs: u64,
}

impl<C: LocalClock> ClockSyncEngine<C> {
    /// Create an unsynchronized engine.
    #[must_use]
    pub fn new(local_clock: C) -> Self {
        Self {
            local_clock,
            state: SyncState::default(),
            successful_syncs: 0,
        }
    }

    /// Fetch from the time source once and apply the result.
    ///
    /// On failure the state is left untouched; there is no retry and no
    /// fallback to the local system clock.
    ///
    /// # Errors
    ///
    /// Returns the `SyncError` reported by the source.
    pub async fn initialize<S: TimeSource>(&mut self, source: &S) -> Result<Instant, SyncError> {
        let result = source.fetch().await;
        self.complete_sync(result)
    }

    /// Apply the result of a fetch started elsewhere.
    ///
    /// A successful result replaces the reference instant, including when the
    /// engine is already synchronized (re-sync). A failed re-sync keeps the
    /// current estimate.
    ///
    /// # Errors
    ///
    /// Returns the fetch error, or `SyncError::InvalidPayload` if the payload
    /// carries an unrepresentable instant.
    pub fn complete_sync(
        &mut self,
        result: Result<TimePayload, SyncError>,
    ) -> Result<Instant, SyncError> {
        match result.and_then(|payload| payload.instant()) {
            Ok(instant) => {
                let local_ms = self.local_clock.now_ms();
                self.state = SyncState {
                    last_fetched_instant: Some(instant),
                    last_fetch_local_ms: Some(local_ms),
                };
                self.successful_syncs = self.successful_syncs.saturating_add(1);
                tracing::info!(%instant, local_ms, "synchronized with time source");
                Ok(instant)
            }
            Err(e) => {
                if self.is_synchronized() {
                    tracing::warn!("re-sync failed, keeping current estimate: {e}");
                } else {
                    tracing::warn!("failed to fetch time from server: {e}");
                }
                Err(e)
            }
        }
    }

    /// Advance the estimate by one tick.
    ///
    /// Returns `None` while unsynchronized. Otherwise rebases the reference
    /// instant to `reference + TICK_INTERVAL_MS` and returns it. Elapsed local
    /// time is never consulted, so timer skew accumulates until the next sync.
    pub fn tick(&mut self) -> Option<Instant> {
        let next = self.state.last_fetched_instant?.plus_millis(TICK_INTERVAL_MS);
        self.state.last_fetched_instant = Some(next);
        Some(next)
    }

    /// The current estimate of authoritative time.
    #[must_use]
    pub const fn current(&self) -> Option<Instant> {
        self.state.last_fetched_instant
    }

    /// The current estimate as a status.
    #[must_use]
    pub const fn status(&self) -> SyncStatus {
        match self.state.last_fetched_instant {
            Some(instant) => SyncStatus::Synchronized(instant),
            None => SyncStatus::Unsynchronized,
        }
    }

    #[must_use]
    pub const fn is_synchronized(&self) -> bool {
        self.state.last_fetched_instant.is_some()
    }

    /// Local clock reading taken when the last successful fetch was received.
    #[must_use]
    pub const fn last_fetch_local_ms(&self) -> Option<u64> {
        self.state.last_fetch_local_ms
    }

    /// Number of fetches that have been applied successfully.
    #[must_use]
    pub const fn successful_syncs(&self) -> u64 {
        self.successful_syncs
    }

    /// Get a reference to the local clock.
    #[must_use]
    pub const fn local_clock(&self) -> &C {
        &self.local_clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{ScriptedTimeSource, SimulatedClock};

    const T: i64 = 1_709_644_029_000;

    #[test]
    fn test_tick_before_sync_is_noop() {
        let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));

        assert_eq!(engine.tick(), None);
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.status(), SyncStatus::Unsynchronized);
        assert_eq!(engine.current(), None);
    }

    #[tokio::test]
    async fn test_initialize_success_records_local_reading() {
        let clock = SimulatedClock::new(5_000);
        let source = ScriptedTimeSource::new().with_instant(T);
        let mut engine = ClockSyncEngine::new(clock);

        let instant = engine.initialize(&source).await.expect("sync succeeds");

        assert_eq!(instant, Instant::from_epoch_millis(T));
        assert_eq!(engine.status(), SyncStatus::Synchronized(instant));
        assert_eq!(engine.last_fetch_local_ms(), Some(5_000));
        assert_eq!(engine.successful_syncs(), 1);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_initialize_failure_stays_unsynchronized() {
        let source = ScriptedTimeSource::new()
            .with_error(SyncError::Unavailable("connection refused".to_string()));
        let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));

        let result = engine.initialize(&source).await;

        assert!(matches!(result, Err(SyncError::Unavailable(_))));
        assert!(!engine.is_synchronized());
        assert_eq!(engine.last_fetch_local_ms(), None);
        assert_eq!(engine.tick(), None);
    }

    #[tokio::test]
    async fn test_n_ticks_advance_exactly_n_seconds() {
        let clock = SimulatedClock::new(0);
        let source = ScriptedTimeSource::new().with_instant(T);
        let mut engine = ClockSyncEngine::new(clock);
        engine.initialize(&source).await.expect("sync succeeds");

        for n in 1..=10_i64 {
            let instant = engine.tick().expect("synchronized");
            assert_eq!(instant.epoch_millis(), T + n * 1_000);
        }
        assert_eq!(engine.current(), Some(Instant::from_epoch_millis(T + 10_000)));
    }

    #[tokio::test]
    async fn test_tick_ignores_elapsed_local_time() {
        let clock = std::sync::Arc::new(SimulatedClock::new(0));
        let source = ScriptedTimeSource::new().with_instant(T);
        let mut engine = ClockSyncEngine::new(std::sync::Arc::clone(&clock));
        engine.initialize(&source).await.expect("sync succeeds");

        // Local timer firing late and early must not change the step size.
        clock.advance(1_700);
        assert_eq!(engine.tick(), Some(Instant::from_epoch_millis(T + 1_000)));
        clock.advance(300);
        assert_eq!(engine.tick(), Some(Instant::from_epoch_millis(T + 2_000)));
        clock.advance(60_000);
        assert_eq!(engine.tick(), Some(Instant::from_epoch_millis(T + 3_000)));
    }

    #[tokio::test]
    async fn test_resync_replaces_reference() {
        let source = ScriptedTimeSource::new()
            .with_instant(T)
            .with_instant(T + 60_000);
        let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));

        engine.initialize(&source).await.expect("first sync");
        engine.tick();
        engine.tick();
        engine.initialize(&source).await.expect("second sync");

        assert_eq!(engine.current(), Some(Instant::from_epoch_millis(T + 60_000)));
        assert_eq!(engine.tick(), Some(Instant::from_epoch_millis(T + 61_000)));
        assert_eq!(engine.successful_syncs(), 2);
    }

    #[test]
    fn test_failed_resync_keeps_estimate() {
        let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
        engine
            .complete_sync(Ok(TimePayload::for_instant(Instant::from_epoch_millis(T), 0)))
            .expect("first sync");
        engine.tick();

        let result = engine.complete_sync(Err(SyncError::Timeout(
            std::time::Duration::from_secs(5),
        )));

        assert!(result.is_err());
        assert_eq!(
            engine.status(),
            SyncStatus::Synchronized(Instant::from_epoch_millis(T + 1_000))
        );
    }

    #[test]
    fn test_out_of_range_payload_is_rejected() {
        let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
        let payload = TimePayload {
            iso: None,
            unix: i64::MIN,
            timezone_offset: None,
        };

        let result = engine.complete_sync(Ok(payload));

        assert!(matches!(result, Err(SyncError::InvalidPayload(_))));
        assert!(!engine.is_synchronized());
    }

    #[test]
    fn test_status_instant() {
        let instant = Instant::from_epoch_millis(T);
        assert_eq!(SyncStatus::Synchronized(instant).instant(), Some(instant));
        assert_eq!(SyncStatus::Unsynchronized.instant(), None);
    }
}
