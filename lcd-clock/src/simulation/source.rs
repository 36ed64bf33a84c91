//! Time sources for deterministic testing.
//!
//! - [`ScriptedTimeSource`] replays a fixed list of responses in order
//! - [`SimulatedTimeSource`] derives authoritative time from a local clock and
//!   injects failures from a seeded RNG, so a given seed always produces the
//!   same sequence of successes and faults

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::time::{Instant, LocalClock, SyncError, TimePayload, TimeSource};

/// A time source that replays scripted responses.
///
/// Once the script is exhausted every fetch fails with
/// `SyncError::Unavailable`.
#[derive(Debug, Default)]
pub struct ScriptedTimeSource {
    script: Mutex<VecDeque<Result<TimePayload, SyncError>>>,
    /// Simulated response latency, applied with `tokio::time::sleep`.
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a successful response carrying the given instant.
    #[must_use]
    pub fn with_instant(mut self, epoch_ms: i64) -> Self {
        let payload = TimePayload::for_instant(Instant::from_epoch_millis(epoch_ms), 0);
        if let Ok(script) = self.script.get_mut() {
            script.push_back(Ok(payload));
        }
        self
    }

    /// Append a failed response.
    #[must_use]
    pub fn with_error(mut self, error: SyncError) -> Self {
        if let Ok(script) = self.script.get_mut() {
            script.push_back(Err(error));
        }
        self
    }

    /// Delay every response by the given duration.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Result<TimePayload, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Ok(mut script) = self.script.lock() else {
            return Err(SyncError::Unavailable("script lock poisoned".to_string()));
        };
        script
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Unavailable("script exhausted".to_string())))
    }
}

impl TimeSource for ScriptedTimeSource {
    fn fetch(&self) -> impl Future<Output = Result<TimePayload, SyncError>> + Send {
        let response = self.next_response();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            response
        }
    }
}

/// A time source backed by a simulated clock, with seeded fault injection.
///
/// Authoritative time is `epoch_offset_ms + clock.now_ms()`.
#[derive(Debug)]
pub struct SimulatedTimeSource<C: LocalClock> {
    clock: C,
    epoch_offset_ms: i64,
    /// Probability of a fetch failing (0.0 - 1.0).
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl<C: LocalClock> SimulatedTimeSource<C> {
    /// Create a source that never fails.
    #[must_use]
    pub fn new(seed: u64, clock: C, epoch_offset_ms: i64) -> Self {
        Self {
            clock,
            epoch_offset_ms,
            failure_rate: 0.0,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Set the probability of a fetch failing. Clamped to `0.0..=1.0`.
    #[must_use]
    pub const fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// The instant this source would report right now.
    #[must_use]
    pub fn authoritative_now(&self) -> Instant {
        Instant::from_epoch_millis(self.epoch_offset_ms).plus_millis(self.clock.now_ms())
    }

    fn next_response(&self) -> Result<TimePayload, SyncError> {
        let Ok(mut rng) = self.rng.lock() else {
            return Err(SyncError::Unavailable("rng lock poisoned".to_string()));
        };
        if rng.random_bool(self.failure_rate) {
            return Err(SyncError::Unavailable("simulated fault".to_string()));
        }
        Ok(TimePayload::for_instant(self.authoritative_now(), 0))
    }
}

impl<C: LocalClock + Sync> TimeSource for SimulatedTimeSource<C> {
    fn fetch(&self) -> impl Future<Output = Result<TimePayload, SyncError>> + Send {
        std::future::ready(self.next_response())
    }
}
