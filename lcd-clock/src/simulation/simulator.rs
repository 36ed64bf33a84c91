//! Main simulator harness for deterministic simulation testing.
//!
//! Drives a `ClockSyncEngine` through a seeded sequence of jittered ticks and
//! flaky sync attempts, checking the engine's invariants after every step.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::clock::SimulatedClock;
use super::source::SimulatedTimeSource;
use crate::sync::{ClockSyncEngine, SyncStatus, TICK_INTERVAL_MS};
use crate::time::Instant;

/// Largest deviation of the simulated timer from its nominal period.
const MAX_JITTER_MS: u64 = 400;

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of ticks delivered to the engine.
    pub ticks: u64,
    /// Number of fetches attempted, including the initial one.
    pub sync_attempts: u64,
    /// Number of fetches that succeeded.
    pub successful_syncs: u64,
    /// Invariant violations detected.
    pub violations: Vec<String>,
}

impl SimulationResult {
    /// Check if the simulation passed (no invariant violations).
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Deterministic simulator for the sync engine.
pub struct Simulator {
    seed: u64,
    rng: StdRng,
    clock: Arc<SimulatedClock>,
    source: SimulatedTimeSource<Arc<SimulatedClock>>,
    engine: ClockSyncEngine<Arc<SimulatedClock>>,
    /// Probability of a re-sync attempt before any given tick.
    resync_rate: f64,
}

impl Simulator {
    /// Create a simulator whose time source reports
    /// `epoch_offset_ms + clock reading`.
    #[must_use]
    pub fn new(seed: u64, clock: SimulatedClock, epoch_offset_ms: i64) -> Self {
        let clock = Arc::new(clock);
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
            source: SimulatedTimeSource::new(seed, Arc::clone(&clock), epoch_offset_ms),
            engine: ClockSyncEngine::new(Arc::clone(&clock)),
            clock,
            resync_rate: 0.0,
        }
    }

    /// Set the probability of each fetch failing.
    #[must_use]
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.source = self.source.with_failure_rate(rate);
        self
    }

    /// Set the probability of a re-sync attempt before each tick.
    #[must_use]
    pub const fn with_resync_rate(mut self, rate: f64) -> Self {
        self.resync_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Run an initial sync followed by `ticks` jittered ticks.
    pub fn run(&mut self, ticks: u64) -> SimulationResult {
        let mut result = SimulationResult {
            seed: self.seed,
            ticks: 0,
            sync_attempts: 0,
            successful_syncs: 0,
            violations: Vec::new(),
        };

        // Reference instant of the last successful sync and ticks since then.
        let mut anchor: Option<(Instant, u64)> = None;
        self.attempt_sync(&mut result, &mut anchor);

        for _ in 0..ticks {
            if anchor.is_some() && self.rng.random_bool(self.resync_rate) {
                self.attempt_sync(&mut result, &mut anchor);
            }

            let jitter = self.rng.random_range(0..=2 * MAX_JITTER_MS);
            self.clock
                .advance(TICK_INTERVAL_MS - MAX_JITTER_MS + jitter);

            let was_synchronized = self.engine.is_synchronized();
            let ticked = self.engine.tick();
            result.ticks += 1;

            match (&mut anchor, ticked) {
                (None, None) => {}
                (None, Some(instant)) => result
                    .violations
                    .push(format!("tick produced {instant} before any sync")),
                (Some(_), None) => result
                    .violations
                    .push("synchronized engine produced no instant".to_string()),
                (Some((reference, elapsed)), Some(instant)) => {
                    *elapsed += 1;
                    let expected = reference.plus_millis(*elapsed * TICK_INTERVAL_MS);
                    if instant != expected {
                        result.violations.push(format!(
                            "tick {} after sync produced {instant}, expected {expected}",
                            *elapsed
                        ));
                    }
                }
            }

            if was_synchronized && self.engine.status() == SyncStatus::Unsynchronized {
                result
                    .violations
                    .push("engine fell back to unsynchronized".to_string());
            }
        }

        result.successful_syncs = self.engine.successful_syncs();
        result
    }

    fn attempt_sync(&mut self, result: &mut SimulationResult, anchor: &mut Option<(Instant, u64)>) {
        result.sync_attempts += 1;
        let before = self.engine.current();
        let fetched = futures::executor::block_on(self.engine.initialize(&self.source));
        match fetched {
            Ok(instant) => *anchor = Some((instant, 0)),
            Err(_) => {
                if self.engine.current() != before {
                    result
                        .violations
                        .push("failed fetch changed the estimate".to_string());
                }
            }
        }
    }
}
