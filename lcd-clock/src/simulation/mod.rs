//! Deterministic Simulation Testing (DST) infrastructure.
//!
//! This module provides tools for testing the clock with:
//! - Controlled local time (no real system time)
//! - Scripted or seeded-fault time sources
//! - Reproducible jitter on the local tick cadence
//!
//! # Design Principles
//!
//! 1. Every clock read goes through `LocalClock` and can be simulated
//! 2. All randomness is seeded for reproducibility
//! 3. Given the same seed, execution is identical
//!
//! # Usage
//!
//! ```
//! use lcd_clock::simulation::{SimulatedClock, Simulator};
//!
//! let mut sim = Simulator::new(12345, SimulatedClock::new(0), 1_700_000_000_000)
//!     .with_failure_rate(0.2);
//! let result = sim.run(100);
//!
//! assert!(result.violations.is_empty());
//! ```

mod clock;
mod simulator;
mod source;

pub use clock::SimulatedClock;
pub use simulator::{SimulationResult, Simulator};
pub use source::{ScriptedTimeSource, SimulatedTimeSource};
