//! Simulated local clock for deterministic testing.
//!
//! This module provides a controlled local clock that allows tests to
//! advance time explicitly, ensuring deterministic behavior.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::time::LocalClock;

/// A simulated local clock for deterministic testing.
///
/// Unlike [`MonotonicClock`](crate::time::MonotonicClock), this
/// implementation does not read the real system clock. Instead, time only
/// advances when explicitly told to, making tests fully deterministic.
///
/// The reading is stored in an atomic so a test can keep an `Arc` to the
/// clock while a spawned clock task owns another.
///
/// # Example
///
/// ```
/// use lcd_clock::simulation::SimulatedClock;
/// use lcd_clock::time::LocalClock;
///
/// let clock = SimulatedClock::new(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 1100);
///
/// clock.set(5000);
/// assert_eq!(clock.now_ms(), 5000);
/// ```
#[derive(Debug)]
pub struct SimulatedClock {
    /// Current simulated reading in milliseconds.
    current_ms: AtomicU64,
}

impl SimulatedClock {
    /// Create a new simulated clock with the given initial reading.
    #[must_use]
    pub const fn new(initial_ms: u64) -> Self {
        Self {
            current_ms: AtomicU64::new(initial_ms),
        }
    }

    /// Advance time by the given number of milliseconds.
    ///
    /// Time saturates at `u64::MAX` if overflow would occur.
    pub fn advance(&self, ms: u64) {
        let current = self.current_ms.load(Ordering::SeqCst);
        self.current_ms
            .store(current.saturating_add(ms), Ordering::SeqCst);
    }

    /// Set the current reading to a specific value.
    ///
    /// Note: This can move time backwards. Prefer `advance` for normal testing.
    pub fn set(&self, ms: u64) {
        self.current_ms.store(ms, Ordering::SeqCst);
    }

    /// Get the current simulated reading without advancing it.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }
}

impl LocalClock for SimulatedClock {
    fn now_ms(&self) -> u64 {
        self.current()
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clone for SimulatedClock {
    fn clone(&self) -> Self {
        Self::new(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_clock_initial() {
        let clock = SimulatedClock::new(1000);
        assert_eq!(clock.now_ms(), 1000);
        assert_eq!(clock.current(), 1000);
    }

    #[test]
    fn test_simulated_clock_advance() {
        let clock = SimulatedClock::new(1000);

        clock.advance(100);
        assert_eq!(clock.now_ms(), 1100);

        clock.advance(50);
        assert_eq!(clock.now_ms(), 1150);
    }

    #[test]
    fn test_simulated_clock_set() {
        let clock = SimulatedClock::new(1000);

        clock.set(5000);
        assert_eq!(clock.now_ms(), 5000);

        clock.set(3000);
        assert_eq!(clock.now_ms(), 3000);
    }

    #[test]
    fn test_simulated_clock_saturates() {
        let clock = SimulatedClock::new(u64::MAX - 10);
        clock.advance(100);
        assert_eq!(clock.now_ms(), u64::MAX);
    }

    #[test]
    fn test_simulated_clock_clone_is_independent() {
        let clock = SimulatedClock::new(1000);
        let cloned = clock.clone();

        clock.advance(500);

        assert_eq!(clock.now_ms(), 1500);
        assert_eq!(cloned.now_ms(), 1000);
    }
}
