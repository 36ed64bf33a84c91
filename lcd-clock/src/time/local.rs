//! Local clock abstraction for deterministic simulation testing.
//!
//! The sync engine records a local clock reading whenever a fetch completes.
//! This module provides a `LocalClock` trait so the process-monotonic clock
//! can be swapped for simulated time in tests.

use std::sync::Arc;

/// Abstraction over local clock readings.
///
/// Readings are milliseconds on an arbitrary monotonic timeline. They are only
/// meaningful relative to each other and are never shown to the user.
pub trait LocalClock {
    /// Get the current local reading in milliseconds.
    fn now_ms(&self) -> u64;
}

impl<T: LocalClock + ?Sized> LocalClock for Arc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Real local clock backed by [`std::time::Instant`].
///
/// This is the default implementation used in production. Readings start at
/// zero when the clock is created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: std::time::Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalClock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
