//! Authoritative instants.
//!
//! An [`Instant`] is an absolute point in time with millisecond resolution,
//! stored as milliseconds since the Unix epoch. Exactly one instant is
//! produced per synchronization fetch; every other instant the clock shows
//! is derived from it by adding whole ticks.

use chrono::{DateTime, FixedOffset, Utc};

/// An absolute point in time, millisecond resolution.
///
/// Unlike [`std::time::Instant`], this is a wall-clock value that came from
/// the time source, not a local monotonic reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    epoch_ms: i64,
}

impl Instant {
    /// Create an instant from milliseconds since the Unix epoch.
    #[must_use]
    pub const fn from_epoch_millis(epoch_ms: i64) -> Self {
        Self { epoch_ms }
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn epoch_millis(self) -> i64 {
        self.epoch_ms
    }

    /// Return the instant `ms` milliseconds later.
    ///
    /// Saturates at `i64::MAX` rather than wrapping.
    #[must_use]
    pub fn plus_millis(self, ms: u64) -> Self {
        let delta = i64::try_from(ms).unwrap_or(i64::MAX);
        Self {
            epoch_ms: self.epoch_ms.saturating_add(delta),
        }
    }

    /// Convert to a UTC date-time.
    ///
    /// Returns `None` if the instant is outside the range chrono can represent.
    #[must_use]
    pub fn to_utc(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.epoch_ms)
    }

    /// Convert to a date-time in the given fixed offset.
    #[must_use]
    pub fn to_offset(self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        self.to_utc().map(|utc| utc.with_timezone(&offset))
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(value: DateTime<Utc>) -> Self {
        Self::from_epoch_millis(value.timestamp_millis())
    }
}

impl std::fmt::Display for Instant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_utc() {
            Some(utc) => write!(f, "{}", utc.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
            None => write!(f, "{}ms", self.epoch_ms),
        }
    }
}
