//! Time primitives shared by the sync engine and the NTP service.

mod instant;
mod local;
mod source;

pub use instant::Instant;
pub use local::{LocalClock, MonotonicClock};
pub use source::{HttpTimeSource, SyncError, TimePayload, TimeSource};
