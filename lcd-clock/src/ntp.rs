//! HTTP time source service.
//!
//! Serves `GET /api/ntp` with the server's current time as a [`TimePayload`].
//! This is the trusted source the clock synchronizes against.

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Local, Utc};
use tokio::net::TcpListener;

use crate::time::{Instant, TimePayload};

/// Path the time payload is served on.
pub const NTP_PATH: &str = "/api/ntp";

/// Source of the wall-clock time the service reports.
pub trait WallClock: Send + Sync {
    /// The current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Minutes to add to the server's local time to reach UTC.
    fn timezone_offset_minutes(&self) -> i32;
}

/// Wall clock backed by the system clock and local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn timezone_offset_minutes(&self) -> i32 {
        -(Local::now().offset().local_minus_utc() / 60)
    }
}

/// Wall clock frozen at a fixed time, for tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct FixedWallClock {
    now: DateTime<Utc>,
    timezone_offset_minutes: i32,
}

impl FixedWallClock {
    #[must_use]
    pub const fn new(now: DateTime<Utc>, timezone_offset_minutes: i32) -> Self {
        Self {
            now,
            timezone_offset_minutes,
        }
    }
}

impl WallClock for FixedWallClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn timezone_offset_minutes(&self) -> i32 {
        self.timezone_offset_minutes
    }
}

#[derive(Clone)]
struct NtpState {
    clock: Arc<dyn WallClock>,
}

/// Build the router serving [`NTP_PATH`].
pub fn router(clock: Arc<dyn WallClock>) -> Router {
    Router::new()
        .route(NTP_PATH, get(ntp_handler))
        .with_state(NtpState { clock })
}

/// Serve the router until the listener fails.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    axum::serve(listener, router).await
}

async fn ntp_handler(State(state): State<NtpState>) -> Json<TimePayload> {
    let now = state.clock.now();
    tracing::debug!("serving time {now}");
    Json(TimePayload::for_instant(
        Instant::from(now),
        state.clock.timezone_offset_minutes(),
    ))
}
