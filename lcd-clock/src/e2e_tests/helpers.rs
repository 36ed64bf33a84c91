//! Common helpers for end-to-end tests.

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::net::TcpListener;

use crate::display::{DisplayAdapter, Frame};
use crate::ntp::{self, FixedWallClock, NTP_PATH};
use crate::sync::SyncStatus;
use crate::time::{HttpTimeSource, Instant};

/// Server time used by every scenario: 2024-03-05T13:07:09Z.
pub const SERVER_EPOCH_MS: i64 = 1_709_644_029_000;

/// A time source service running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a server frozen at [`SERVER_EPOCH_MS`].
    pub async fn start() -> Self {
        Self::start_at(SERVER_EPOCH_MS).await
    }

    /// Start a server frozen at the given epoch milliseconds.
    pub async fn start_at(epoch_ms: i64) -> Self {
        let now = DateTime::<Utc>::from_timestamp_millis(epoch_ms).expect("valid timestamp");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let router = ntp::router(Arc::new(FixedWallClock::new(now, 0)));
        let handle = tokio::spawn(async move {
            let _ = ntp::serve(listener, router).await;
        });
        Self { addr, handle }
    }

    /// HTTP time source pointed at this server.
    pub fn source(&self) -> HttpTimeSource {
        HttpTimeSource::new(format!("http://{}{NTP_PATH}", self.addr))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn synced(epoch_ms: i64) -> SyncStatus {
    SyncStatus::Synchronized(Instant::from_epoch_millis(epoch_ms))
}

/// Render a status with a UTC adapter and return the grid rows.
pub fn rendered_rows(status: SyncStatus) -> Vec<String> {
    match DisplayAdapter::utc().frame(status) {
        Frame::Grid(grid) => grid.lines().collect(),
        Frame::Syncing => panic!("expected a grid frame, got the syncing frame"),
    }
}
