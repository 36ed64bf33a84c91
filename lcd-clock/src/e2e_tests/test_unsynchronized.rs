//! Behavior when the time source cannot be reached.

use crate::display::{DisplayAdapter, Frame};
use crate::e2e_tests::helpers::*;
use crate::simulation::SimulatedClock;
use crate::sync::{ClockSyncEngine, SyncStatus};
use crate::time::{HttpTimeSource, SyncError};

async fn unreachable_source() -> HttpTimeSource {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    HttpTimeSource::new(format!("http://{addr}/api/ntp"))
}

#[tokio::test]
async fn test_unreachable_source_shows_syncing() {
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));

    let result = engine.initialize(&unreachable_source().await).await;

    assert!(matches!(result, Err(SyncError::Unavailable(_))));
    assert_eq!(engine.status(), SyncStatus::Unsynchronized);
    assert_eq!(DisplayAdapter::utc().frame(engine.status()), Frame::Syncing);
}

#[tokio::test]
async fn test_ticks_without_sync_render_nothing() {
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
    let _ = engine.initialize(&unreachable_source().await).await;

    for _ in 0..10 {
        assert_eq!(engine.tick(), None);
    }
    assert_eq!(DisplayAdapter::utc().frame(engine.status()), Frame::Syncing);
}

#[tokio::test]
async fn test_wrong_path_is_not_a_sync() {
    let server = TestServer::start().await;
    let source = HttpTimeSource::new(format!("http://{}/api/other", server.addr));
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));

    let result = engine.initialize(&source).await;

    assert!(result.is_err());
    assert!(!engine.is_synchronized());
}
