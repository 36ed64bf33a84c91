//! The scheduler task against the real HTTP service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::display::{DisplayAdapter, Frame};
use crate::e2e_tests::helpers::*;
use crate::simulation::SimulatedClock;
use crate::sync::{ClockSyncEngine, ClockTask, ClockTaskConfig, SyncStatus};

#[tokio::test]
async fn test_task_syncs_and_ticks_over_http() {
    let server = TestServer::start().await;
    let frames: Arc<Mutex<Vec<Frame>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    let adapter = DisplayAdapter::utc();

    let mut task = ClockTask::spawn(
        ClockSyncEngine::new(SimulatedClock::new(0)),
        server.source(),
        ClockTaskConfig::default(),
        move |status| sink.lock().unwrap().push(adapter.frame(status)),
    );

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert!(task.cancel());

    let frames = frames.lock().unwrap().clone();
    assert!(frames.len() >= 3, "got {} frames", frames.len());
    assert_eq!(frames[0], Frame::Syncing);
    assert_eq!(frames[1], adapter.frame(synced(SERVER_EPOCH_MS)));
    assert_eq!(frames[2], adapter.frame(synced(SERVER_EPOCH_MS + 1_000)));
}

#[tokio::test]
async fn test_no_updates_after_cancel() {
    let server = TestServer::start().await;
    let updates: Arc<Mutex<Vec<SyncStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&updates);

    let mut task = ClockTask::spawn(
        ClockSyncEngine::new(SimulatedClock::new(0)),
        server.source(),
        ClockTaskConfig::default(),
        move |status| sink.lock().unwrap().push(status),
    );

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(task.cancel());
    assert!(!task.cancel());
    let seen = updates.lock().unwrap().len();

    tokio::time::sleep(Duration::from_millis(1_200)).await;

    assert_eq!(updates.lock().unwrap().len(), seen);
    assert!(!task.is_running());
}
