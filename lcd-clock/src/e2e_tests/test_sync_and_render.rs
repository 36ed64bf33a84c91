//! Fetch from the HTTP service, tick, and render the LCD rows.

use crate::display::{DisplayAdapter, Frame, LCD_COLS, TerminalDisplay};
use crate::e2e_tests::helpers::*;
use crate::simulation::SimulatedClock;
use crate::sync::ClockSyncEngine;

#[tokio::test]
async fn test_initial_sync_renders_server_time() {
    let server = TestServer::start().await;
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));

    let instant = engine
        .initialize(&server.source())
        .await
        .expect("sync succeeds");

    assert_eq!(instant.epoch_millis(), SERVER_EPOCH_MS);
    assert_eq!(
        rendered_rows(engine.status()),
        vec!["    13:07:09    ", "   05/03/2024   "]
    );
}

#[tokio::test]
async fn test_ticks_advance_rendered_seconds() {
    let server = TestServer::start().await;
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
    engine
        .initialize(&server.source())
        .await
        .expect("sync succeeds");

    for _ in 0..51 {
        engine.tick();
    }

    assert_eq!(
        rendered_rows(engine.status()),
        vec!["    13:08:00    ", "   05/03/2024   "]
    );
}

#[tokio::test]
async fn test_rollover_to_next_day() {
    // 2024-02-29T23:59:58Z
    let server = TestServer::start_at(1_709_251_198_000).await;
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
    engine
        .initialize(&server.source())
        .await
        .expect("sync succeeds");

    engine.tick();
    engine.tick();

    assert_eq!(
        rendered_rows(engine.status()),
        vec!["    00:00:00    ", "   01/03/2024   "]
    );
}

#[tokio::test]
async fn test_terminal_shows_boxed_grid() {
    let server = TestServer::start().await;
    let mut engine = ClockSyncEngine::new(SimulatedClock::new(0));
    engine
        .initialize(&server.source())
        .await
        .expect("sync succeeds");
    let mut display = TerminalDisplay::plain(Vec::new());

    let frame = DisplayAdapter::utc().frame(engine.status());
    assert!(matches!(frame, Frame::Grid(_)));
    display.present(&frame).expect("write to vec");

    let text = String::from_utf8(display.into_inner()).expect("utf-8 output");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "│    13:07:09    │");
    assert_eq!(lines[2], "│   05/03/2024   │");
    assert_eq!(lines[0].chars().count(), LCD_COLS + 2);
}
