// Life of a frame:
// 1. Fetch the trusted time from the time source (once per session, or on
//    the re-sync interval)
// 2. Each second, rebase the last instant forward by one tick
// 3. Format the instant into time and date placements
// 4. Render the placements onto the 2x16 grid
// 5. Present the grid (or the syncing indicator) on the terminal
//
// System components:
//  - Time source service (HTTP)
//  - Sync engine and its scheduler task
//  - Grid renderer and display adapter
//  - Topic messaging

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod display;
pub mod messaging;
pub mod ntp;
pub mod simulation;
pub mod sync;
pub mod time;

mod e2e_tests;
