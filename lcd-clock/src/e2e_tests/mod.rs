//! End-to-end tests from the HTTP time source to rendered frames.
//!
//! Each test file covers a specific scenario, using a frozen server clock
//! so the rendered rows are deterministic.

#![cfg(test)]

mod helpers;

mod test_clock_task;
mod test_determinism;
mod test_messaging;
mod test_sync_and_render;
mod test_unsynchronized;
