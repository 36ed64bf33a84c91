//! Clock synchronization: the engine and the task that schedules it.

mod engine;
mod task;

pub use engine::{ClockSyncEngine, SyncStatus, TICK_INTERVAL_MS};
pub use task::{ClockTask, ClockTaskConfig};
