//! Formatting of the current instant into LCD placements.
//!
//! The adapter is a pure function from sync status to frame. It is invoked
//! once per clock update and holds no state besides the display offset.

use chrono::{FixedOffset, Offset, Utc};

use super::grid::{Grid, Placement};
use crate::sync::SyncStatus;

/// Origin of the `HH:MM:SS` time string.
pub const TIME_ORIGIN: (i32, i32) = (0, 4);

/// Origin of the `DD/MM/YYYY` date string.
pub const DATE_ORIGIN: (i32, i32) = (1, 3);

const TIME_FORMAT: &str = "%H:%M:%S";
const DATE_FORMAT: &str = "%d/%m/%Y";

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Not yet synchronized: show the loading affordance, not the grid.
    Syncing,
    /// A rendered LCD grid.
    Grid(Grid),
}

/// Turns sync status into frames.
#[derive(Debug, Clone, Copy)]
pub struct DisplayAdapter {
    offset: FixedOffset,
}

impl DisplayAdapter {
    /// Create an adapter that shows wall-clock time at the given offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Create an adapter that shows UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Build the placements for a status.
    ///
    /// Returns `None` while unsynchronized, since the loading affordance is
    /// drawn outside the grid.
    #[must_use]
    pub fn placements(&self, status: SyncStatus) -> Option<Vec<Placement>> {
        let instant = status.instant()?;
        let Some(local) = instant.to_offset(self.offset) else {
            tracing::warn!(%instant, "instant outside the displayable range");
            return Some(Vec::new());
        };

        Some(vec![
            Placement::new(
                TIME_ORIGIN.0,
                TIME_ORIGIN.1,
                local.format(TIME_FORMAT).to_string(),
            ),
            Placement::new(
                DATE_ORIGIN.0,
                DATE_ORIGIN.1,
                local.format(DATE_FORMAT).to_string(),
            ),
        ])
    }

    /// Build the frame for a status.
    #[must_use]
    pub fn frame(&self, status: SyncStatus) -> Frame {
        match self.placements(status) {
            Some(placements) => Frame::Grid(Grid::lcd(&placements)),
            None => Frame::Syncing,
        }
    }
}

impl Default for DisplayAdapter {
    fn default() -> Self {
        Self::utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{LCD_COLS, LCD_ROWS};
    use crate::time::Instant;

    /// 2024-03-05T13:07:09Z
    const T: i64 = 1_709_644_029_000;

    fn synced(epoch_ms: i64) -> SyncStatus {
        SyncStatus::Synchronized(Instant::from_epoch_millis(epoch_ms))
    }

    #[test]
    fn test_unsynchronized_has_no_placements() {
        let adapter = DisplayAdapter::utc();
        assert_eq!(adapter.placements(SyncStatus::Unsynchronized), None);
        assert_eq!(adapter.frame(SyncStatus::Unsynchronized), Frame::Syncing);
    }

    #[test]
    fn test_synchronized_placements() {
        let placements = DisplayAdapter::utc()
            .placements(synced(T))
            .expect("synchronized");

        assert_eq!(
            placements,
            vec![
                Placement::new(0, 4, "13:07:09"),
                Placement::new(1, 3, "05/03/2024"),
            ]
        );
    }

    #[test]
    fn test_frame_rows() {
        let Frame::Grid(grid) = DisplayAdapter::utc().frame(synced(T)) else {
            panic!("expected a grid frame");
        };

        assert_eq!(grid.row(0).as_deref(), Some("    13:07:09    "));
        assert_eq!(grid.row(1).as_deref(), Some("   05/03/2024   "));
    }

    #[test]
    fn test_zero_padding_and_24_hour_clock() {
        // 2024-01-02T03:04:05Z and 2024-01-02T23:59:59Z
        let early = DisplayAdapter::utc()
            .placements(synced(1_704_164_645_000))
            .expect("synchronized");
        let late = DisplayAdapter::utc()
            .placements(synced(1_704_239_999_000))
            .expect("synchronized");

        assert_eq!(early[0].text, "03:04:05");
        assert_eq!(early[1].text, "02/01/2024");
        assert_eq!(late[0].text, "23:59:59");
    }

    #[test]
    fn test_offset_shifts_date_across_midnight() {
        let offset = FixedOffset::east_opt(11 * 3600).expect("valid offset");
        let placements = DisplayAdapter::new(offset)
            .placements(synced(T))
            .expect("synchronized");

        assert_eq!(placements[0].text, "00:07:09");
        assert_eq!(placements[1].text, "06/03/2024");
    }

    #[test]
    fn test_undisplayable_instant_renders_blank_grid() {
        let frame = DisplayAdapter::utc().frame(synced(i64::MAX));
        assert_eq!(
            frame,
            Frame::Grid(Grid::blank(LCD_ROWS, LCD_COLS))
        );
    }
}
