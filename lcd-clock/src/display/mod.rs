//! Character LCD display: grid rendering, formatting and presentation.
//!
//! This module provides:
//! - [`Grid`] and [`Placement`], the pure renderer of a fixed character matrix
//! - [`DisplayAdapter`], which formats the clock's status into placements
//! - [`TerminalDisplay`], which draws frames to a terminal

mod adapter;
mod grid;
mod terminal;

pub use adapter::{DATE_ORIGIN, DisplayAdapter, Frame, TIME_ORIGIN};
pub use grid::{BLANK_GLYPH, Grid, LCD_COLS, LCD_ROWS, Placement};
pub use terminal::TerminalDisplay;
