//! Terminal presentation of frames.
//!
//! Draws the LCD grid inside a box border, or a spinner line while the clock
//! is still syncing.

use std::io::Write;

use super::adapter::Frame;
use super::grid::Grid;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];
const SYNCING_LABEL: &str = "Syncing with server...";

/// ANSI sequence that clears the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Writes frames to a terminal (or any writer).
#[derive(Debug)]
pub struct TerminalDisplay<W: Write> {
    out: W,
    /// Clear the screen before every frame.
    ansi: bool,
    spinner_step: usize,
}

impl<W: Write> TerminalDisplay<W> {
    /// Create a display that redraws in place using ANSI escapes.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            ansi: true,
            spinner_step: 0,
        }
    }

    /// Create a display that appends frames without escape sequences.
    pub const fn plain(out: W) -> Self {
        Self {
            out,
            ansi: false,
            spinner_step: 0,
        }
    }

    /// Draw one frame and flush.
    pub fn present(&mut self, frame: &Frame) -> std::io::Result<()> {
        if self.ansi {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        match frame {
            Frame::Syncing => {
                let glyph = SPINNER[self.spinner_step % SPINNER.len()];
                self.spinner_step = self.spinner_step.wrapping_add(1);
                writeln!(self.out, "{glyph} {SYNCING_LABEL}")?;
            }
            Frame::Grid(grid) => {
                self.spinner_step = 0;
                write_grid(&mut self.out, grid)?;
            }
        }
        self.out.flush()
    }

    /// Consume the display and return the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn write_grid(out: &mut impl Write, grid: &Grid) -> std::io::Result<()> {
    let border = "─".repeat(grid.cols());
    writeln!(out, "┌{border}┐")?;
    for line in grid.lines() {
        writeln!(out, "│{line}│")?;
    }
    writeln!(out, "└{border}┘")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Placement;

    fn output(display: TerminalDisplay<Vec<u8>>) -> String {
        String::from_utf8(display.into_inner()).expect("utf-8 output")
    }

    #[test]
    fn test_grid_frame_is_boxed() {
        let grid = Grid::lcd(&[
            Placement::new(0, 4, "13:07:09"),
            Placement::new(1, 3, "05/03/2024"),
        ]);
        let mut display = TerminalDisplay::plain(Vec::new());

        display.present(&Frame::Grid(grid)).expect("write to vec");

        let border = "─".repeat(16);
        assert_eq!(
            output(display),
            format!("┌{border}┐\n│    13:07:09    │\n│   05/03/2024   │\n└{border}┘\n")
        );
    }

    #[test]
    fn test_syncing_spinner_advances() {
        let mut display = TerminalDisplay::plain(Vec::new());

        for _ in 0..5 {
            display.present(&Frame::Syncing).expect("write to vec");
        }

        let text = output(display);
        let glyphs: Vec<char> = text
            .lines()
            .map(|line| line.chars().next().expect("non-empty line"))
            .collect();
        assert_eq!(glyphs, vec!['|', '/', '-', '\\', '|']);
        assert!(text.lines().all(|line| line.ends_with(SYNCING_LABEL)));
    }

    #[test]
    fn test_ansi_clears_before_each_frame() {
        let mut display = TerminalDisplay::new(Vec::new());

        display.present(&Frame::Syncing).expect("write to vec");
        display.present(&Frame::Syncing).expect("write to vec");

        assert_eq!(output(display).matches(CLEAR_SCREEN).count(), 2);
    }
}
