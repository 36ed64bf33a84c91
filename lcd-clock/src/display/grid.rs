//! Fixed-size character grid.
//!
//! Models the memory of a character LCD: every frame starts blank, text
//! fragments are written at an origin, and anything that does not fit is
//! clipped. There is no wraparound to the next row.
//!
//! # Invariants
//!
//! - Every cell holds exactly one glyph
//! - Dimensions never change after construction
//! - Rendering is total: any list of placements yields a valid grid

/// Number of character rows on the LCD.
pub const LCD_ROWS: usize = 2;

/// Number of character columns on the LCD.
pub const LCD_COLS: usize = 16;

/// Glyph of a cell nothing has been written to.
pub const BLANK_GLYPH: char = ' ';

/// A text fragment positioned on the grid.
///
/// Coordinates are signed so that invalid (negative) origins can be
/// expressed; the renderer skips them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub row: i32,
    pub col: i32,
    pub text: String,
}

impl Placement {
    #[must_use]
    pub fn new(row: i32, col: i32, text: impl Into<String>) -> Self {
        Self {
            row,
            col,
            text: text.into(),
        }
    }
}

/// A `rows × cols` matrix of glyphs, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<char>,
}

impl Grid {
    /// Create a grid with every cell set to [`BLANK_GLYPH`].
    #[must_use]
    pub fn blank(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![BLANK_GLYPH; rows * cols],
        }
    }

    /// Render placements onto a fresh blank grid.
    ///
    /// Placements are applied in order, so a later placement overwrites any
    /// cells it shares with an earlier one.
    #[must_use]
    pub fn render(rows: usize, cols: usize, placements: &[Placement]) -> Self {
        let mut grid = Self::blank(rows, cols);
        for placement in placements {
            grid.apply(placement);
        }
        grid
    }

    /// Render placements onto a fresh 2×16 LCD grid.
    #[must_use]
    pub fn lcd(placements: &[Placement]) -> Self {
        Self::render(LCD_ROWS, LCD_COLS, placements)
    }

    /// Write one placement.
    ///
    /// An origin outside the grid discards the whole placement; characters
    /// past the last column are dropped.
    fn apply(&mut self, placement: &Placement) {
        let (Ok(row), Ok(col)) = (
            usize::try_from(placement.row),
            usize::try_from(placement.col),
        ) else {
            return;
        };
        if row >= self.rows || col >= self.cols {
            return;
        }

        let start = row * self.cols;
        let line = &mut self.cells[start..start + self.cols];
        for (cell, glyph) in line[col..].iter_mut().zip(placement.text.chars()) {
            *cell = glyph;
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Get the glyph at a cell.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col).copied()
    }

    /// Get a row as a string of exactly `cols` glyphs.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<String> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(self.cells[start..start + self.cols].iter().collect())
    }

    /// Iterate over all rows as strings.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.rows).filter_map(|row| self.row(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(grid: &Grid, index: usize) -> String {
        grid.row(index).expect("row in bounds")
    }

    #[test]
    fn test_empty_placements_yield_blank_grid() {
        for (rows, cols) in [(2, 16), (1, 1), (4, 20), (3, 0), (0, 5)] {
            let grid = Grid::render(rows, cols, &[]);
            assert_eq!(grid.rows(), rows);
            assert_eq!(grid.cols(), cols);
            for r in 0..rows {
                assert_eq!(row(&grid, r), BLANK_GLYPH.to_string().repeat(cols));
            }
        }
    }

    #[test]
    fn test_fitting_text_is_preserved() {
        let grid = Grid::lcd(&[Placement::new(1, 3, "05/03/2024")]);

        assert_eq!(row(&grid, 1), "   05/03/2024   ");
        assert_eq!(row(&grid, 0), " ".repeat(16));
    }

    #[test]
    fn test_text_filling_whole_row() {
        let grid = Grid::lcd(&[Placement::new(0, 0, "0123456789ABCDEF")]);
        assert_eq!(row(&grid, 0), "0123456789ABCDEF");
    }

    #[test]
    fn test_overflow_is_truncated() {
        let grid = Grid::lcd(&[Placement::new(0, 15, "AB")]);

        assert_eq!(grid.get(0, 15), Some('A'));
        assert_eq!(row(&grid, 0), format!("{}A", " ".repeat(15)));
        // Never wraps onto the next row
        assert_eq!(row(&grid, 1), " ".repeat(16));
    }

    #[test]
    fn test_row_out_of_bounds_is_skipped() {
        let grid = Grid::lcd(&[Placement::new(2, 0, "X")]);
        assert_eq!(grid, Grid::blank(LCD_ROWS, LCD_COLS));
    }

    #[test]
    fn test_col_out_of_bounds_is_skipped() {
        let grid = Grid::lcd(&[Placement::new(0, 16, "X")]);
        assert_eq!(grid, Grid::blank(LCD_ROWS, LCD_COLS));
    }

    #[test]
    fn test_negative_origin_is_skipped() {
        let grid = Grid::lcd(&[
            Placement::new(-1, 0, "X"),
            Placement::new(0, -3, "HELLO"),
        ]);
        assert_eq!(grid, Grid::blank(LCD_ROWS, LCD_COLS));
    }

    #[test]
    fn test_last_write_wins_per_cell() {
        let grid = Grid::lcd(&[Placement::new(0, 0, "AAAA"), Placement::new(0, 1, "B")]);
        assert_eq!(&row(&grid, 0)[..4], "ABAA");
    }

    #[test]
    fn test_order_matters() {
        let forward = Grid::lcd(&[Placement::new(0, 0, "AAAA"), Placement::new(0, 1, "B")]);
        let reversed = Grid::lcd(&[Placement::new(0, 1, "B"), Placement::new(0, 0, "AAAA")]);

        assert_eq!(&row(&forward, 0)[..4], "ABAA");
        assert_eq!(&row(&reversed, 0)[..4], "AAAA");
    }

    #[test]
    fn test_skipped_placement_does_not_affect_others() {
        let grid = Grid::lcd(&[
            Placement::new(0, 0, "HI"),
            Placement::new(5, 5, "LOST"),
            Placement::new(1, 14, "OK!"),
        ]);

        assert_eq!(row(&grid, 0), format!("HI{}", " ".repeat(14)));
        assert_eq!(row(&grid, 1), format!("{}OK", " ".repeat(14)));
    }

    #[test]
    fn test_multibyte_glyphs_take_one_cell() {
        let grid = Grid::lcd(&[Placement::new(0, 14, "°Cx")]);
        assert_eq!(grid.get(0, 14), Some('°'));
        assert_eq!(grid.get(0, 15), Some('C'));
    }

    #[test]
    fn test_render_is_deterministic() {
        let placements = [Placement::new(0, 4, "13:07:09"), Placement::new(1, 3, "05/03/2024")];
        assert_eq!(Grid::lcd(&placements), Grid::lcd(&placements));
    }

    #[test]
    fn test_get_and_row_out_of_bounds() {
        let grid = Grid::blank(LCD_ROWS, LCD_COLS);
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 16), None);
        assert_eq!(grid.row(2), None);
    }

    #[test]
    fn test_lines() {
        let grid = Grid::lcd(&[Placement::new(0, 0, "TOP"), Placement::new(1, 0, "BOTTOM")]);
        let lines: Vec<String> = grid.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("TOP"));
        assert!(lines[1].starts_with("BOTTOM"));
    }
}
