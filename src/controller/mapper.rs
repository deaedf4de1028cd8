//! Pointer coordinates to board squares and back.

use crate::chess::{Side, Square};
use tracing::instrument;

/// Size and orientation of the drawn board.
///
/// Coordinates are relative to the board's top-left corner. Width and
/// height are kept apart because terminal cells are taller than wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardGeometry {
    width: u32,
    height: u32,
    bottom: Side,
}

impl BoardGeometry {
    /// Board of `width` by `height` units with `bottom`'s pieces at the bottom.
    pub fn new(width: u32, height: u32, bottom: Side) -> Self {
        Self {
            width,
            height,
            bottom,
        }
    }

    /// Square board, White at the bottom.
    pub fn square(size: u32) -> Self {
        Self::new(size, size, Side::White)
    }

    /// Width of one cell.
    pub fn cell_width(&self) -> u32 {
        self.width / 8
    }

    /// Height of one cell.
    pub fn cell_height(&self) -> u32 {
        self.height / 8
    }

    /// Side drawn at the bottom.
    pub fn bottom(&self) -> Side {
        self.bottom
    }

    /// Square shown in screen column `col` and row `row` (both 0-7,
    /// row 0 at the top).
    pub fn square_at(&self, col: u32, row: u32) -> Option<Square> {
        if col >= 8 || row >= 8 {
            return None;
        }
        let (file, rank) = match self.bottom {
            Side::White => (col, 7 - row),
            Side::Black => (7 - col, row),
        };
        Square::from_coords(file as u8, rank as u8)
    }

    /// Screen column and row (row 0 at the top) where `square` is drawn.
    pub fn grid_position(&self, square: Square) -> (u32, u32) {
        let (file, rank) = (u32::from(square.file()), u32::from(square.rank()));
        match self.bottom {
            Side::White => (file, 7 - rank),
            Side::Black => (7 - file, rank),
        }
    }

    /// Square under the point `(x, y)`, or `None` off the board.
    #[instrument(level = "trace")]
    pub fn to_square(&self, x: u32, y: u32) -> Option<Square> {
        let (cell_w, cell_h) = (self.cell_width(), self.cell_height());
        if cell_w == 0 || cell_h == 0 {
            return None;
        }
        self.square_at(x / cell_w, y / cell_h)
    }

    /// Centre point of the cell showing `square`.
    pub fn cell_center(&self, square: Square) -> (u32, u32) {
        let (col, row) = self.grid_position(square);
        let (cell_w, cell_h) = (self.cell_width(), self.cell_height());
        (col * cell_w + cell_w / 2, row * cell_h + cell_h / 2)
    }
}

/// Square under `(x, y)` on a square board `board_size` units wide with
/// White at the bottom.
pub fn to_square(x: u32, y: u32, board_size: u32) -> Option<Square> {
    BoardGeometry::square(board_size).to_square(x, y)
}
