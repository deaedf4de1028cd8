//! Boundary to whatever draws the board and collects input.

use crate::chess::{Move, Piece, PositionView, Side, Square};

/// Input delivered by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Pointer click, relative to the board's top-left corner.
    Click {
        /// Horizontal offset.
        x: u32,
        /// Vertical offset.
        y: u32,
    },
    /// The user wants to leave.
    Quit,
}

/// Snapshot of everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// Piece on each square, indexed by [`Square::index`].
    pub squares: [Option<Piece>; 64],
    /// Square the human has picked up.
    pub selected: Option<Square>,
    /// Most recent move, for highlighting.
    pub last_move: Option<Move>,
    /// One-line status text.
    pub status: String,
    /// Side drawn at the bottom.
    pub bottom: Side,
}

impl BoardView {
    /// Copies the pieces out of `position`.
    pub fn capture(
        position: &impl PositionView,
        selected: Option<Square>,
        last_move: Option<Move>,
        status: impl Into<String>,
        bottom: Side,
    ) -> Self {
        let mut squares = [None; 64];
        for square in Square::all() {
            squares[usize::from(square.index())] = position.piece_at(square);
        }
        Self {
            squares,
            selected,
            last_move,
            status: status.into(),
            bottom,
        }
    }

    /// Piece on `square`.
    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[usize::from(square.index())]
    }
}

/// Presentation layer consumed by the game controller.
pub trait Presenter {
    /// Width and height of the drawn board in the units clicks are reported in.
    fn board_size(&self) -> (u32, u32);

    /// Returns the input gathered since the last call, possibly none.
    fn poll_events(&mut self) -> anyhow::Result<Vec<InputEvent>>;

    /// Draws `board`.
    fn render(&mut self, board: &BoardView) -> anyhow::Result<()>;

    /// Shows `text` over the board until the next render.
    fn show_message(&mut self, text: &str) -> anyhow::Result<()>;
}
