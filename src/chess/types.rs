//! Core domain types shared by the controller, the engine session and the rules adapter.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, strum::EnumIter)]
pub enum Side {
    /// Moves first.
    White,
    /// Moves second.
    Black,
}

impl Side {
    /// Returns the other side.
    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Rank (0-7) a pawn of this side promotes on.
    pub fn terminal_rank(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }
}

/// Kind of a chess piece, independent of its side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize, strum::EnumIter)]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceKind {
    /// Lowercase letter used in coordinate notation and FEN.
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Whether a pawn may turn into this kind.
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

/// A piece standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// What kind of piece.
    pub kind: PieceKind,
    /// Who owns it.
    pub side: Side,
}

impl Piece {
    /// Creates a piece.
    pub fn new(kind: PieceKind, side: Side) -> Self {
        Self { kind, side }
    }

    /// FEN-style symbol: uppercase for White, lowercase for Black.
    pub fn symbol(self) -> char {
        match self.side {
            Side::White => self.kind.letter().to_ascii_uppercase(),
            Side::Black => self.kind.letter(),
        }
    }
}

/// One of the 64 board cells, `rank * 8 + file` with a1 = 0 and h8 = 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square(u8);

impl Square {
    /// Returns the square with the given index, or `None` outside 0..64.
    pub fn new(index: u8) -> Option<Self> {
        (index < 64).then_some(Self(index))
    }

    /// Returns the square at `file` (0 = a) and `rank` (0 = first rank).
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self(rank * 8 + file))
    }

    /// Index in 0..64.
    pub fn index(self) -> u8 {
        self.0
    }

    /// File, 0 = a.
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// Rank, 0 = first rank.
    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Iterates all squares from a1 to h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

/// A move from one square to another, with an optional promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    origin: Square,
    destination: Square,
    promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a move. Returns `None` when origin and destination coincide
    /// or the promotion kind is not one a pawn can become.
    #[instrument(level = "trace")]
    pub fn new(origin: Square, destination: Square, promotion: Option<PieceKind>) -> Option<Self> {
        if origin == destination {
            return None;
        }
        if promotion.is_some_and(|kind| !kind.is_promotion_target()) {
            return None;
        }
        Some(Self {
            origin,
            destination,
            promotion,
        })
    }

    /// Square the piece leaves.
    pub fn origin(&self) -> Square {
        self.origin
    }

    /// Square the piece lands on.
    pub fn destination(&self) -> Square {
        self.destination
    }

    /// Piece kind a pawn turns into, if any.
    pub fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.origin, self.destination)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TerminationOutcome {
    /// The given side delivered mate.
    #[display("checkmate, {_0} wins")]
    Checkmate(Side),
    /// Side to move has no legal move and is not in check.
    #[display("stalemate")]
    Stalemate,
    /// Neither side can possibly mate.
    #[display("insufficient material")]
    InsufficientMaterial,
    /// 75 moves by each side without a capture or pawn move.
    #[display("seventy-five move rule")]
    SeventyFiveMoveRule,
    /// Same position occurred five times.
    #[display("fivefold repetition")]
    FivefoldRepetition,
    /// Any other drawn ending.
    #[display("draw")]
    OtherDraw,
}

impl TerminationOutcome {
    /// Winning side, `None` for draws.
    pub fn winner(&self) -> Option<Side> {
        match self {
            TerminationOutcome::Checkmate(side) => Some(*side),
            _ => None,
        }
    }

    /// Message shown to the human playing `human`.
    pub fn message(&self, human: Side) -> String {
        match self {
            TerminationOutcome::Checkmate(winner) if *winner == human => {
                "Checkmate! You win!".to_string()
            }
            TerminationOutcome::Checkmate(_) => "Checkmate! The engine wins!".to_string(),
            TerminationOutcome::Stalemate => "Draw by stalemate!".to_string(),
            TerminationOutcome::InsufficientMaterial => {
                "Draw by insufficient material!".to_string()
            }
            TerminationOutcome::SeventyFiveMoveRule => "Draw by the 75-move rule!".to_string(),
            TerminationOutcome::FivefoldRepetition => "Draw by repetition!".to_string(),
            TerminationOutcome::OtherDraw => "Draw!".to_string(),
        }
    }
}
