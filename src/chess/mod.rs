//! Chess domain types and the rules-engine boundary.

mod convert;
mod notation;
mod rules;
mod types;

pub use notation::{MoveParseError, parse_move, parse_square};
pub use rules::{PositionView, Rules, RulesError, ShakmatyRules};
pub use types::{Move, Piece, PieceKind, Side, Square, TerminationOutcome};
