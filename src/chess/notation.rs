//! Coordinate move notation (`e2e4`, `e7e8q`).

use super::convert::from_uci;
use super::types::{Move, Square};
use derive_more::{Display, Error};
use shakmaty::uci::Uci;
use tracing::instrument;

/// Text that is not a coordinate move.
#[derive(Debug, Clone, Display, Error)]
#[display("Invalid move notation {:?}: {} at {}:{}", input, reason, file, line)]
pub struct MoveParseError {
    /// The offending text.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl MoveParseError {
    /// Creates a parse error with caller location tracking.
    #[track_caller]
    pub fn new(input: impl Into<String>, reason: &'static str) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            input: input.into(),
            reason,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Parses a square name such as `e4`.
#[instrument(level = "trace")]
pub fn parse_square(text: &str) -> Option<Square> {
    let bytes = text.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = bytes[0].checked_sub(b'a')?;
    let rank = bytes[1].checked_sub(b'1')?;
    Square::from_coords(file, rank)
}

/// Parses one coordinate move: two square names and an optional promotion letter.
///
/// Surrounding whitespace is ignored and letters may be upper case. Null
/// moves, drops and king promotions are rejected.
#[instrument(level = "debug")]
pub fn parse_move(text: &str) -> Result<Move, MoveParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MoveParseError::new(text, "empty"));
    }

    let uci = Uci::from_ascii(trimmed.to_ascii_lowercase().as_bytes())
        .map_err(|_| MoveParseError::new(text, "not coordinate notation"))?;
    // Move::new rejects origin == destination and promotions to pawn or king.
    from_uci(&uci).ok_or_else(|| MoveParseError::new(text, "not a board move"))
}
