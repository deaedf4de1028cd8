//! Boundary to the chess rules engine.
//!
//! The controller only ever talks to the [`Rules`] trait. [`ShakmatyRules`]
//! is the production adapter; it keeps the repetition table and the
//! 75-move threshold on top of what `shakmaty` tracks itself.

use super::convert::{from_color, from_role, from_uci, to_shakmaty_square, to_uci};
use super::types::{Move, Piece, Side, Square, TerminationOutcome};
use derive_more::{Display, Error};
use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, EnPassantMode, Outcome, Position};
use std::collections::HashMap;
use tracing::{debug, instrument, trace};

/// Halfmove clock value at which the game is drawn without a claim.
const SEVENTY_FIVE_MOVE_PLIES: u32 = 150;

/// Number of occurrences of one position that ends the game.
const FIVEFOLD: u32 = 5;

/// Read-only view of a position, enough to interpret a click.
pub trait PositionView {
    /// Side whose turn it is.
    fn side_to_move(&self) -> Side;

    /// Piece on `square`, if any.
    fn piece_at(&self, square: Square) -> Option<Piece>;
}

/// Full rules-engine contract consumed by the game controller.
pub trait Rules: PositionView {
    /// Whether `mv` is legal in the current position.
    fn is_legal(&self, mv: &Move) -> bool;

    /// Plays `mv`, advancing the position.
    fn apply(&mut self, mv: &Move) -> Result<(), RulesError>;

    /// Current position in Forsyth–Edwards Notation.
    fn to_fen(&self) -> String;

    /// How the game ended, or `None` while it is still going.
    fn termination_status(&self) -> Option<TerminationOutcome>;
}

/// Rules-engine failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Rules error: {} at {}:{}", message, file, line)]
pub struct RulesError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RulesError {
    /// Creates a rules error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Standard chess backed by `shakmaty`.
#[derive(Debug, Clone)]
pub struct ShakmatyRules {
    position: Chess,
    repetitions: HashMap<u64, u32>,
}

impl ShakmatyRules {
    /// Standard starting position.
    #[instrument]
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    /// Position given as FEN.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| RulesError::new(format!("Invalid FEN {:?}: {}", fen, e)))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| RulesError::new(format!("Illegal position {:?}: {}", fen, e)))?;
        debug!("Loaded position from FEN");
        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        let mut rules = Self {
            position,
            repetitions: HashMap::new(),
        };
        rules.record_position();
        rules
    }

    /// How many times the current position has occurred.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.repetition_key())
            .copied()
            .unwrap_or(0)
    }

    /// Legal moves in the current position, in coordinate form.
    pub fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(|m| from_uci(&m.to_uci(CastlingMode::Standard)))
            .collect()
    }

    /// Zobrist hash of placement, side to move, castling rights and the en
    /// passant square when a capture is actually possible.
    fn repetition_key(&self) -> u64 {
        let Zobrist64(hash) = self.position.zobrist_hash(EnPassantMode::Legal);
        hash
    }

    fn record_position(&mut self) {
        let key = self.repetition_key();
        let count = self.repetitions.entry(key).or_insert(0);
        *count += 1;
        trace!(occurrences = *count, "Recorded position");
    }

    fn to_shakmaty_move(&self, mv: &Move) -> Option<shakmaty::Move> {
        to_uci(mv).to_move(&self.position).ok()
    }
}

impl Default for ShakmatyRules {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionView for ShakmatyRules {
    fn side_to_move(&self) -> Side {
        from_color(self.position.turn())
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position
            .board()
            .piece_at(to_shakmaty_square(square))
            .map(|p| Piece::new(from_role(p.role), from_color(p.color)))
    }
}

impl Rules for ShakmatyRules {
    #[instrument(skip(self), fields(mv = %mv))]
    fn is_legal(&self, mv: &Move) -> bool {
        self.to_shakmaty_move(mv).is_some()
    }

    #[instrument(skip(self), fields(mv = %mv))]
    fn apply(&mut self, mv: &Move) -> Result<(), RulesError> {
        let m = self
            .to_shakmaty_move(mv)
            .ok_or_else(|| RulesError::new(format!("Illegal move {}", mv)))?;
        self.position.play_unchecked(&m);
        self.record_position();
        debug!(side_to_move = %self.side_to_move(), "Move applied");
        Ok(())
    }

    fn to_fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    #[instrument(skip(self))]
    fn termination_status(&self) -> Option<TerminationOutcome> {
        let outcome = if self.position.is_checkmate() {
            Some(TerminationOutcome::Checkmate(self.side_to_move().opponent()))
        } else if self.position.is_stalemate() {
            Some(TerminationOutcome::Stalemate)
        } else if self.position.is_insufficient_material() {
            Some(TerminationOutcome::InsufficientMaterial)
        } else if self.position.halfmoves() >= SEVENTY_FIVE_MOVE_PLIES {
            Some(TerminationOutcome::SeventyFiveMoveRule)
        } else if self.repetition_count() >= FIVEFOLD {
            Some(TerminationOutcome::FivefoldRepetition)
        } else {
            match self.position.outcome() {
                Some(Outcome::Decisive { winner }) => {
                    Some(TerminationOutcome::Checkmate(from_color(winner)))
                }
                Some(Outcome::Draw) => Some(TerminationOutcome::OtherDraw),
                None => None,
            }
        };
        if let Some(outcome) = outcome {
            debug!(%outcome, "Game is over");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::PieceKind;
    use crate::chess::notation::{parse_move, parse_square};

    fn play(rules: &mut ShakmatyRules, moves: &[&str]) {
        for text in moves {
            let mv = parse_move(text).unwrap();
            rules.apply(&mv).unwrap_or_else(|e| panic!("{} failed: {}", text, e));
        }
    }

    #[test]
    fn test_start_position_fen() {
        let rules = ShakmatyRules::new();
        assert_eq!(
            rules.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(rules.side_to_move(), Side::White);
        assert_eq!(rules.termination_status(), None);
    }

    #[test]
    fn test_piece_at() {
        let rules = ShakmatyRules::new();
        assert_eq!(
            rules.piece_at(parse_square("e1").unwrap()),
            Some(Piece::new(PieceKind::King, Side::White))
        );
        assert_eq!(
            rules.piece_at(parse_square("d8").unwrap()),
            Some(Piece::new(PieceKind::Queen, Side::Black))
        );
        assert_eq!(rules.piece_at(parse_square("e4").unwrap()), None);
    }

    #[test]
    fn test_legality() {
        let rules = ShakmatyRules::new();
        assert!(rules.is_legal(&parse_move("e2e4").unwrap()));
        assert!(rules.is_legal(&parse_move("g1f3").unwrap()));
        assert!(!rules.is_legal(&parse_move("e2e5").unwrap()));
        assert!(!rules.is_legal(&parse_move("e7e5").unwrap()));
        assert_eq!(rules.legal_moves().len(), 20);
    }

    #[test]
    fn test_illegal_apply_leaves_position_untouched() {
        let mut rules = ShakmatyRules::new();
        let before = rules.to_fen();
        assert!(rules.apply(&parse_move("e2e5").unwrap()).is_err());
        assert_eq!(rules.to_fen(), before);
    }

    #[test]
    fn test_castling_in_coordinate_form() {
        let mut rules =
            ShakmatyRules::from_fen("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1").unwrap();
        assert!(rules.is_legal(&parse_move("e1g1").unwrap()));
        play(&mut rules, &["e1g1"]);
        assert_eq!(
            rules.piece_at(parse_square("f1").unwrap()),
            Some(Piece::new(PieceKind::Rook, Side::White))
        );
    }

    #[test]
    fn test_promotion_requires_tag() {
        let rules = ShakmatyRules::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        assert!(rules.is_legal(&parse_move("a7a8q").unwrap()));
        assert!(!rules.is_legal(&parse_move("a7a8").unwrap()));
    }

    #[test]
    fn test_bad_fen_rejected() {
        assert!(ShakmatyRules::from_fen("not a fen").is_err());
        assert!(ShakmatyRules::from_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
    }

    #[test]
    fn test_fools_mate() {
        let mut rules = ShakmatyRules::new();
        play(&mut rules, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(
            rules.termination_status(),
            Some(TerminationOutcome::Checkmate(Side::Black))
        );
    }

    #[test]
    fn test_stalemate() {
        let rules = ShakmatyRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(rules.termination_status(), Some(TerminationOutcome::Stalemate));
    }

    #[test]
    fn test_insufficient_material() {
        let rules = ShakmatyRules::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            rules.termination_status(),
            Some(TerminationOutcome::InsufficientMaterial)
        );
    }

    #[test]
    fn test_seventy_five_move_rule() {
        let mut rules = ShakmatyRules::from_fen("8/8/8/4k3/8/8/3QK3/8 w - - 149 100").unwrap();
        assert_eq!(rules.termination_status(), None);
        play(&mut rules, &["d2c2"]);
        assert_eq!(
            rules.termination_status(),
            Some(TerminationOutcome::SeventyFiveMoveRule)
        );
    }

    #[test]
    fn test_fivefold_only_on_fifth_occurrence() {
        let mut rules = ShakmatyRules::new();
        let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for occurrence in 2..=4 {
            play(&mut rules, &cycle);
            assert_eq!(rules.repetition_count(), occurrence);
            assert_eq!(rules.termination_status(), None);
        }
        play(&mut rules, &cycle);
        assert_eq!(rules.repetition_count(), 5);
        assert_eq!(
            rules.termination_status(),
            Some(TerminationOutcome::FivefoldRepetition)
        );
    }

    #[test]
    fn test_repetition_key_ignores_counters_and_dead_en_passant() {
        let with_square = ShakmatyRules::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        let without = ShakmatyRules::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 7 12",
        )
        .unwrap();
        assert_eq!(with_square.repetition_key(), without.repetition_key());

        let other_side =
            ShakmatyRules::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_ne!(with_square.repetition_key(), other_side.repetition_key());
    }
}
