//! Turning clicks into piece selection and move attempts.

use crate::chess::{Move, PieceKind, PositionView, Side, Square};
use tracing::{instrument, trace};

/// Piece kind a pawn becomes when it reaches the last rank.
pub const PROMOTION_KIND: PieceKind = PieceKind::Queen;

/// The human's tentative pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    /// Nothing picked.
    #[default]
    Empty,
    /// A piece on this square is picked up.
    Selected(Square),
}

/// What a click asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Pick up the piece on this square.
    SelectSquare(Square),
    /// Try this move; the selection is dropped whatever the outcome.
    AttemptMove(Move),
    /// Drop the selection (also the no-op answer).
    ClearSelection,
}

impl SelectionState {
    /// Currently selected square.
    pub fn selected(&self) -> Option<Square> {
        match self {
            SelectionState::Empty => None,
            SelectionState::Selected(square) => Some(*square),
        }
    }

    /// Decides what a click on `square` means. Does not change `self`;
    /// feed the result to [`SelectionState::after`].
    #[instrument(level = "debug", skip(view), fields(selected = ?self.selected()))]
    pub fn on_square_clicked(
        &self,
        square: Square,
        human: Side,
        view: &impl PositionView,
    ) -> Action {
        let to_move = view.side_to_move();
        if to_move != human {
            trace!("Click outside the human's turn");
            return Action::ClearSelection;
        }

        if view.piece_at(square).is_some_and(|piece| piece.side == to_move) {
            return Action::SelectSquare(square);
        }

        let SelectionState::Selected(origin) = *self else {
            return Action::ClearSelection;
        };

        let promotion = view
            .piece_at(origin)
            .filter(|piece| {
                piece.kind == PieceKind::Pawn && square.rank() == piece.side.terminal_rank()
            })
            .map(|_| PROMOTION_KIND);

        match Move::new(origin, square, promotion) {
            Some(mv) => Action::AttemptMove(mv),
            None => Action::ClearSelection,
        }
    }

    /// State after the controller has carried out `action`.
    pub fn after(self, action: &Action) -> Self {
        match action {
            Action::SelectSquare(square) => SelectionState::Selected(*square),
            Action::AttemptMove(_) | Action::ClearSelection => SelectionState::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::{ShakmatyRules, parse_square};

    fn sq(name: &str) -> Square {
        parse_square(name).unwrap()
    }

    fn click(
        state: SelectionState,
        name: &str,
        human: Side,
        rules: &ShakmatyRules,
    ) -> (Action, SelectionState) {
        let action = state.on_square_clicked(sq(name), human, rules);
        (action, state.after(&action))
    }

    #[test]
    fn test_select_own_piece() {
        let rules = ShakmatyRules::new();
        let (action, state) = click(SelectionState::Empty, "e2", Side::White, &rules);
        assert_eq!(action, Action::SelectSquare(sq("e2")));
        assert_eq!(state, SelectionState::Selected(sq("e2")));
    }

    #[test]
    fn test_reselect_never_attempts_move() {
        let rules = ShakmatyRules::new();
        let mut state = SelectionState::Selected(sq("e2"));
        for name in ["d2", "g1", "e1", "a2"] {
            let (action, next) = click(state, name, Side::White, &rules);
            assert_eq!(action, Action::SelectSquare(sq(name)));
            state = next;
        }
        assert_eq!(state, SelectionState::Selected(sq("a2")));
    }

    #[test]
    fn test_second_click_attempts_move_and_clears() {
        let rules = ShakmatyRules::new();
        let (action, state) = click(SelectionState::Selected(sq("e2")), "e4", Side::White, &rules);
        let expected = Move::new(sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(action, Action::AttemptMove(expected));
        assert_eq!(state, SelectionState::Empty);
    }

    #[test]
    fn test_illegal_target_still_attempted() {
        let rules = ShakmatyRules::new();
        let (action, state) = click(SelectionState::Selected(sq("e2")), "e5", Side::White, &rules);
        assert!(matches!(action, Action::AttemptMove(_)));
        assert_eq!(state, SelectionState::Empty);
    }

    #[test]
    fn test_click_without_selection_is_noop() {
        let rules = ShakmatyRules::new();
        for name in ["e4", "e7"] {
            let (action, state) = click(SelectionState::Empty, name, Side::White, &rules);
            assert_eq!(action, Action::ClearSelection);
            assert_eq!(state, SelectionState::Empty);
        }
    }

    #[test]
    fn test_ignored_when_not_humans_turn() {
        let rules =
            ShakmatyRules::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1")
                .unwrap();
        let (action, state) = click(SelectionState::Selected(sq("d2")), "d4", Side::White, &rules);
        assert_eq!(action, Action::ClearSelection);
        assert_eq!(state, SelectionState::Empty);
        let (action, _) = click(SelectionState::Empty, "e7", Side::White, &rules);
        assert_eq!(action, Action::ClearSelection);
    }

    #[test]
    fn test_pawn_to_last_rank_promotes() {
        let rules = ShakmatyRules::from_fen("1n5k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        // Push and capture both land on the eighth rank.
        for target in ["a8", "b8"] {
            let (action, _) =
                click(SelectionState::Selected(sq("a7")), target, Side::White, &rules);
            let Action::AttemptMove(mv) = action else {
                panic!("expected a move attempt, got {:?}", action);
            };
            assert_eq!(mv.promotion(), Some(PieceKind::Queen));
        }
    }

    #[test]
    fn test_promotion_independent_of_click_order() {
        let rules = ShakmatyRules::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let (_, state) = click(SelectionState::Empty, "a1", Side::White, &rules);
        let (_, state) = click(state, "a7", Side::White, &rules);
        let (_, state) = click(state, "a1", Side::White, &rules);
        let (_, state) = click(state, "a7", Side::White, &rules);
        let (action, _) = click(state, "a8", Side::White, &rules);
        assert_eq!(
            action,
            Action::AttemptMove(Move::new(sq("a7"), sq("a8"), Some(PieceKind::Queen)).unwrap())
        );
    }

    #[test]
    fn test_black_pawn_promotes_on_first_rank() {
        let rules = ShakmatyRules::from_fen("k7/8/8/8/8/8/p7/7K b - - 0 1").unwrap();
        let (action, _) = click(SelectionState::Selected(sq("a2")), "a1", Side::Black, &rules);
        assert_eq!(
            action,
            Action::AttemptMove(Move::new(sq("a2"), sq("a1"), Some(PieceKind::Queen)).unwrap())
        );
    }

    #[test]
    fn test_non_terminal_pawn_moves_never_promote() {
        let rules = ShakmatyRules::from_fen("7k/8/P7/8/8/8/4P3/K7 w - - 0 1").unwrap();
        for (from, to) in [("a6", "a7"), ("e2", "e3"), ("e2", "e4")] {
            let (action, _) = click(SelectionState::Selected(sq(from)), to, Side::White, &rules);
            let Action::AttemptMove(mv) = action else {
                panic!("expected a move attempt, got {:?}", action);
            };
            assert_eq!(mv.promotion(), None);
        }
    }

    #[test]
    fn test_non_pawn_to_last_rank_never_promotes() {
        let rules = ShakmatyRules::from_fen("7k/R7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let (action, _) = click(SelectionState::Selected(sq("a7")), "a8", Side::White, &rules);
        assert_eq!(
            action,
            Action::AttemptMove(Move::new(sq("a7"), sq("a8"), None).unwrap())
        );
    }
}
