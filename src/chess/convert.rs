//! Conversions between the domain types and `shakmaty`.

use super::types::{Move, PieceKind, Side, Square};
use shakmaty::uci::Uci;
use shakmaty::{Color, Role};

pub(crate) fn to_shakmaty_square(square: Square) -> shakmaty::Square {
    shakmaty::Square::new(u32::from(square.index()))
}

pub(crate) fn from_shakmaty_square(square: shakmaty::Square) -> Option<Square> {
    u8::try_from(u32::from(square)).ok().and_then(Square::new)
}

pub(crate) fn from_color(color: Color) -> Side {
    match color {
        Color::White => Side::White,
        Color::Black => Side::Black,
    }
}

pub(crate) fn from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

pub(crate) fn to_role(kind: PieceKind) -> Role {
    match kind {
        PieceKind::Pawn => Role::Pawn,
        PieceKind::Knight => Role::Knight,
        PieceKind::Bishop => Role::Bishop,
        PieceKind::Rook => Role::Rook,
        PieceKind::Queen => Role::Queen,
        PieceKind::King => Role::King,
    }
}

/// Board moves only; drops and null moves have no coordinate form here.
pub(crate) fn from_uci(uci: &Uci) -> Option<Move> {
    match *uci {
        Uci::Normal {
            from,
            to,
            promotion,
        } => Move::new(
            from_shakmaty_square(from)?,
            from_shakmaty_square(to)?,
            promotion.map(from_role),
        ),
        _ => None,
    }
}

pub(crate) fn to_uci(mv: &Move) -> Uci {
    Uci::Normal {
        from: to_shakmaty_square(mv.origin()),
        to: to_shakmaty_square(mv.destination()),
        promotion: mv.promotion().map(to_role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_square_indices_agree() {
        for square in Square::all() {
            let converted = to_shakmaty_square(square);
            assert_eq!(converted.to_string(), square.to_string());
            assert_eq!(from_shakmaty_square(converted), Some(square));
        }
    }

    #[test]
    fn test_roles_agree() {
        for kind in PieceKind::iter() {
            assert_eq!(from_role(to_role(kind)), kind);
        }
    }

    #[test]
    fn test_null_move_has_no_coordinate_form() {
        assert_eq!(from_uci(&Uci::Null), None);
    }
}
