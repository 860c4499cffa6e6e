//! Castling rights and castling geometry.

use crate::{Color, File, Square};
use std::fmt;

/// Four castling-right bits: white kingside, white queenside, black
/// kingside, black queenside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    #[inline]
    pub const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    #[inline]
    pub fn remove(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    #[inline]
    pub fn remove_color(&mut self, color: Color) {
        self.remove(color, CastleSide::King);
        self.remove(color, CastleSide::Queen);
    }

    /// Clears every right that depends on a piece staying on `sq`: the king
    /// squares e1/e8 and the four rook corners. Called with both the start
    /// and the destination of every move, so rook moves and rook captures
    /// both cost the right.
    #[inline]
    pub fn touch(&mut self, sq: Square) {
        self.0 &= !Self::dependents(sq);
    }

    const fn dependents(sq: Square) -> u8 {
        match sq.index() {
            0 => Self::WHITE_QUEENSIDE,
            4 => Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE,
            7 => Self::WHITE_KINGSIDE,
            56 => Self::BLACK_QUEENSIDE,
            60 => Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE,
            63 => Self::BLACK_KINGSIDE,
            _ => 0,
        }
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Parses the FEN castling field ("KQkq", "Kq", "-").
    pub fn from_fen(field: &str) -> Option<Self> {
        if field == "-" {
            return Some(Self::NONE);
        }
        if field.is_empty() {
            return None;
        }
        let mut flags = 0u8;
        for c in field.chars() {
            flags |= match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => return None,
            };
        }
        Some(Self::new(flags))
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// The wing a king castles toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::King, CastleSide::Queen];

    /// Home square of the king of `color`.
    #[inline]
    pub const fn king_start(color: Color) -> Square {
        Square::new(File::E, color.back_rank())
    }

    /// Infers the wing from a castling king's destination.
    #[inline]
    pub const fn from_king_target(to: Square) -> Option<Self> {
        match to.file() {
            File::G => Some(CastleSide::King),
            File::C => Some(CastleSide::Queen),
            _ => None,
        }
    }

    #[inline]
    pub const fn king_target(self, color: Color) -> Square {
        let file = match self {
            CastleSide::King => File::G,
            CastleSide::Queen => File::C,
        };
        Square::new(file, color.back_rank())
    }

    /// Rook start and rook destination.
    #[inline]
    pub const fn rook_squares(self, color: Color) -> (Square, Square) {
        let rank = color.back_rank();
        match self {
            CastleSide::King => (Square::new(File::H, rank), Square::new(File::F, rank)),
            CastleSide::Queen => (Square::new(File::A, rank), Square::new(File::D, rank)),
        }
    }

    /// Squares strictly between king and rook, which must be empty.
    pub const fn between_mask(self, color: Color) -> u64 {
        let shift = color.back_rank().index() * 8;
        let files: u64 = match self {
            CastleSide::King => 0b0110_0000,
            CastleSide::Queen => 0b0000_1110,
        };
        files << shift
    }

    /// Squares the king stands on or crosses, including start and end,
    /// none of which may be attacked.
    pub const fn transit_mask(self, color: Color) -> u64 {
        let shift = color.back_rank().index() * 8;
        let files: u64 = match self {
            CastleSide::King => 0b0111_0000,
            CastleSide::Queen => 0b0001_1100,
        };
        files << shift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rights_remove() {
        let mut rights = CastlingRights::ALL;
        rights.remove(Color::White, CastleSide::King);
        assert!(!rights.has(Color::White, CastleSide::King));
        assert!(rights.has(Color::White, CastleSide::Queen));

        rights.remove_color(Color::Black);
        assert!(!rights.has(Color::Black, CastleSide::King));
        assert!(!rights.has(Color::Black, CastleSide::Queen));
        assert_eq!(rights.raw(), CastlingRights::WHITE_QUEENSIDE);
    }

    #[test]
    fn touching_home_squares_clears_dependents() {
        let mut rights = CastlingRights::ALL;
        rights.touch(Square::H1);
        assert_eq!(rights.raw(), 0b1110);
        rights.touch(Square::E8);
        assert_eq!(rights.raw(), CastlingRights::WHITE_QUEENSIDE);
        rights.touch(Square::D1);
        assert_eq!(rights.raw(), CastlingRights::WHITE_QUEENSIDE);
        rights.touch(Square::A1);
        assert!(rights.is_empty());
    }

    #[test]
    fn fen_field_roundtrip() {
        for field in ["KQkq", "Kq", "k", "-"] {
            let rights = CastlingRights::from_fen(field).unwrap();
            assert_eq!(rights.to_string(), field);
        }
        assert_eq!(CastlingRights::from_fen("KX"), None);
        assert_eq!(CastlingRights::from_fen(""), None);
    }

    #[test]
    fn castle_geometry() {
        assert_eq!(CastleSide::King.king_target(Color::White), Square::G1);
        assert_eq!(CastleSide::Queen.king_target(Color::Black), Square::C8);
        assert_eq!(
            CastleSide::King.rook_squares(Color::Black),
            (Square::H8, Square::F8)
        );
        assert_eq!(
            CastleSide::Queen.rook_squares(Color::White),
            (Square::A1, Square::D1)
        );
        assert_eq!(CastleSide::from_king_target(Square::C1), Some(CastleSide::Queen));
        assert_eq!(CastleSide::from_king_target(Square::E1), None);
    }

    #[test]
    fn castle_masks() {
        assert_eq!(
            CastleSide::King.between_mask(Color::White),
            Square::F1.bitboard() | Square::G1.bitboard()
        );
        assert_eq!(
            CastleSide::Queen.between_mask(Color::Black),
            Square::B8.bitboard() | Square::C8.bitboard() | Square::D8.bitboard()
        );
        assert_eq!(
            CastleSide::Queen.transit_mask(Color::White),
            Square::C1.bitboard() | Square::D1.bitboard() | Square::E1.bitboard()
        );
        assert_eq!(
            CastleSide::King.transit_mask(Color::Black),
            Square::E8.bitboard() | Square::F8.bitboard() | Square::G8.bitboard()
        );
    }
}
