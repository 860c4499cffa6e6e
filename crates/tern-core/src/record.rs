//! Position records: the plain description a position is built from.

use crate::{CastleSide, CastlingRights, Color, File, Piece, PieceKind, Rank, Square};
use thiserror::Error;

/// Reasons a record cannot describe a playable position.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("{color} has {count} kings, expected exactly one")]
    KingCount { color: Color, count: usize },

    #[error("pawn on back rank square {0}")]
    PawnOnBackRank(Square),

    #[error("en passant file {file} has no capturable pawn on {square}")]
    EnPassantWithoutPawn { file: File, square: Square },

    #[error("castling right {right} needs the {color} king and rook on their home squares")]
    CastlingWithoutPieces { color: Color, right: char },

    #[error("{color} king on {square} is in check with {color} not to move")]
    OpponentInCheck { color: Color, square: Square },
}

const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];
const STRAIGHT: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Board array plus the side-to-move, castling, en passant and clock state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    /// File of the pawn that just double-pushed, if any.
    pub en_passant: Option<File>,
    pub halfmove_clock: u8,
    pub fullmove_number: u16,
}

impl PositionRecord {
    /// A record with an empty board, white to move and no rights.
    pub fn empty() -> Self {
        PositionRecord {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard initial position.
    pub fn startpos() -> Self {
        let mut record = Self::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in File::ALL.into_iter().zip(back) {
            record.set(Square::new(file, Rank::R1), Some(Piece::new(Color::White, kind)));
            record.set(Square::new(file, Rank::R2), Some(Piece::new(Color::White, PieceKind::Pawn)));
            record.set(Square::new(file, Rank::R7), Some(Piece::new(Color::Black, PieceKind::Pawn)));
            record.set(Square::new(file, Rank::R8), Some(Piece::new(Color::Black, kind)));
        }
        record.castling = CastlingRights::ALL;
        record
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index() as usize]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.board[sq.index() as usize] = piece;
    }

    /// Square holding the king of `color`, if there is exactly one.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        let mut kings = (0..64u8)
            .filter_map(Square::from_index)
            .filter(|&sq| self.get(sq) == Some(king));
        match (kings.next(), kings.next()) {
            (Some(sq), None) => Some(sq),
            _ => None,
        }
    }

    /// Checks that the record describes a position the engine can play from.
    pub fn validate(&self) -> Result<(), RecordError> {
        for color in Color::ALL {
            let king = Piece::new(color, PieceKind::King);
            let count = self.board.iter().filter(|&&p| p == Some(king)).count();
            if count != 1 {
                return Err(RecordError::KingCount { color, count });
            }
        }

        for rank in [Rank::R1, Rank::R8] {
            for file in File::ALL {
                let sq = Square::new(file, rank);
                if matches!(self.get(sq), Some(p) if p.kind() == PieceKind::Pawn) {
                    return Err(RecordError::PawnOnBackRank(sq));
                }
            }
        }

        if let Some(file) = self.en_passant {
            // The pawn that double-pushed belongs to the side not on move.
            let pusher = self.side_to_move.opposite();
            let square = Square::new(file, self.side_to_move.en_passant_rank());
            if self.get(square) != Some(Piece::new(pusher, PieceKind::Pawn)) {
                return Err(RecordError::EnPassantWithoutPawn { file, square });
            }
        }

        for color in Color::ALL {
            for side in CastleSide::BOTH {
                if !self.castling.has(color, side) {
                    continue;
                }
                let king_home = CastleSide::king_start(color);
                let (rook_home, _) = side.rook_squares(color);
                if self.get(king_home) != Some(Piece::new(color, PieceKind::King))
                    || self.get(rook_home) != Some(Piece::new(color, PieceKind::Rook))
                {
                    let flag = CastlingRights::new(CastlingRights::flag(color, side));
                    let right = flag.to_string().chars().next().unwrap_or('-');
                    return Err(RecordError::CastlingWithoutPieces { color, right });
                }
            }
        }

        let waiting = self.side_to_move.opposite();
        if let Some(square) = self.king_square(waiting) {
            if self.is_attacked_by(square, self.side_to_move) {
                return Err(RecordError::OpponentInCheck {
                    color: waiting,
                    square,
                });
            }
        }

        Ok(())
    }

    /// True if any piece of `attacker` attacks `target`. Walks rays on the
    /// board array, so it needs no attack tables.
    pub fn is_attacked_by(&self, target: Square, attacker: Color) -> bool {
        let holds = |sq: Option<Square>, test: fn(PieceKind) -> bool| {
            matches!(sq.and_then(|sq| self.get(sq)), Some(p) if p.color() == attacker && test(p.kind()))
        };

        // A pawn attacks diagonally forward, so look one rank behind the target.
        let behind = match attacker {
            Color::White => -1,
            Color::Black => 1,
        };
        if [-1, 1]
            .into_iter()
            .any(|df| holds(target.offset(df, behind), |k| k == PieceKind::Pawn))
        {
            return true;
        }
        if KNIGHT_JUMPS
            .into_iter()
            .any(|(df, dr)| holds(target.offset(df, dr), |k| k == PieceKind::Knight))
        {
            return true;
        }
        if STRAIGHT
            .into_iter()
            .chain(DIAGONAL)
            .any(|(df, dr)| holds(target.offset(df, dr), |k| k == PieceKind::King))
        {
            return true;
        }

        let rays = STRAIGHT
            .into_iter()
            .map(|dir| (dir, PieceKind::slides_straight as fn(PieceKind) -> bool))
            .chain(
                DIAGONAL
                    .into_iter()
                    .map(|dir| (dir, PieceKind::slides_diagonally as fn(PieceKind) -> bool)),
            );
        for ((df, dr), slides) in rays {
            let mut next = target.offset(df, dr);
            while let Some(sq) = next {
                if let Some(piece) = self.get(sq) {
                    if piece.color() == attacker && slides(piece.kind()) {
                        return true;
                    }
                    break;
                }
                next = sq.offset(df, dr);
            }
        }
        false
    }
}

impl Default for PositionRecord {
    fn default() -> Self {
        Self::startpos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_valid() {
        let record = PositionRecord::startpos();
        assert_eq!(record.validate(), Ok(()));
        assert_eq!(record.king_square(Color::White), Some(Square::E1));
        assert_eq!(record.king_square(Color::Black), Some(Square::E8));
        assert_eq!(record.board.iter().flatten().count(), 32);
    }

    #[test]
    fn missing_king_is_rejected() {
        let mut record = PositionRecord::startpos();
        record.set(Square::E8, None);
        record.castling = CastlingRights::new(0b0011);
        assert_eq!(
            record.validate(),
            Err(RecordError::KingCount {
                color: Color::Black,
                count: 0
            })
        );
    }

    #[test]
    fn pawn_on_back_rank_is_rejected() {
        let mut record = PositionRecord::startpos();
        record.set(Square::B1, Some(Piece::new(Color::Black, PieceKind::Pawn)));
        assert_eq!(
            record.validate(),
            Err(RecordError::PawnOnBackRank(Square::B1))
        );
    }

    #[test]
    fn en_passant_needs_pushed_pawn() {
        let mut record = PositionRecord::startpos();
        record.side_to_move = Color::Black;
        record.en_passant = Some(File::E);
        assert!(matches!(
            record.validate(),
            Err(RecordError::EnPassantWithoutPawn { file: File::E, .. })
        ));

        let e2 = Square::new(File::E, Rank::R2);
        let e4 = Square::new(File::E, Rank::R4);
        record.set(e2, None);
        record.set(e4, Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn king_of_side_not_to_move_cannot_be_in_check() {
        let mut record = PositionRecord::empty();
        let e1 = Square::E1;
        let e8 = Square::E8;
        let g1 = Square::new(File::G, Rank::R1);
        record.set(e8, Some(Piece::new(Color::Black, PieceKind::King)));
        record.set(g1, Some(Piece::new(Color::White, PieceKind::King)));
        record.set(e1, Some(Piece::new(Color::White, PieceKind::Rook)));
        assert_eq!(
            record.validate(),
            Err(RecordError::OpponentInCheck {
                color: Color::Black,
                square: e8
            })
        );

        // Same board with black to move is an ordinary check.
        record.side_to_move = Color::Black;
        assert_eq!(record.validate(), Ok(()));

        // A blocker on the file removes the attack.
        record.side_to_move = Color::White;
        let e4 = Square::new(File::E, Rank::R4);
        record.set(e4, Some(Piece::new(Color::Black, PieceKind::Knight)));
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn attack_detection_by_piece_type() {
        let mut record = PositionRecord::empty();
        let d4 = Square::new(File::D, Rank::R4);
        let at = |f, r| Square::new(f, r);

        record.set(at(File::C, Rank::R3), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert!(record.is_attacked_by(d4, Color::White));
        assert!(!record.is_attacked_by(d4, Color::Black));

        let mut record = PositionRecord::empty();
        record.set(at(File::E, Rank::R5), Some(Piece::new(Color::Black, PieceKind::Pawn)));
        assert!(record.is_attacked_by(d4, Color::Black));
        record.set(at(File::E, Rank::R5), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert!(!record.is_attacked_by(d4, Color::White));

        let mut record = PositionRecord::empty();
        record.set(at(File::E, Rank::R6), Some(Piece::new(Color::Black, PieceKind::Knight)));
        assert!(record.is_attacked_by(d4, Color::Black));

        let mut record = PositionRecord::empty();
        record.set(at(File::G, Rank::R7), Some(Piece::new(Color::Black, PieceKind::Bishop)));
        assert!(record.is_attacked_by(d4, Color::Black));
        record.set(at(File::F, Rank::R6), Some(Piece::new(Color::White, PieceKind::Pawn)));
        assert!(!record.is_attacked_by(d4, Color::Black));

        let mut record = PositionRecord::empty();
        record.set(at(File::D, Rank::R8), Some(Piece::new(Color::White, PieceKind::Rook)));
        assert!(record.is_attacked_by(d4, Color::White));
        record.set(at(File::D, Rank::R8), Some(Piece::new(Color::White, PieceKind::Bishop)));
        assert!(!record.is_attacked_by(d4, Color::White));
    }

    #[test]
    fn castling_needs_home_pieces() {
        let mut record = PositionRecord::startpos();
        record.set(Square::H8, None);
        assert_eq!(
            record.validate(),
            Err(RecordError::CastlingWithoutPieces {
                color: Color::Black,
                right: 'k'
            })
        );
    }
}
