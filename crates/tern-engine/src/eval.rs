//! Static evaluation.
//!
//! Material plus piece-square tables, a king table tapered between
//! middlegame and endgame, pawn contact terms and optional mobility.
//! Tables are written from white's side with a1 first; black reads them
//! through [`Square::flip_rank`].

use crate::{EvalConfig, Position};
use tern_core::{Color, Piece, PieceKind, Square};

pub const PAWN_VALUE: i32 = 85;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 315;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

/// Phase weight with all minor and major pieces on the board.
const MAX_PHASE: i32 = 24;

#[rustfmt::skip]
const KING_MIDDLEGAME: [i32; 64] = [
      5,  10,   5,   0,  -5,  10,   5,   5,
      0,   0,  -5,  -5,  -5,  -5,   0,   0,
     -5, -10, -10, -10, -10, -10, -10,  -5,
    -20, -18, -15, -12, -12, -15, -18, -20,
    -30, -27, -24, -20, -20, -24, -27, -30,
    -35, -32, -29, -25, -25, -29, -32, -35,
    -35, -32, -29, -25, -25, -29, -32, -35,
    -35, -32, -29, -25, -25, -29, -32, -35,
];

#[rustfmt::skip]
const KING_ENDGAME: [i32; 64] = [
    -10, -10, -10, -10, -10, -10, -10, -10,
    -10,  -7,  -7,  -5,  -5,  -7,  -7, -10,
    -10,  -7,  -5,   0,   0,  -5,  -7, -10,
    -10,  -5,   0,   5,   5,   0,  -5, -10,
    -10,  -5,   0,   5,   5,   0,  -5, -10,
    -10,  -7,  -5,   0,   0,  -5,  -7, -10,
    -10,  -7,  -7,  -5,  -5,  -7,  -7, -10,
    -10, -10, -10, -10, -10, -10, -10, -10,
];

#[rustfmt::skip]
const QUEEN_TABLE: [i32; 64] = [
    -15, -10,  -5,  -5,   0,  -5, -10, -15,
    -10,  -5,  -5,  -5,  -5,  -5,  -5,  -5,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   5,   5,   5,   5,   0,   0,
      0,   0,   5,   5,   5,   5,   0,   0,
     -5,   0,   5,   5,   5,   5,   0,  -5,
      0,   0,   0,   0,   0,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
];

#[rustfmt::skip]
const ROOK_TABLE: [i32; 64] = [
      0,   0,   0,   5,   5,   0,   0,   0,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
     -5,   0,   0,   0,   0,   0,   0,  -5,
      5,  10,  10,  10,  10,  10,  10,   5,
      0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const BISHOP_TABLE: [i32; 64] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const KNIGHT_TABLE: [i32; 64] = [
    -50, -30, -20, -20, -20, -20, -30, -50,
    -30, -10,   0,   5,   5,   0, -10, -30,
    -20,   3,   6,  12,  12,   6,   3, -20,
    -10,   0,   9,  15,  15,   9,   0, -10,
    -10,   3,   9,  15,  15,   9,   3, -10,
    -10,   0,   6,  12,  12,   6,   0, -10,
    -10,   0,   5,   5,   5,   5,   0, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

// Pawns never stand on the first or last rank.
#[rustfmt::skip]
const PAWN_TABLE: [i32; 64] = [
      0,   0,   0,   0,   0,   0,   0,   0,
      3,   5,   5, -10, -10,   5,   5,   3,
      3,  -3,  -5,   0,   0,  -5,  -3,   5,
      0,   0,   0,  10,  10,   0,   0,   0,
      3,   3,   6,  13,  13,   6,   3,   3,
      6,   6,  12,  16,  16,  12,   6,   6,
     30,  30,  30,  30,  30,  30,  30,  30,
      0,   0,   0,   0,   0,   0,   0,   0,
];

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

const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const STRAIGHTS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Per-square weights for a mobility ray walk.
struct RayWeights {
    empty: i32,
    capture: i32,
    defend: i32,
}

const QUEEN_RAYS: RayWeights = RayWeights {
    empty: 1,
    capture: 3,
    defend: 0,
};
const ROOK_RAYS: RayWeights = RayWeights {
    empty: 1,
    capture: 4,
    defend: 1,
};
const BISHOP_RAYS: RayWeights = RayWeights {
    empty: 2,
    capture: 4,
    defend: 2,
};

/// Game phase from non-pawn material: 24 with everything on the board,
/// 0 with only kings and pawns.
pub fn game_phase(position: &Position) -> i32 {
    let phase = position.pieces(PieceKind::Knight).count()
        + position.pieces(PieceKind::Bishop).count()
        + 2 * position.pieces(PieceKind::Rook).count()
        + 4 * position.pieces(PieceKind::Queen).count();
    (phase as i32).min(MAX_PHASE)
}

/// Scores the position in centipawns from `perspective`'s point of view.
pub fn evaluate(position: &Position, perspective: Color, config: &EvalConfig) -> i32 {
    let endgame_weight = 256 * (MAX_PHASE - game_phase(position)) / MAX_PHASE;
    let mut score = 0;

    for sq in position.occupied() {
        let Some(piece) = position.piece_at(sq) else {
            continue;
        };
        let color = piece.color();
        let table_sq = match color {
            Color::White => sq,
            Color::Black => sq.flip_rank(),
        };
        let t = table_sq.index() as usize;

        let value = match piece.kind() {
            PieceKind::King => {
                (KING_MIDDLEGAME[t] * (256 - endgame_weight) + KING_ENDGAME[t] * endgame_weight)
                    / 256
            }
            PieceKind::Queen => {
                let mut v = QUEEN_VALUE + QUEEN_TABLE[t];
                if config.mobility {
                    v += ray_mobility(position, sq, color, &DIAGONALS, &QUEEN_RAYS);
                    v += ray_mobility(position, sq, color, &STRAIGHTS, &QUEEN_RAYS);
                }
                v
            }
            PieceKind::Rook => {
                let mut v = ROOK_VALUE + ROOK_TABLE[t];
                if config.mobility {
                    v += ray_mobility(position, sq, color, &STRAIGHTS, &ROOK_RAYS);
                }
                v
            }
            PieceKind::Bishop => {
                let mut v = BISHOP_VALUE + BISHOP_TABLE[t];
                if config.mobility {
                    v += ray_mobility(position, sq, color, &DIAGONALS, &BISHOP_RAYS);
                }
                v
            }
            PieceKind::Knight => {
                let mut v = KNIGHT_VALUE + KNIGHT_TABLE[t];
                if config.mobility {
                    v += knight_mobility(position, sq, color);
                }
                v
            }
            PieceKind::Pawn => PAWN_VALUE + PAWN_TABLE[t] + pawn_structure(position, sq, color),
        };

        if color == perspective {
            score += value;
        } else {
            score -= value;
        }
    }

    score
}

/// Contacts on the forward diagonals and a doubled-pawn penalty.
fn pawn_structure(position: &Position, sq: Square, color: Color) -> i32 {
    let forward = match color {
        Color::White => 1,
        Color::Black => -1,
    };
    let mut score = 0;

    for df in [-1, 1] {
        let Some(target) = sq.offset(df, forward).and_then(|s| position.piece_at(s)) else {
            continue;
        };
        score += if target.color() == color { 4 } else { 3 };
        if target.kind() != PieceKind::Pawn {
            score += 3;
        }
    }

    let ahead = sq.offset(0, forward).and_then(|s| position.piece_at(s));
    if ahead == Some(Piece::new(color, PieceKind::Pawn)) {
        score -= 20;
    }
    score
}

/// Walks each ray to the first piece, scoring empty squares and the piece
/// that ends the ray.
fn ray_mobility(
    position: &Position,
    from: Square,
    color: Color,
    directions: &[(i8, i8)],
    weights: &RayWeights,
) -> i32 {
    let mut score = 0;
    for &(df, dr) in directions {
        let mut current = from;
        while let Some(next) = current.offset(df, dr) {
            match position.piece_at(next) {
                None => score += weights.empty,
                Some(piece) if piece.color() == color => {
                    score += weights.defend;
                    break;
                }
                Some(_) => {
                    score += weights.capture;
                    break;
                }
            }
            current = next;
        }
    }
    score
}

/// Scores knight jumps: off the board -3, empty 0, friend 2, enemy 3.
fn knight_mobility(position: &Position, from: Square, color: Color) -> i32 {
    KNIGHT_JUMPS
        .iter()
        .map(|&(df, dr)| match from.offset(df, dr) {
            None => -3,
            Some(to) => match position.piece_at(to) {
                None => 0,
                Some(piece) if piece.color() == color => 2,
                Some(_) => 3,
            },
        })
        .sum()
}
