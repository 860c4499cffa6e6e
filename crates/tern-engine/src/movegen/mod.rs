//! Move generation.
//!
//! Pseudo-legal generation uses the leaper tables in [`attacks`] and the
//! magic slider tables in [`magics`]. Legality is decided afterwards by
//! [`cull_illegal_moves`], which plays each move and checks whether the
//! mover's king can be captured.

pub mod attacks;
pub mod magics;
pub mod perft;

use crate::{Bitboard, Position};
use attacks::{king_attacks, knight_attacks, pawn_attacks};
use std::cmp::Reverse;
use tern_core::{CastleSide, Color, Move, MoveKind, PieceKind, Rank, Square, UciMove};

/// Promotion choices in generation order.
const PROMOTIONS: [MoveKind; 4] = [
    MoveKind::PromoteQueen,
    MoveKind::PromoteKnight,
    MoveKind::PromoteRook,
    MoveKind::PromoteBishop,
];

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves the list holds.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::new(Square::A1, Square::A1, MoveKind::Quiet); Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }

    /// Moves `m` to the front, keeping the order of the others. Does nothing
    /// if `m` is not in the list.
    pub fn move_to_front(&mut self, m: Move) {
        if let Some(pos) = self.as_slice().iter().position(|&x| x == m) {
            self.moves[..=pos].rotate_right(1);
        }
    }

    /// Stable sort by kind priority, highest first.
    pub fn sort_by_priority(&mut self) {
        self.moves[..self.len].sort_by_key(|m| Reverse(m.kind().priority()));
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Generates every pseudo-legal move for the side to move, ordered by kind
/// priority.
///
/// Moves may leave the mover's king attacked. Castling only checks the
/// right and that the squares between king and rook are empty.
pub fn pseudo_legal_moves(position: &Position) -> MoveList {
    let mut moves = MoveList::new();

    generate_pawn_moves(position, &mut moves);
    generate_piece_moves(position, &mut moves);
    generate_castling_moves(position, &mut moves);

    moves.sort_by_priority();
    moves
}

/// Drops the moves that leave the mover's king capturable.
pub fn cull_illegal_moves(position: &mut Position, mut moves: MoveList) -> MoveList {
    moves.retain(|&m| is_legal(position, m));
    moves
}

/// Generates all legal moves, ordered by kind priority.
pub fn legal_moves(position: &mut Position) -> MoveList {
    let moves = pseudo_legal_moves(position);
    cull_illegal_moves(position, moves)
}

/// True if a pseudo-legal `m` does not leave the mover's king attacked.
pub fn is_legal(position: &mut Position, m: Move) -> bool {
    if m.kind() == MoveKind::Castle {
        return match CastleSide::from_king_target(m.to()) {
            Some(side) => castle_path_is_safe(position, side),
            None => false,
        };
    }
    let guard = position.make(m);
    !guard.king_capturable()
}

/// True if no square the king starts on, crosses or lands on is attacked.
pub fn castle_path_is_safe(position: &Position, side: CastleSide) -> bool {
    let us = position.side_to_move();
    let transit = Bitboard(side.transit_mask(us));
    (attacked_squares(position, us.opposite()) & transit).is_empty()
}

/// True if `m` is one of the pseudo-legal moves of this position.
pub fn is_pseudo_legal(position: &Position, m: Move) -> bool {
    match position.piece_at(m.from()) {
        Some(piece) if piece.color() == position.side_to_move() => {
            pseudo_legal_moves(position).contains(m)
        }
        _ => false,
    }
}

/// True if `m` removes an enemy piece from the board.
#[inline]
pub fn is_capture(position: &Position, m: Move) -> bool {
    m.kind() == MoveKind::EnPassant || position.piece_at(m.to()).is_some()
}

/// Legal destinations of the piece on `sq`.
pub fn legal_destinations(position: &mut Position, sq: Square) -> Bitboard {
    legal_moves(position)
        .iter()
        .filter(|m| m.from() == sq)
        .map(|m| m.to())
        .collect()
}

/// Resolves UCI notation to the legal move it names.
pub fn find_move(position: &mut Position, uci: &UciMove) -> Option<Move> {
    legal_moves(position).iter().copied().find(|&m| uci.matches(m))
}

/// Every square attacked by `color`. Pawns contribute only their diagonals.
pub fn attacked_squares(position: &Position, color: Color) -> Bitboard {
    let engine = position.engine();
    let occupied = position.occupied();
    let mut attacked = Bitboard::EMPTY;

    for sq in position.pieces_of(color, PieceKind::Pawn) {
        attacked |= pawn_attacks(sq, color);
    }
    for sq in position.pieces_of(color, PieceKind::Knight) {
        attacked |= knight_attacks(sq);
    }
    for sq in position.pieces_of(color, PieceKind::Bishop) {
        attacked |= engine.bishop_attacks(sq, occupied);
    }
    for sq in position.pieces_of(color, PieceKind::Rook) {
        attacked |= engine.rook_attacks(sq, occupied);
    }
    for sq in position.pieces_of(color, PieceKind::Queen) {
        attacked |= engine.queen_attacks(sq, occupied);
    }
    attacked | king_attacks(position.king_square(color))
}

/// Returns true if the given square is attacked by the given color.
pub fn is_square_attacked(position: &Position, sq: Square, by_color: Color) -> bool {
    let engine = position.engine();
    let occupied = position.occupied();

    let enemy_pawns = position.pieces_of(by_color, PieceKind::Pawn);
    if (pawn_attacks(sq, by_color.opposite()) & enemy_pawns).is_not_empty() {
        return true;
    }

    let enemy_knights = position.pieces_of(by_color, PieceKind::Knight);
    if (knight_attacks(sq) & enemy_knights).is_not_empty() {
        return true;
    }

    let enemy_king = position.pieces_of(by_color, PieceKind::King);
    if (king_attacks(sq) & enemy_king).is_not_empty() {
        return true;
    }

    let queens = position.pieces_of(by_color, PieceKind::Queen);
    let diagonal = position.pieces_of(by_color, PieceKind::Bishop) | queens;
    if (engine.bishop_attacks(sq, occupied) & diagonal).is_not_empty() {
        return true;
    }

    let straight = position.pieces_of(by_color, PieceKind::Rook) | queens;
    (engine.rook_attacks(sq, occupied) & straight).is_not_empty()
}

/// Kind of a non-promoting move from the victim on `to`, if any.
#[inline]
fn capture_or_quiet(position: &Position, to: Square) -> MoveKind {
    match position.piece_at(to) {
        Some(victim) => MoveKind::capture(victim.kind()),
        None => MoveKind::Quiet,
    }
}

/// Square one rank behind `to` from `us`'s point of view.
#[inline]
fn behind(to: Square, us: Color, ranks: u8) -> Square {
    let delta = 8 * ranks as u32;
    match us {
        Color::White => Square::from_bits(to.index() as u32 - delta),
        Color::Black => Square::from_bits(to.index() as u32 + delta),
    }
}

fn push_pawn_move(moves: &mut MoveList, from: Square, to: Square, kind: MoveKind, us: Color) {
    if to.rank() == us.promotion_rank() {
        for promotion in PROMOTIONS {
            moves.push(Move::new(from, to, promotion));
        }
    } else {
        moves.push(Move::new(from, to, kind));
    }
}

/// Generates pseudo-legal pawn moves.
fn generate_pawn_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let them = us.opposite();
    let their_pieces = position.occupied_by(them);
    let empty = !position.occupied();
    let pawns = position.pieces_of(us, PieceKind::Pawn);

    let forward = |bb: Bitboard| match us {
        Color::White => bb.north(),
        Color::Black => bb.south(),
    };

    let single_pushes = forward(pawns) & empty;
    for to in single_pushes {
        push_pawn_move(moves, behind(to, us, 1), to, MoveKind::Quiet, us);
    }

    let double_pushes =
        forward(forward(pawns & Bitboard::rank(us.pawn_rank())) & empty) & empty;
    for to in double_pushes {
        moves.push(Move::new(behind(to, us, 2), to, MoveKind::DoublePush));
    }

    for from in pawns {
        for to in pawn_attacks(from, us) & their_pieces {
            push_pawn_move(moves, from, to, capture_or_quiet(position, to), us);
        }
    }

    if let Some(file) = position.en_passant() {
        let target_rank = match us {
            Color::White => Rank::R6,
            Color::Black => Rank::R3,
        };
        let target = Square::new(file, target_rank);
        for from in pawn_attacks(target, them) & pawns {
            moves.push(Move::new(from, target, MoveKind::EnPassant));
        }
    }
}

/// Generates pseudo-legal knight, slider and king moves.
fn generate_piece_moves(position: &Position, moves: &mut MoveList) {
    let engine = position.engine();
    let us = position.side_to_move();
    let targets = !position.occupied_by(us);
    let occupied = position.occupied();

    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        for from in position.pieces_of(us, kind) {
            let attacks = match kind {
                PieceKind::Knight => knight_attacks(from),
                PieceKind::Bishop => engine.bishop_attacks(from, occupied),
                PieceKind::Rook => engine.rook_attacks(from, occupied),
                PieceKind::Queen => engine.queen_attacks(from, occupied),
                _ => king_attacks(from),
            };
            for to in attacks & targets {
                moves.push(Move::new(from, to, capture_or_quiet(position, to)));
            }
        }
    }
}

/// Generates castling moves whose right is held and whose path is clear.
fn generate_castling_moves(position: &Position, moves: &mut MoveList) {
    let us = position.side_to_move();
    let occupied = position.occupied();
    let king = CastleSide::king_start(us);

    if position.king_square(us) != king {
        return;
    }
    for side in CastleSide::BOTH {
        if position.castling().has(us, side)
            && (occupied & Bitboard(side.between_mask(us))).is_empty()
        {
            moves.push(Move::new(king, side.king_target(us), MoveKind::Castle));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;
    use tern_core::File;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn uci_list(moves: &MoveList) -> Vec<String> {
        let mut list: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
        list.sort();
        list
    }

    #[test]
    fn startpos_has_twenty_moves() {
        let engine = Engine::new();
        let mut pos = Position::startpos(&engine);
        assert_eq!(pseudo_legal_moves(&pos).len(), 20);
        assert_eq!(legal_moves(&mut pos).len(), 20);
    }

    #[test]
    fn moves_are_sorted_by_priority() {
        let engine = Engine::new();
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let pos = Position::from_fen(&engine, fen).unwrap();
        let moves = pseudo_legal_moves(&pos);
        let priorities: Vec<u8> = moves.iter().map(|m| m.kind().priority()).collect();
        assert!(priorities.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(moves[0].kind(), MoveKind::CaptureBishop);
    }

    #[test]
    fn capture_kinds_name_the_victim() {
        let engine = Engine::new();
        let pos = Position::from_fen(&engine, "4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let moves = pseudo_legal_moves(&pos);
        assert!(moves.contains(Move::new(sq("e4"), sq("d5"), MoveKind::CaptureQueen)));
        assert_eq!(moves[0], Move::new(sq("e4"), sq("d5"), MoveKind::CaptureQueen));
    }

    #[test]
    fn all_four_promotions_generated() {
        let engine = Engine::new();
        let mut pos = Position::from_fen(&engine, "1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let moves = legal_moves(&mut pos);
        let promotions: Vec<MoveKind> = moves
            .iter()
            .filter(|m| m.from() == sq("a7"))
            .map(|m| m.kind())
            .collect();
        assert_eq!(promotions.len(), 8);
        for kind in PROMOTIONS {
            assert_eq!(promotions.iter().filter(|&&k| k == kind).count(), 2);
        }
        assert_eq!(promotions[0], MoveKind::PromoteQueen);
        assert!(moves.contains(Move::new(sq("a7"), sq("b8"), MoveKind::PromoteKnight)));
    }

    #[test]
    fn en_passant_generated_from_both_sides() {
        let engine = Engine::new();
        let fen = "4k3/8/8/3PpP2/8/8/8/4K3 w - e6 0 2";
        let pos = Position::from_fen(&engine, fen).unwrap();
        let ep: Vec<String> = pseudo_legal_moves(&pos)
            .iter()
            .filter(|m| m.kind() == MoveKind::EnPassant)
            .map(|m| m.to_uci())
            .collect();
        assert_eq!(ep.len(), 2);
        assert!(ep.contains(&"d5e6".to_string()));
        assert!(ep.contains(&"f5e6".to_string()));
    }

    #[test]
    fn en_passant_exposing_king_is_illegal() {
        let engine = Engine::new();
        let mut pos = Position::from_fen(&engine, "8/8/8/K2Pp2r/8/8/8/4k3 w - e6 0 2").unwrap();
        let moves = legal_moves(&mut pos);
        assert!(!moves.iter().any(|m| m.kind() == MoveKind::EnPassant));
    }

    #[test]
    fn castling_requires_empty_between_squares() {
        let engine = Engine::new();
        let pos = Position::from_fen(&engine, "r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1").unwrap();
        assert!(!pseudo_legal_moves(&pos)
            .iter()
            .any(|m| m.kind() == MoveKind::Castle));
    }

    #[test]
    fn castling_through_attack_is_illegal() {
        let engine = Engine::new();
        // Black rook on f8 covers f1.
        let mut pos =
            Position::from_fen(&engine, "4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        let castles: Vec<String> = legal_moves(&mut pos)
            .iter()
            .filter(|m| m.kind() == MoveKind::Castle)
            .map(|m| m.to_uci())
            .collect();
        assert_eq!(castles, vec!["e1c1".to_string()]);
    }

    #[test]
    fn castling_out_of_check_is_illegal() {
        let engine = Engine::new();
        let mut pos = Position::from_fen(&engine, "4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(!legal_moves(&mut pos)
            .iter()
            .any(|m| m.kind() == MoveKind::Castle));
    }

    #[test]
    fn pinned_piece_cannot_move_off_line() {
        let engine = Engine::new();
        let mut pos = Position::from_fen(&engine, "4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let moves = legal_moves(&mut pos);
        assert!(!moves.iter().any(|m| m.from() == sq("e2")));
    }

    #[test]
    fn attacked_squares_use_pawn_diagonals() {
        let engine = Engine::new();
        let pos = Position::startpos(&engine);
        let attacked = attacked_squares(&pos, Color::White);
        assert!(attacked.contains(sq("d3")));
        assert!(!attacked.contains(sq("e4")));
        assert!(attacked.contains(sq("f3")));
        assert_eq!(attacked & Bitboard::rank(Rank::R4), Bitboard::EMPTY);
    }

    #[test]
    fn square_attack_detection() {
        let engine = Engine::new();
        let pos = Position::from_fen(&engine, "4k3/8/8/8/8/8/3p4/R3K3 w - - 0 1").unwrap();
        assert!(is_square_attacked(&pos, sq("e1"), Color::Black));
        assert!(is_square_attacked(&pos, sq("a8"), Color::White));
        assert!(!is_square_attacked(&pos, sq("b2"), Color::White));
        assert_eq!(
            attacked_squares(&pos, Color::Black).contains(sq("c1")),
            is_square_attacked(&pos, sq("c1"), Color::Black)
        );
    }

    #[test]
    fn pseudo_legal_check() {
        let engine = Engine::new();
        let pos = Position::startpos(&engine);
        assert!(is_pseudo_legal(&pos, Move::new(sq("e2"), sq("e4"), MoveKind::DoublePush)));
        assert!(!is_pseudo_legal(&pos, Move::new(sq("e2"), sq("e4"), MoveKind::Quiet)));
        assert!(!is_pseudo_legal(&pos, Move::new(sq("e7"), sq("e5"), MoveKind::DoublePush)));
        assert!(!is_pseudo_legal(&pos, Move::new(sq("e4"), sq("e5"), MoveKind::Quiet)));
    }

    #[test]
    fn destinations_and_uci_lookup() {
        let engine = Engine::new();
        let mut pos = Position::startpos(&engine);
        let dest = legal_destinations(&mut pos, sq("g1"));
        assert_eq!(dest, Bitboard::from_square(sq("f3")) | Bitboard::from_square(sq("h3")));
        assert_eq!(legal_destinations(&mut pos, sq("e1")), Bitboard::EMPTY);

        let uci: UciMove = "e2e4".parse().unwrap();
        assert_eq!(
            find_move(&mut pos, &uci),
            Some(Move::new(sq("e2"), sq("e4"), MoveKind::DoublePush))
        );
        let uci: UciMove = "e2e5".parse().unwrap();
        assert_eq!(find_move(&mut pos, &uci), None);
    }

    #[test]
    fn checkmate_has_no_legal_moves() {
        let engine = Engine::new();
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        let mut pos = Position::from_fen(&engine, fen).unwrap();
        assert!(pos.is_check());
        assert!(legal_moves(&mut pos).is_empty());
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn move_list_helpers() {
        let a = Move::new(sq("a2"), sq("a3"), MoveKind::Quiet);
        let b = Move::new(sq("b2"), sq("b4"), MoveKind::DoublePush);
        let c = Move::new(sq("c2"), sq("d3"), MoveKind::CapturePawn);
        let mut list = MoveList::new();
        for m in [a, b, c] {
            list.push(m);
        }
        list.move_to_front(b);
        assert_eq!(list.as_slice(), &[b, a, c]);
        list.sort_by_priority();
        assert_eq!(list.as_slice(), &[c, b, a]);
        list.retain(|m| m.from().file() != File::C);
        assert_eq!(uci_list(&list), vec!["a2a3".to_string(), "b2b4".to_string()]);
        list.clear();
        assert!(list.is_empty());
    }
}
