//! Mutable chess position with exact apply/undo.
//!
//! A [`Position`] keeps a 64-entry board, per-type and per-color bitboards,
//! a king-square cache and an incrementally maintained Zobrist hash. Every
//! [`Position::apply`] pushes a packed [`Snapshot`] of the irreversible state
//! together with the previous hash, and [`Position::undo`] restores both from
//! those stacks instead of recomputing them.

use crate::movegen::{self, attacks::pawn_attacks};
use crate::{Bitboard, Engine};
use std::fmt;
use std::ops::{Deref, DerefMut};
use tern_core::{
    CastleSide, CastlingRights, Color, FenError, File, Move, MoveKind, Piece, PieceKind,
    PositionRecord, Rank, RecordError, Square,
};
use thiserror::Error;

/// Errors raised at the position boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("move {0} is not pseudo-legal in this position")]
    NotPseudoLegal(Move),
}

/// Names accepted by [`Position::layer`].
pub const LAYER_NAMES: &[&str] = &[
    "wk", "wq", "wr", "wb", "wn", "wp", "bk", "bq", "br", "bb", "bn", "bp", "ak", "aq", "ar",
    "ab", "an", "ap", "wo", "bo", "fo", "fi", "eo", "ei", "ao", "ai", "wa", "ba", "pa", "km",
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "f0", "f1", "f2", "f3", "f4", "f5", "f6",
    "f7",
];

/// Irreversible state saved by one apply, packed into 64 bits:
///
/// | bits  | field                           |
/// |-------|---------------------------------|
/// | 0-3   | castling rights                 |
/// | 4-8   | captured piece code (0 = none)  |
/// | 9-12  | en passant file (8 = none)      |
/// | 13-20 | halfmove clock                  |
/// | 21-36 | the move                        |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Snapshot(u64);

impl Snapshot {
    fn pack(
        castling: CastlingRights,
        captured: Option<Piece>,
        en_passant: Option<File>,
        halfmove_clock: u8,
        mv: Move,
    ) -> Self {
        let captured = captured.map_or(0, Piece::code) as u64;
        let en_passant = en_passant.map_or(8, File::index) as u64;
        Snapshot(
            castling.raw() as u64
                | captured << 4
                | en_passant << 9
                | (halfmove_clock as u64) << 13
                | (mv.raw() as u64) << 21,
        )
    }

    fn castling(self) -> CastlingRights {
        CastlingRights::new((self.0 & 0xF) as u8)
    }

    fn captured(self) -> Option<Piece> {
        Piece::from_code(((self.0 >> 4) & 0x1F) as u8)
    }

    fn en_passant(self) -> Option<File> {
        File::from_index(((self.0 >> 9) & 0xF) as u8)
    }

    fn halfmove_clock(self) -> u8 {
        ((self.0 >> 13) & 0xFF) as u8
    }

    fn mv(self) -> Option<Move> {
        Move::from_raw(((self.0 >> 21) & 0xFFFF) as u16)
    }
}

/// The mutable root entity searched and generated from.
#[derive(Clone)]
pub struct Position<'e> {
    engine: &'e Engine,
    board: [Option<Piece>; 64],
    pieces: [Bitboard; 6],
    colors: [Bitboard; 2],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<File>,
    halfmove_clock: u8,
    fullmove_number: u16,
    kings: [Square; 2],
    history: Vec<Snapshot>,
    hashes: Vec<u64>,
    hash: u64,
}

impl<'e> Position<'e> {
    /// Builds a position from a record, validating it first.
    pub fn new(engine: &'e Engine, record: &PositionRecord) -> Result<Self, PositionError> {
        record.validate()?;

        let mut position = Position {
            engine,
            board: [None; 64],
            pieces: [Bitboard::EMPTY; 6],
            colors: [Bitboard::EMPTY; 2],
            side_to_move: record.side_to_move,
            castling: record.castling,
            en_passant: record.en_passant,
            halfmove_clock: record.halfmove_clock,
            fullmove_number: record.fullmove_number,
            kings: [Square::E1, Square::E8],
            history: Vec::new(),
            hashes: Vec::new(),
            hash: 0,
        };

        for (index, piece) in record.board.iter().enumerate() {
            if let Some(piece) = *piece {
                let sq = Square::from_bits(index as u32);
                position.put_piece(piece, sq);
                if piece.kind() == PieceKind::King {
                    position.kings[piece.color().index()] = sq;
                }
            }
        }
        position.hash = position.hash_board();

        Ok(position)
    }

    /// Parses a FEN string and builds the position from it. A FEN that
    /// parses but describes an unplayable position is reported as
    /// [`PositionError::Record`], the same as from [`Position::new`].
    pub fn from_fen(engine: &'e Engine, fen: &str) -> Result<Self, PositionError> {
        let record = PositionRecord::from_fen(fen).map_err(|err| match err {
            FenError::Record(err) => PositionError::Record(err),
            err => PositionError::Fen(err),
        })?;
        Self::new(engine, &record)
    }

    /// The standard starting position.
    pub fn startpos(engine: &'e Engine) -> Self {
        Self::new(engine, &PositionRecord::startpos()).expect("start position is valid")
    }

    /// Copies the current state out as a record.
    pub fn to_record(&self) -> PositionRecord {
        PositionRecord {
            board: self.board,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    pub fn to_fen(&self) -> String {
        self.to_record().to_fen()
    }

    #[inline]
    pub fn engine(&self) -> &'e Engine {
        self.engine
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<File> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u8 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index() as usize]
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Pieces of one type and color.
    #[inline]
    pub fn pieces_of(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()] & self.colors[color.index()]
    }

    /// Pieces of one type, both colors.
    #[inline]
    pub fn pieces(&self, kind: PieceKind) -> Bitboard {
        self.pieces[kind.index()]
    }

    /// All pieces of one color.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.colors[color.index()]
    }

    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// Number of moves applied since construction.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// The incrementally maintained Zobrist hash.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Recomputes the Zobrist hash from scratch.
    pub fn hash_board(&self) -> u64 {
        let keys = self.engine.zobrist();
        let mut hash = keys.castling(self.castling) ^ keys.en_passant(self.en_passant);
        if self.side_to_move == Color::Black {
            hash ^= keys.black_to_move();
        }
        for sq in self.occupied() {
            if let Some(piece) = self.piece_at(sq) {
                hash ^= keys.piece(piece, sq);
            }
        }
        hash
    }

    /// The most recently applied move.
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().and_then(|s| s.mv())
    }

    /// Piece captured by the most recent apply, if any.
    pub fn last_capture(&self) -> Option<Piece> {
        self.history.last().and_then(|s| s.captured())
    }

    /// True if the side to move's king is attacked.
    pub fn is_check(&self) -> bool {
        let us = self.side_to_move;
        movegen::is_square_attacked(self, self.king_square(us), us.opposite())
    }

    /// True if the side to move could capture the opponent's king, i.e. the
    /// previous move left its own king attacked.
    pub fn king_capturable(&self) -> bool {
        let us = self.side_to_move;
        movegen::is_square_attacked(self, self.king_square(us.opposite()), us)
    }

    /// Plays a pseudo-legal move.
    ///
    /// # Panics
    ///
    /// Panics if the start square is empty. Moves that came from
    /// [`crate::pseudo_legal_moves`] on this position never are.
    pub fn apply(&mut self, mv: Move) {
        let engine = self.engine;
        let keys = engine.zobrist();
        let us = self.side_to_move;
        let (from, to, kind) = (mv.from(), mv.to(), mv.kind());
        let moving = self
            .piece_at(from)
            .expect("apply called with an empty start square");

        let victim_sq = if kind == MoveKind::EnPassant {
            Square::new(to.file(), from.rank())
        } else {
            to
        };
        let captured = self.piece_at(victim_sq);

        self.history.push(Snapshot::pack(
            self.castling,
            captured,
            self.en_passant,
            self.halfmove_clock,
            mv,
        ));
        self.hashes.push(self.hash);

        let mut hash = self.hash ^ keys.castling(self.castling) ^ keys.en_passant(self.en_passant);

        if let Some(victim) = captured {
            self.remove_piece(victim, victim_sq);
            hash ^= keys.piece(victim, victim_sq);
        }

        let placed = match kind.promotion_piece() {
            Some(promoted) => Piece::new(us, promoted),
            None => moving,
        };
        self.remove_piece(moving, from);
        self.put_piece(placed, to);
        hash ^= keys.piece(moving, from) ^ keys.piece(placed, to);

        if kind == MoveKind::Castle {
            if let Some(side) = CastleSide::from_king_target(to) {
                let rook = Piece::new(us, PieceKind::Rook);
                let (rook_from, rook_to) = side.rook_squares(us);
                self.remove_piece(rook, rook_from);
                self.put_piece(rook, rook_to);
                hash ^= keys.piece(rook, rook_from) ^ keys.piece(rook, rook_to);
            }
        }

        if moving.kind() == PieceKind::King {
            self.kings[us.index()] = to;
            self.castling.remove_color(us);
        }
        self.castling.touch(from);
        self.castling.touch(to);

        self.en_passant = match kind {
            MoveKind::DoublePush => Some(from.file()),
            _ => None,
        };

        if moving.kind() == PieceKind::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = us.opposite();
        hash ^= keys.castling(self.castling)
            ^ keys.en_passant(self.en_passant)
            ^ keys.black_to_move();
        self.hash = hash;
    }

    /// Plays `mv` after checking that it is pseudo-legal here.
    pub fn try_apply(&mut self, mv: Move) -> Result<(), PositionError> {
        if !movegen::is_pseudo_legal(self, mv) {
            return Err(PositionError::NotPseudoLegal(mv));
        }
        self.apply(mv);
        Ok(())
    }

    /// Takes back the most recent move. Returns `None` when no move has been
    /// applied.
    pub fn undo(&mut self) -> Option<Move> {
        let snapshot = *self.history.last()?;
        let mv = snapshot
            .mv()
            .expect("history holds only moves packed by apply");
        let (from, to, kind) = (mv.from(), mv.to(), mv.kind());
        let us = self.side_to_move.opposite();
        let placed = self
            .piece_at(to)
            .expect("destination of the last move is occupied");
        self.history.pop();
        let hash = self
            .hashes
            .pop()
            .expect("hash stack is as deep as the history");

        let moving = if kind.is_promotion() {
            Piece::new(us, PieceKind::Pawn)
        } else {
            placed
        };
        self.remove_piece(placed, to);
        self.put_piece(moving, from);

        if let Some(victim) = snapshot.captured() {
            let victim_sq = if kind == MoveKind::EnPassant {
                Square::new(to.file(), from.rank())
            } else {
                to
            };
            self.put_piece(victim, victim_sq);
        }

        if kind == MoveKind::Castle {
            if let Some(side) = CastleSide::from_king_target(to) {
                let rook = Piece::new(us, PieceKind::Rook);
                let (rook_from, rook_to) = side.rook_squares(us);
                self.remove_piece(rook, rook_to);
                self.put_piece(rook, rook_from);
            }
        }

        if moving.kind() == PieceKind::King {
            self.kings[us.index()] = from;
        }

        self.castling = snapshot.castling();
        self.en_passant = snapshot.en_passant();
        self.halfmove_clock = snapshot.halfmove_clock();
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_sub(1);
        }
        self.side_to_move = us;
        self.hash = hash;

        Some(mv)
    }

    /// Plays `mv` and returns a guard that takes it back when dropped.
    pub fn make(&mut self, mv: Move) -> MoveGuard<'_, 'e> {
        self.apply(mv);
        MoveGuard { position: self }
    }

    /// A named bitboard for debug display. See [`LAYER_NAMES`].
    pub fn layer(&self, name: &str) -> Option<Bitboard> {
        let us = self.side_to_move;
        let mut chars = name.chars();
        let (first, second) = (chars.next()?, chars.next()?);
        if chars.next().is_some() {
            return None;
        }

        let piece_layer = PieceKind::from_char(second).filter(|_| second.is_ascii_lowercase());
        let layer = match (first, second) {
            ('w' | 'b' | 'a', _) if piece_layer.is_some() => {
                let kind = piece_layer?;
                match first {
                    'w' => self.pieces_of(Color::White, kind),
                    'b' => self.pieces_of(Color::Black, kind),
                    _ => self.pieces(kind),
                }
            }
            ('w', 'o') => self.occupied_by(Color::White),
            ('b', 'o') => self.occupied_by(Color::Black),
            ('f', 'o') => self.occupied_by(us),
            ('f', 'i') => !self.occupied_by(us),
            ('e', 'o') => self.occupied_by(us.opposite()),
            ('e', 'i') => !self.occupied_by(us.opposite()),
            ('a', 'o') => self.occupied(),
            ('a', 'i') => !self.occupied(),
            ('w', 'a') => movegen::attacked_squares(self, Color::White),
            ('b', 'a') => movegen::attacked_squares(self, Color::Black),
            ('p', 'a') => self
                .pieces_of(us, PieceKind::Pawn)
                .into_iter()
                .fold(Bitboard::EMPTY, |acc, sq| acc | pawn_attacks(sq, us)),
            ('k', 'm') => movegen::pseudo_legal_moves(self)
                .iter()
                .filter(|&&mv| movegen::is_capture(self, mv))
                .map(|mv| mv.to())
                .collect(),
            ('r', digit) => Bitboard::rank(Rank::from_index(digit.to_digit(8)? as u8)?),
            ('f', digit) => Bitboard::file(File::from_index(digit.to_digit(8)? as u8)?),
            _ => return None,
        };
        Some(layer)
    }

    #[inline]
    fn put_piece(&mut self, piece: Piece, sq: Square) {
        self.board[sq.index() as usize] = Some(piece);
        self.pieces[piece.kind().index()].set(sq);
        self.colors[piece.color().index()].set(sq);
    }

    #[inline]
    fn remove_piece(&mut self, piece: Piece, sq: Square) {
        self.board[sq.index() as usize] = None;
        self.pieces[piece.kind().index()].clear(sq);
        self.colors[piece.color().index()].clear(sq);
    }
}

impl fmt::Debug for Position<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Position")
            .field("fen", &self.to_fen())
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field("ply", &self.ply())
            .finish()
    }
}

/// An applied move that is taken back when the guard goes out of scope.
///
/// Dereferences to the position, so the guarded position can be searched
/// and generated from directly.
pub struct MoveGuard<'p, 'e> {
    position: &'p mut Position<'e>,
}

impl<'e> Deref for MoveGuard<'_, 'e> {
    type Target = Position<'e>;

    fn deref(&self) -> &Self::Target {
        self.position
    }
}

impl DerefMut for MoveGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.position
    }
}

impl Drop for MoveGuard<'_, '_> {
    fn drop(&mut self) {
        self.position.undo();
    }
}
