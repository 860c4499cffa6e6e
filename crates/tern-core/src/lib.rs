//! Packed codec types for the tern chess engine.
//!
//! Everything in this crate is plain data with bit-level encodings:
//! - [`Piece`] and [`PieceKind`], a 5-bit color + type code where sliding
//!   pieces are type-tagged so axis tests are single bit masks
//! - [`Square`], [`File`], and [`Rank`] for board coordinates
//! - [`Move`], a 16-bit (start, destination, kind) value
//! - [`CastlingRights`] and [`CastleSide`] for castling state and geometry
//! - [`PositionRecord`], the validated input a position is built from,
//!   with a FEN reader and writer at the boundary

mod castling;
mod color;
mod fen;
mod mov;
mod piece;
mod record;
mod square;

pub use castling::{CastleSide, CastlingRights};
pub use color::Color;
pub use fen::{FenError, STARTPOS};
pub use mov::{Move, MoveKind, MoveParseError, UciMove};
pub use piece::{Piece, PieceKind};
pub use record::{PositionRecord, RecordError};
pub use square::{File, Rank, Square};
