//! Bitboard chess engine: move generation, search and evaluation.
//!
//! This crate provides:
//! - [`Engine`] - immutable attack tables and Zobrist keys, built once
//! - [`Position`] - mutable game state with exact apply/undo and a scoped
//!   [`MoveGuard`]
//! - Pseudo-legal and legal move generation, attack maps and perft
//! - [`Searcher`] - iterative-deepening alpha-beta with a transposition table
//! - [`evaluate`] - material, piece-square and pawn-structure evaluation
//!
//! # Architecture
//!
//! Each piece type and color has a 64-bit board where each bit represents a
//! square. Sliding attacks come from magic bitboard tables owned by the
//! [`Engine`], which every [`Position`] borrows.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tern_engine::{Engine, EngineConfig, Position, SearchLimit, Searcher};
//!
//! let engine = Engine::new();
//! let mut position = Position::startpos(&engine);
//! let mut searcher = Searcher::new(&EngineConfig::default());
//!
//! let report = searcher.search(&mut position, SearchLimit::Time(Duration::from_millis(50)));
//! let best = report.best_move.unwrap();
//! assert!(tern_engine::legal_moves(&mut position).contains(best));
//! ```

mod bitboard;
mod config;
mod engine;
mod eval;
pub mod movegen;
mod position;
mod search;
pub mod tt;
mod zobrist;

pub use bitboard::{Bitboard, BitboardIter};
pub use config::{EngineConfig, EvalConfig, SearchConfig};
pub use engine::Engine;
pub use eval::{evaluate, game_phase};
pub use movegen::magics::{MagicError, Slider, SliderTables, BISHOP_MAGICS, ROOK_MAGICS};
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    attacked_squares, castle_path_is_safe, cull_illegal_moves, find_move, is_legal,
    is_pseudo_legal, is_square_attacked, legal_destinations, legal_moves, pseudo_legal_moves,
    MoveList,
};
pub use position::{MoveGuard, Position, PositionError, LAYER_NAMES};
pub use search::{
    Score, SearchLimit, SearchReport, Searcher, INFINITY, KING_CAPTURED, MATE, MAX_DEPTH,
};
pub use tt::{Probe, TranspositionTable, TtStats};
pub use zobrist::ZobristKeys;
