//! The immutable engine context: slider attack tables and Zobrist keys.

use crate::movegen::magics::{Slider, SliderTables};
use crate::zobrist::ZobristKeys;
use crate::Bitboard;
use tern_core::Square;

/// Read-only tables shared by every position and search.
///
/// Build one per process and pass it by reference; positions borrow it.
///
/// ```
/// use tern_engine::{Engine, Position};
///
/// let engine = Engine::new();
/// let mut position = Position::startpos(&engine);
/// assert_eq!(tern_engine::legal_moves(&mut position).len(), 20);
/// ```
pub struct Engine {
    sliders: SliderTables,
    zobrist: ZobristKeys,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            sliders: SliderTables::new(),
            zobrist: ZobristKeys::new(),
        }
    }

    /// Engine using caller-supplied slider tables, e.g. freshly generated
    /// magics under test.
    pub fn with_sliders(sliders: SliderTables) -> Self {
        Engine {
            sliders,
            zobrist: ZobristKeys::new(),
        }
    }

    #[inline]
    pub fn bishop_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.sliders.attacks(Slider::Bishop, sq, occupied)
    }

    #[inline]
    pub fn rook_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.sliders.attacks(Slider::Rook, sq, occupied)
    }

    #[inline]
    pub fn queen_attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        self.bishop_attacks(sq, occupied) | self.rook_attacks(sq, occupied)
    }

    #[inline]
    pub fn zobrist(&self) -> &ZobristKeys {
        &self.zobrist
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
