//! Zobrist hashing keys.
//!
//! A position hash is the XOR of:
//! - one key per (color, piece type, square) for every occupied square
//! - one key per castling-rights value (16 values)
//! - one key per en-passant state (8 files plus "none")
//! - the black-to-move key when black is on move
//!
//! Keys are generated at compile time from a fixed seed so hashes are
//! reproducible across runs.

use tern_core::{CastlingRights, File, Piece, Square};

/// Index of the "no en passant file" key.
const NO_EN_PASSANT: usize = 8;

/// The full key set. Owned by [`crate::Engine`].
pub struct ZobristKeys {
    pieces: [[[u64; 64]; 6]; 2],
    castling: [u64; 16],
    en_passant: [u64; 9],
    black_to_move: u64,
}

impl ZobristKeys {
    /// Generates the keys with a xorshift64 stream from a fixed seed.
    pub const fn new() -> Self {
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut castling = [0u64; 16];
        let mut en_passant = [0u64; 9];

        let mut color = 0;
        while color < 2 {
            let mut kind = 0;
            while kind < 6 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[color][kind][square] = state;
                    square += 1;
                }
                kind += 1;
            }
            color += 1;
        }

        let mut i = 0;
        while i < 16 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 9 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        let black_to_move = next_random(state);

        ZobristKeys {
            pieces,
            castling,
            en_passant,
            black_to_move,
        }
    }

    #[inline]
    pub const fn piece(&self, piece: Piece, sq: Square) -> u64 {
        self.pieces[piece.color().index()][piece.kind().index()][sq.index() as usize]
    }

    #[inline]
    pub const fn castling(&self, rights: CastlingRights) -> u64 {
        self.castling[rights.raw() as usize]
    }

    #[inline]
    pub const fn en_passant(&self, file: Option<File>) -> u64 {
        match file {
            Some(file) => self.en_passant[file.index() as usize],
            None => self.en_passant[NO_EN_PASSANT],
        }
    }

    #[inline]
    pub const fn black_to_move(&self) -> u64 {
        self.black_to_move
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}
