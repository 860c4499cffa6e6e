//! Trial-and-error magic search.
//!
//! Candidates are sparse random numbers (the AND of three draws), which hash
//! blocker sets far better than uniform ones. A candidate that spreads the
//! mask into fewer than six of the top eight bits is rejected before the
//! full collision check.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Write;
use tern_core::Square;
use tern_engine::movegen::magics::{magic_is_valid, relevant_mask};
use tern_engine::Slider;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FinderError {
    #[error("no {slider} magic found for {square} after {attempts} attempts")]
    Exhausted {
        slider: Slider,
        square: Square,
        attempts: u64,
    },
}

pub struct MagicFinder {
    rng: StdRng,
    max_attempts: u64,
}

impl MagicFinder {
    /// A finder whose output depends only on `seed`.
    pub fn new(seed: u64, max_attempts: u64) -> Self {
        MagicFinder {
            rng: StdRng::seed_from_u64(seed),
            max_attempts,
        }
    }

    fn sparse_candidate(&mut self) -> u64 {
        self.rng.random::<u64>() & self.rng.random::<u64>() & self.rng.random::<u64>()
    }

    /// Finds a magic for one square. Returns it with the number of
    /// candidates tried.
    pub fn find(&mut self, slider: Slider, sq: Square) -> Result<(u64, u64), FinderError> {
        let mask = relevant_mask(slider, sq).0;
        for attempt in 1..=self.max_attempts {
            let magic = self.sparse_candidate();
            if (mask.wrapping_mul(magic) & 0xFF00_0000_0000_0000).count_ones() < 6 {
                continue;
            }
            if magic_is_valid(slider, sq, magic) {
                return Ok((magic, attempt));
            }
        }
        Err(FinderError::Exhausted {
            slider,
            square: sq,
            attempts: self.max_attempts,
        })
    }

    /// Finds magics for all 64 squares, a1 first.
    pub fn find_all(&mut self, slider: Slider) -> Result<[u64; 64], FinderError> {
        let mut magics = [0u64; 64];
        for (index, magic) in magics.iter_mut().enumerate() {
            let sq = Square::from_bits(index as u32);
            let (found, attempts) = self.find(slider, sq)?;
            tracing::debug!(%slider, square = %sq, attempts, "found magic {:#018x}", found);
            *magic = found;
        }
        Ok(magics)
    }
}

/// Formats a table as a Rust constant, four values per line.
pub fn render_table(name: &str, magics: &[u64; 64]) -> String {
    let mut out = format!("pub const {}: [u64; 64] = [\n", name);
    for row in magics.chunks(4) {
        out.push_str("   ");
        for magic in row {
            // Writing to a String cannot fail.
            let _ = write!(out, " {:#018x},", magic);
        }
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bishop_magics_are_valid() {
        let mut finder = MagicFinder::new(7, 1_000_000);
        for sq in [Square::A1, Square::H8, Square::from_algebraic("d4").unwrap()] {
            let (magic, attempts) = finder.find(Slider::Bishop, sq).unwrap();
            assert!(magic_is_valid(Slider::Bishop, sq, magic));
            assert!(attempts >= 1);
        }
    }

    #[test]
    fn rook_magic_is_valid() {
        let sq = Square::from_algebraic("e4").unwrap();
        let (magic, _) = MagicFinder::new(11, 10_000_000)
            .find(Slider::Rook, sq)
            .unwrap();
        assert!(magic_is_valid(Slider::Rook, sq, magic));
    }

    #[test]
    fn same_seed_same_output() {
        let sq = Square::from_algebraic("c6").unwrap();
        let a = MagicFinder::new(42, 1_000_000).find(Slider::Bishop, sq).unwrap();
        let b = MagicFinder::new(42, 1_000_000).find(Slider::Bishop, sq).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn exhausted_budget_is_reported() {
        let err = MagicFinder::new(1, 0).find(Slider::Rook, Square::A1).unwrap_err();
        assert_eq!(
            err,
            FinderError::Exhausted {
                slider: Slider::Rook,
                square: Square::A1,
                attempts: 0
            }
        );
    }

    #[test]
    fn rendered_table_is_rust_source() {
        let magics = [0x1u64; 64];
        let text = render_table("ROOK_MAGICS", &magics);
        assert!(text.starts_with("pub const ROOK_MAGICS: [u64; 64] = [\n"));
        assert!(text.ends_with("];\n"));
        assert_eq!(text.matches("0x0000000000000001,").count(), 64);
        assert_eq!(text.lines().count(), 18);
    }
}
