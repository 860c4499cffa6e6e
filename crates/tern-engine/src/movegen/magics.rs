//! Magic bitboard tables for sliding piece attack generation.
//!
//! For each square a slider's relevant blockers (its rays minus the board
//! edge) are hashed with a multiplicative magic into a dense attack table:
//! `((occupied & mask) * magic) >> shift`. The magic numbers are found
//! offline by `tern-magicgen` and shipped here as constants; building the
//! tables verifies that every magic maps blocker sets without destructive
//! collisions.

use crate::Bitboard;
use std::fmt;
use tern_core::Square;
use thiserror::Error;

/// The two sliding movement patterns. Queens use both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slider {
    Bishop,
    Rook,
}

impl Slider {
    pub const ALL: [Slider; 2] = [Slider::Bishop, Slider::Rook];

    const fn directions(self) -> [(i8, i8); 4] {
        match self {
            Slider::Bishop => [(1, 1), (1, -1), (-1, 1), (-1, -1)],
            Slider::Rook => [(0, 1), (0, -1), (1, 0), (-1, 0)],
        }
    }
}

impl fmt::Display for Slider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slider::Bishop => write!(f, "bishop"),
            Slider::Rook => write!(f, "rook"),
        }
    }
}

/// A magic that sends two blocker sets with different attacks to one slot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MagicError {
    #[error("{slider} magic {magic:#018x} for {square} has a destructive collision")]
    Collision {
        slider: Slider,
        square: Square,
        magic: u64,
    },
}

/// Magic entry for a single square.
#[derive(Debug, Clone, Copy, Default)]
pub struct SliderMagic {
    /// Relevant blocker squares (excludes the ray ends at the edge).
    pub mask: Bitboard,
    pub magic: u64,
    /// 64 minus the number of bits in `mask`.
    pub shift: u8,
    /// Start of this square's block in the shared attack table.
    pub offset: usize,
}

impl SliderMagic {
    #[inline]
    fn index(&self, occupied: Bitboard) -> usize {
        let relevant = occupied & self.mask;
        self.offset + (relevant.0.wrapping_mul(self.magic) >> self.shift) as usize
    }
}

/// Attack lookup for bishops and rooks on every square.
pub struct SliderTables {
    bishop: [SliderMagic; 64],
    rook: [SliderMagic; 64],
    attacks: Vec<Bitboard>,
}

impl SliderTables {
    /// Builds the tables from the shipped magic numbers.
    pub fn new() -> Self {
        Self::with_magics(&BISHOP_MAGICS, &ROOK_MAGICS)
            .expect("shipped magic numbers are collision-free")
    }

    /// Builds the tables from caller-supplied magics, failing on the first
    /// square whose magic collides.
    pub fn with_magics(
        bishop_magics: &[u64; 64],
        rook_magics: &[u64; 64],
    ) -> Result<Self, MagicError> {
        let mut tables = SliderTables {
            bishop: [SliderMagic::default(); 64],
            rook: [SliderMagic::default(); 64],
            attacks: Vec::new(),
        };

        for slider in Slider::ALL {
            let magics = match slider {
                Slider::Bishop => bishop_magics,
                Slider::Rook => rook_magics,
            };
            for index in 0..64u8 {
                let sq = Square::from_bits(index as u32);
                let mask = relevant_mask(slider, sq);
                let bits = mask.count();
                let entry = SliderMagic {
                    mask,
                    magic: magics[index as usize],
                    shift: (64 - bits) as u8,
                    offset: tables.attacks.len(),
                };
                tables
                    .attacks
                    .resize(entry.offset + (1usize << bits), Bitboard::EMPTY);
                if !fill(slider, sq, &entry, &mut tables.attacks) {
                    return Err(MagicError::Collision {
                        slider,
                        square: sq,
                        magic: entry.magic,
                    });
                }
                match slider {
                    Slider::Bishop => tables.bishop[index as usize] = entry,
                    Slider::Rook => tables.rook[index as usize] = entry,
                }
            }
        }

        Ok(tables)
    }

    /// Attacks of `slider` from `sq`, stopping at (and including) the first
    /// occupied square in each direction.
    #[inline]
    pub fn attacks(&self, slider: Slider, sq: Square, occupied: Bitboard) -> Bitboard {
        let entry = match slider {
            Slider::Bishop => &self.bishop[sq.index() as usize],
            Slider::Rook => &self.rook[sq.index() as usize],
        };
        self.attacks[entry.index(occupied)]
    }

    /// Total number of attack table slots.
    pub fn table_len(&self) -> usize {
        self.attacks.len()
    }
}

impl Default for SliderTables {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `magic` hashes every blocker subset of `sq` without a destructive
/// collision.
pub fn magic_is_valid(slider: Slider, sq: Square, magic: u64) -> bool {
    let mask = relevant_mask(slider, sq);
    let bits = mask.count();
    let entry = SliderMagic {
        mask,
        magic,
        shift: (64 - bits) as u8,
        offset: 0,
    };
    let mut table = vec![Bitboard::EMPTY; 1usize << bits];
    fill(slider, sq, &entry, &mut table)
}

/// Writes the attack set of every blocker subset into `table`. Slider attack
/// sets are never empty, so an empty slot is a free slot.
fn fill(slider: Slider, sq: Square, entry: &SliderMagic, table: &mut [Bitboard]) -> bool {
    // Carry-rippler enumeration of all subsets of the mask.
    let mut blockers = Bitboard::EMPTY;
    loop {
        let attacks = sliding_attacks(slider, sq, blockers);
        let slot = &mut table[entry.index(blockers)];
        if slot.is_empty() {
            *slot = attacks;
        } else if *slot != attacks {
            return false;
        }

        blockers = Bitboard(blockers.0.wrapping_sub(entry.mask.0) & entry.mask.0);
        if blockers.is_empty() {
            return true;
        }
    }
}

/// Blocker squares that can change the attack set of `slider` on `sq`: the
/// rays without their final edge square.
pub fn relevant_mask(slider: Slider, sq: Square) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for (df, dr) in slider.directions() {
        let mut current = sq.offset(df, dr);
        while let Some(step) = current {
            let next = step.offset(df, dr);
            if next.is_none() {
                break;
            }
            mask.set(step);
            current = next;
        }
    }
    mask
}

/// Ray-cast attack set, used to build the tables and to check magics.
pub fn sliding_attacks(slider: Slider, sq: Square, blockers: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for (df, dr) in slider.directions() {
        let mut current = sq.offset(df, dr);
        while let Some(step) = current {
            attacks.set(step);
            if blockers.contains(step) {
                break;
            }
            current = step.offset(df, dr);
        }
    }
    attacks
}

// Bishop magics (Chess Programming Wiki tables; b5 from tern-magicgen).
pub const BISHOP_MAGICS: [u64; 64] = [
    0x89a1121896040240,
    0x2004844802002010,
    0x2068080051921000,
    0x62880a0220200808,
    0x0004042004000000,
    0x0100822020200011,
    0xc00444222012000a,
    0x0028808801216001,
    0x0400492088408100,
    0x0201c401040c0084,
    0x00840800910a0010,
    0x0000082080240060,
    0x2000840504006000,
    0x30010c4108405004,
    0x1008005410080802,
    0x8144042209100900,
    0x0208081020014400,
    0x004800201208ca00,
    0x0f18140408012008,
    0x1004002802102001,
    0x0841000820080811,
    0x0040200200a42008,
    0x0000800054042000,
    0x88010400410c9000,
    0x0520040470104290,
    0x1004040051500081,
    0x2002081833080021,
    0x000400c00c010142,
    0x941408200c002000,
    0x0658810000806011,
    0x0188071040440a00,
    0x4800404002011c00,
    0x0104442040404200,
    0x0c02180490200100,
    0x0004022401120400,
    0x80c0040400080120,
    0x8040010040820802,
    0x0480810700020090,
    0x0102008e00040242,
    0x0809005202050100,
    0x8002024220104080,
    0x0431008804142000,
    0x0019001802081400,
    0x0200014208040080,
    0x3308082008200100,
    0x041010500040c020,
    0x4012020c04210308,
    0x208220a202004080,
    0x0111040120082000,
    0x6803040141280a00,
    0x2101004202410000,
    0x8200000041108022,
    0x0000021082088000,
    0x0002410204010040,
    0x0040100400809000,
    0x0822088220820214,
    0x0040808090012004,
    0x00910224040218c9,
    0x0402814422015008,
    0x0090014004842410,
    0x0001000042304105,
    0x0010008830412a00,
    0x2520081090008908,
    0x40102000a0a60140,
];

// Rook magics.
pub const ROOK_MAGICS: [u64; 64] = [
    0x0a8002c000108020,
    0x06c00049b0002001,
    0x0100200010090040,
    0x2480041000800801,
    0x0280028004000800,
    0x0900410008040022,
    0x0280020001001080,
    0x2880002041000080,
    0xa000800080400034,
    0x0004808020004000,
    0x2290802004801000,
    0x0411000d00100020,
    0x0402800800040080,
    0x000b000401004208,
    0x2409000100040200,
    0x0001002100004082,
    0x0022878001e24000,
    0x1090810021004010,
    0x0801030040200012,
    0x0500808008001000,
    0x0a08018014000880,
    0x8000808004000200,
    0x0201008080010200,
    0x0801020000441091,
    0x0000800080204005,
    0x1040200040100048,
    0x0000120200402082,
    0x0d14880480100080,
    0x0012040280080080,
    0x0100040080020080,
    0x9020010080800200,
    0x0813241200148449,
    0x0491604001800080,
    0x0100401000402001,
    0x4820010021001040,
    0x0400402202000812,
    0x0209009005000802,
    0x0810800601800400,
    0x4301083214000150,
    0x204026458e001401,
    0x0040204000808000,
    0x8001008040010020,
    0x8410820820420010,
    0x1003001000090020,
    0x0804040008008080,
    0x0012000810020004,
    0x1000100200040208,
    0x430000a044020001,
    0x0280009023410300,
    0x00e0100040002240,
    0x0000200100401700,
    0x2244100408008080,
    0x0008000400801980,
    0x0002000810040200,
    0x8010100228810400,
    0x2000009044210200,
    0x4080008040102101,
    0x0040002080411d01,
    0x2005524060000901,
    0x0502001008400422,
    0x489a000810200402,
    0x0001004400080a13,
    0x4000011008020084,
    0x0026002114058042,
];
