//! Transposition table.
//!
//! Open addressing over `2^bits` slots. The low `bits` of the hash pick the
//! home slot and the remaining high bits are kept as the tag. Both reads and
//! writes probe linearly, wrapping at the end, for at most [`MAX_PROBE`]
//! slots. A write that finds neither its tag nor a free slot in that window
//! is dropped and counted.

use tern_core::Move;

/// Longest probe sequence for reads and writes.
pub const MAX_PROBE: usize = 16;

const MIN_BITS: u8 = 1;
const MAX_BITS: u8 = 28;

#[derive(Debug, Clone, Copy)]
struct Slot {
    tag: u64,
    score: i32,
    depth: u8,
    best_move: Option<Move>,
}

/// Result of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// No entry for this hash.
    Miss,
    /// An entry too shallow to trust, but with a move worth trying first.
    HashMove(Move),
    /// An entry at least as deep as requested.
    Hit { score: i32, best_move: Option<Move> },
}

/// Counters since the last [`TranspositionTable::clear`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TtStats {
    pub probes: u64,
    pub hits: u64,
    pub writes: u64,
    pub dropped: u64,
}

pub struct TranspositionTable {
    slots: Vec<Option<Slot>>,
    bits: u8,
    mask: u64,
    stats: TtStats,
}

impl TranspositionTable {
    /// A table of `2^bits` slots, with `bits` clamped to 1..=28.
    pub fn new(bits: u8) -> Self {
        let bits = bits.clamp(MIN_BITS, MAX_BITS);
        TranspositionTable {
            slots: vec![None; 1usize << bits],
            bits,
            mask: (1u64 << bits) - 1,
            stats: TtStats::default(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots.
    pub fn occupancy(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    #[inline]
    pub fn stats(&self) -> TtStats {
        self.stats
    }

    /// Empties every slot and resets the counters.
    pub fn clear(&mut self) {
        self.slots.fill(None);
        self.stats = TtStats::default();
    }

    /// Stores an entry, replacing any entry with the same tag. Returns
    /// false when the probe window is full and the entry was dropped.
    pub fn write(&mut self, hash: u64, score: i32, depth: u8, best_move: Option<Move>) -> bool {
        let tag = hash >> self.bits;
        let home = (hash & self.mask) as usize;
        let len = self.slots.len();

        for i in 0..MAX_PROBE.min(len) {
            let index = (home + i) & (len - 1);
            match self.slots[index] {
                Some(slot) if slot.tag != tag => continue,
                _ => {
                    self.slots[index] = Some(Slot {
                        tag,
                        score,
                        depth,
                        best_move,
                    });
                    self.stats.writes += 1;
                    return true;
                }
            }
        }

        self.stats.dropped += 1;
        false
    }

    /// Looks up `hash`. Entries shallower than `min_depth` only yield their
    /// move.
    pub fn read(&mut self, hash: u64, min_depth: u8) -> Probe {
        self.stats.probes += 1;
        let tag = hash >> self.bits;
        let home = (hash & self.mask) as usize;
        let len = self.slots.len();

        for i in 0..MAX_PROBE.min(len) {
            let index = (home + i) & (len - 1);
            let Some(slot) = self.slots[index] else {
                return Probe::Miss;
            };
            if slot.tag != tag {
                continue;
            }
            if slot.depth >= min_depth {
                self.stats.hits += 1;
                return Probe::Hit {
                    score: slot.score,
                    best_move: slot.best_move,
                };
            }
            return match slot.best_move {
                Some(m) => Probe::HashMove(m),
                None => Probe::Miss,
            };
        }
        Probe::Miss
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}
