//! Zobrist hashing for position identification
//!
//! The digest covers cell contents only, so two boards holding the same
//! stones hash identically whatever order the stones were played in.
//! Keys come from a fixed-seed generator: the same position hashes to the
//! same value in every process, which the learning store relies on.
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Board, Pos, Stone, ZobristTable};
//!
//! let mut board = Board::new();
//! board.apply(Pos::new(7, 7), Stone::Black);
//!
//! let incremental = board.hash();
//! let full = ZobristTable::global().hash(&board);
//! assert_eq!(incremental, full);
//! ```

use std::fmt;
use std::sync::OnceLock;

use super::{Board, Pos, Stone, TOTAL_CELLS};

/// Content digest of a board position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PositionHash(pub u64);

impl fmt::Display for PositionHash {
    /// 16 lower-case hex digits; this is the persisted key format.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Zobrist hash table for position hashing.
///
/// Uses XOR-based hashing with precomputed random values for each
/// (position, stone color) combination. Placing and removing a stone are
/// the same O(1) XOR.
pub struct ZobristTable {
    black: [u64; TOTAL_CELLS],
    white: [u64; TOTAL_CELLS],
}

static GLOBAL: OnceLock<ZobristTable> = OnceLock::new();

impl ZobristTable {
    /// Create a table with deterministic pseudo-random keys.
    #[must_use]
    pub fn new() -> Self {
        // Knuth's MMIX LCG, fixed seed
        let mut seed: u64 = 0x1234_5678_9ABC_DEF0;
        let mut next_rand = || {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            // Mix the high bits down; raw LCG low bits are weak
            let mut z = seed;
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            z ^ (z >> 31)
        };

        let mut black = [0u64; TOTAL_CELLS];
        let mut white = [0u64; TOTAL_CELLS];
        for i in 0..TOTAL_CELLS {
            black[i] = next_rand();
            white[i] = next_rand();
        }

        Self { black, white }
    }

    /// Process-wide shared table
    pub fn global() -> &'static ZobristTable {
        GLOBAL.get_or_init(ZobristTable::new)
    }

    /// Key for a single stone
    #[inline]
    #[must_use]
    pub fn key(&self, pos: Pos, stone: Stone) -> u64 {
        match stone {
            Stone::Black => self.black[pos.to_index()],
            Stone::White => self.white[pos.to_index()],
            Stone::Empty => 0,
        }
    }

    /// Full recomputation over every stone on the board.
    #[must_use]
    pub fn hash(&self, board: &Board) -> PositionHash {
        let mut h = 0u64;
        for pos in board.stones(Stone::Black).iter_ones() {
            h ^= self.black[pos.to_index()];
        }
        for pos in board.stones(Stone::White).iter_ones() {
            h ^= self.white[pos.to_index()];
        }
        PositionHash(h)
    }

    /// Incremental update; XOR is its own inverse so this serves both
    /// placement and removal.
    #[inline]
    #[must_use]
    pub fn toggle(&self, hash: PositionHash, pos: Pos, stone: Stone) -> PositionHash {
        PositionHash(hash.0 ^ self.key(pos, stone))
    }
}

impl Default for ZobristTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zobrist_empty_board() {
        let board = Board::new();
        assert_eq!(ZobristTable::global().hash(&board), PositionHash(0));
    }

    #[test]
    fn test_zobrist_deterministic_across_tables() {
        let a = ZobristTable::new();
        let b = ZobristTable::new();
        let pos = Pos::new(3, 11);
        assert_eq!(a.key(pos, Stone::Black), b.key(pos, Stone::Black));
        assert_eq!(a.key(pos, Stone::White), b.key(pos, Stone::White));
    }

    #[test]
    fn test_zobrist_colors_differ() {
        let zt = ZobristTable::new();
        let pos = Pos::new(7, 7);
        assert_ne!(zt.key(pos, Stone::Black), zt.key(pos, Stone::White));
        assert_eq!(zt.key(pos, Stone::Empty), 0);
    }

    #[test]
    fn test_zobrist_keys_unique() {
        let zt = ZobristTable::new();
        let mut seen = std::collections::HashSet::new();
        for idx in 0..TOTAL_CELLS {
            let pos = Pos::from_index(idx);
            assert!(seen.insert(zt.key(pos, Stone::Black)));
            assert!(seen.insert(zt.key(pos, Stone::White)));
        }
    }

    #[test]
    fn test_toggle_is_involution() {
        let zt = ZobristTable::global();
        let h = PositionHash(0xDEAD_BEEF);
        let pos = Pos::new(1, 2);
        assert_eq!(zt.toggle(zt.toggle(h, pos, Stone::White), pos, Stone::White), h);
    }

    #[test]
    fn test_display_is_16_hex_digits() {
        assert_eq!(PositionHash(0xAB).to_string(), "00000000000000ab");
        assert_eq!(PositionHash(u64::MAX).to_string().len(), 16);
    }
}
