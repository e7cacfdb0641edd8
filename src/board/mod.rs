//! Board representation for Gomoku

pub mod bitboard;
pub mod board;
pub mod zobrist;


// Re-exports
pub use bitboard::Bitboard;
pub use board::{Board, Move};
pub use zobrist::{PositionHash, ZobristTable};

/// Board size (15x15)
pub const BOARD_SIZE: usize = 15;
pub const TOTAL_CELLS: usize = BOARD_SIZE * BOARD_SIZE; // 225

/// Chebyshev radius around occupied cells that defines the candidate set
pub const CANDIDATE_RADIUS: i32 = 2;

/// Cell states. Black moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Stone {
    Empty,
    Black,
    White,
}

impl Stone {
    /// Get opponent color
    #[inline]
    pub fn opponent(self) -> Stone {
        match self {
            Stone::Black => Stone::White,
            Stone::White => Stone::Black,
            Stone::Empty => Stone::Empty,
        }
    }
}

/// Position on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    #[inline]
    pub fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < BOARD_SIZE as u8 && col < BOARD_SIZE as u8);
        Self { row, col }
    }

    /// Checked constructor for untrusted coordinates
    #[inline]
    pub fn try_new(row: i32, col: i32) -> Option<Self> {
        if Self::is_valid(row, col) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(Self { row: row as u8, col: col as u8 })
        } else {
            None
        }
    }

    #[inline]
    pub fn to_index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Self {
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    #[inline]
    pub fn is_valid(row: i32, col: i32) -> bool {
        row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
    }

    /// Step `k` cells along direction (dr, dc), if still on the board
    #[inline]
    pub fn offset(self, dr: i32, dc: i32, k: i32) -> Option<Pos> {
        Self::try_new(i32::from(self.row) + dr * k, i32::from(self.col) + dc * k)
    }

    /// Chebyshev distance between two cells
    #[inline]
    pub fn distance(self, other: Pos) -> u8 {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Board center (7, 7)
    #[inline]
    pub fn center() -> Pos {
        Pos::new((BOARD_SIZE / 2) as u8, (BOARD_SIZE / 2) as u8)
    }

    /// `"row,col"` move key used by the learning store
    pub fn key(self) -> String {
        format!("{},{}", self.row, self.col)
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_index().cmp(&other.to_index())
    }
}
