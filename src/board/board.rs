//! Board state with reversible moves and win detection

use std::cell::RefCell;

use log::debug;

use super::bitboard::Bitboard;
use super::zobrist::{PositionHash, ZobristTable};
use super::{Pos, Stone, CANDIDATE_RADIUS, TOTAL_CELLS};

/// A stone placed on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub pos: Pos,
    pub stone: Stone,
}

/// Game board.
///
/// All mutation goes through [`Board::apply`] and [`Board::undo`], which must
/// be paired in strict reverse order. Search code relies on this to walk the
/// tree in place instead of cloning the grid per node.
#[derive(Debug, Clone)]
pub struct Board {
    black: Bitboard,
    white: Bitboard,
    hash: PositionHash,
    history: Vec<Move>,
    win_line: Vec<Pos>,
    /// Candidate cells, rebuilt lazily after each mutation
    candidates: RefCell<Option<Vec<Pos>>>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            black: Bitboard::new(),
            white: Bitboard::new(),
            hash: PositionHash::default(),
            history: Vec::with_capacity(TOTAL_CELLS),
            win_line: Vec::new(),
            candidates: RefCell::new(None),
        }
    }

    /// Build a board by applying moves in order; illegal moves are skipped.
    pub fn from_moves(moves: &[(Pos, Stone)]) -> Self {
        let mut board = Self::new();
        for &(pos, stone) in moves {
            board.apply(pos, stone);
        }
        board
    }

    /// Get stone at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Stone {
        if self.black.get(pos) {
            Stone::Black
        } else if self.white.get(pos) {
            Stone::White
        } else {
            Stone::Empty
        }
    }

    #[inline]
    pub fn is_empty_at(&self, pos: Pos) -> bool {
        !self.black.get(pos) && !self.white.get(pos)
    }

    /// Place `stone` at `pos`.
    ///
    /// Returns false, leaving the board untouched, when `pos` is off the
    /// board, the cell is occupied, or `stone` is `Empty`.
    pub fn apply(&mut self, pos: Pos, stone: Stone) -> bool {
        if !Pos::is_valid(i32::from(pos.row), i32::from(pos.col)) || !self.is_empty_at(pos) {
            return false;
        }
        match stone {
            Stone::Black => self.black.set(pos),
            Stone::White => self.white.set(pos),
            Stone::Empty => return false,
        }
        self.hash = ZobristTable::global().toggle(self.hash, pos, stone);
        self.history.push(Move { pos, stone });
        self.win_line.clear();
        self.candidates.replace(None);
        true
    }

    /// [`Board::apply`] for raw coordinates that may be off the board
    pub fn apply_at(&mut self, row: i32, col: i32, stone: Stone) -> bool {
        match Pos::try_new(row, col) {
            Some(pos) => self.apply(pos, stone),
            None => false,
        }
    }

    /// Take back the stone at `pos`.
    ///
    /// No-op on an empty or off-board cell. Only the most recent move can be
    /// taken back; any other occupied cell is rejected and the board is left
    /// as is. Returns whether a stone was removed.
    pub fn undo(&mut self, pos: Pos) -> bool {
        if !Pos::is_valid(i32::from(pos.row), i32::from(pos.col)) || self.is_empty_at(pos) {
            return false;
        }
        let last = match self.history.last() {
            Some(m) if m.pos == pos => *m,
            _ => {
                debug!("rejected out-of-order undo at ({}, {})", pos.row, pos.col);
                return false;
            }
        };
        self.history.pop();
        match last.stone {
            Stone::Black => self.black.clear(pos),
            Stone::White => self.white.clear(pos),
            Stone::Empty => {}
        }
        self.hash = ZobristTable::global().toggle(self.hash, pos, last.stone);
        self.win_line.clear();
        self.candidates.replace(None);
        true
    }

    /// Clear the board back to its initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Occupancy bitboard of one color (empty for `Stone::Empty`)
    #[inline]
    pub fn stones(&self, stone: Stone) -> Bitboard {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
            Stone::Empty => Bitboard::new(),
        }
    }

    /// Total stones on board
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.history.len() as u32
    }

    #[inline]
    pub fn is_board_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.history.len() == TOTAL_CELLS
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().copied()
    }

    /// Moves in play order
    #[inline]
    pub fn moves(&self) -> &[Move] {
        &self.history
    }

    /// Winning run found by the last successful [`Board::check_win`]
    #[inline]
    pub fn win_line(&self) -> &[Pos] {
        &self.win_line
    }

    #[inline]
    pub fn hash(&self) -> PositionHash {
        self.hash
    }

    /// Did the last move win for `stone`?
    ///
    /// Only the last-move cell is examined, so call this right after the
    /// move in question. On a win the contiguous run through that cell is
    /// stored as the win line, ordered from one end to the other; otherwise
    /// the win line is cleared.
    pub fn check_win(&mut self, stone: Stone) -> bool {
        let line = match self.last_move() {
            Some(m) if m.stone == stone && stone != Stone::Empty => self.winning_run(m.pos, stone),
            _ => None,
        };
        self.win_line = line.unwrap_or_default();
        !self.win_line.is_empty()
    }

    /// Read-only win test through `pos`, without touching the win line
    pub fn is_five_at(&self, pos: Pos, stone: Stone) -> bool {
        self.winning_run(pos, stone).is_some()
    }

    fn winning_run(&self, pos: Pos, stone: Stone) -> Option<Vec<Pos>> {
        const DIRS: [(i32, i32); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

        for (dr, dc) in DIRS {
            let mut back = 0;
            while let Some(p) = pos.offset(dr, dc, -(back + 1)) {
                if self.get(p) != stone {
                    break;
                }
                back += 1;
            }
            let mut fwd = 0;
            while let Some(p) = pos.offset(dr, dc, fwd + 1) {
                if self.get(p) != stone {
                    break;
                }
                fwd += 1;
            }
            if back + fwd + 1 >= 5 {
                return Some((-back..=fwd).filter_map(|k| pos.offset(dr, dc, k)).collect());
            }
        }
        None
    }

    /// All empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<Pos> {
        let occupied = self.black.union(&self.white);
        (0..TOTAL_CELLS)
            .map(Pos::from_index)
            .filter(|&p| !occupied.get(p))
            .collect()
    }

    /// Empty cells within Chebyshev radius 2 of any stone, row-major.
    ///
    /// Falls back to every empty cell when nothing is in range (in practice
    /// only on an empty board). The list is cached until the next mutation.
    pub fn near_empty_cells(&self) -> Vec<Pos> {
        if let Some(cached) = self.candidates.borrow().as_ref() {
            return cached.clone();
        }
        let cells = self.compute_near_empty();
        self.candidates.replace(Some(cells.clone()));
        cells
    }

    fn compute_near_empty(&self) -> Vec<Pos> {
        let occupied = self.black.union(&self.white);
        let mut mask = [false; TOTAL_CELLS];

        for pos in occupied.iter_ones() {
            for dr in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                for dc in -CANDIDATE_RADIUS..=CANDIDATE_RADIUS {
                    if let Some(p) = Pos::try_new(i32::from(pos.row) + dr, i32::from(pos.col) + dc) {
                        if !occupied.get(p) {
                            mask[p.to_index()] = true;
                        }
                    }
                }
            }
        }

        let cells: Vec<Pos> = mask
            .iter()
            .enumerate()
            .filter(|&(_, &near)| near)
            .map(|(idx, _)| Pos::from_index(idx))
            .collect();

        if cells.is_empty() {
            self.empty_cells()
        } else {
            cells
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Board {
    /// Boards compare by content, not by history
    fn eq(&self, other: &Self) -> bool {
        self.black == other.black && self.white == other.white
    }
}

impl Eq for Board {}
