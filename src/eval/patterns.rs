//! Line shapes and pattern scores
//!
//! A line shape is the (run length, open ends) pair for one stone along one
//! axis. Heuristic scoring and threat probes are both built on it.

use crate::board::{Board, Pos, Stone};

/// The four board axes (each walked both ways from a stone)
pub const AXES: [(i32, i32); 4] = [
    (0, 1),  // Horizontal
    (1, 0),  // Vertical
    (1, 1),  // Diagonal
    (1, -1), // Anti-diagonal
];

/// Contiguous run through a cell on one axis, and how many of its two ends
/// border an empty cell (board edge and enemy stones both close an end).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineShape {
    pub run: u8,
    pub open_ends: u8,
}

impl LineShape {
    #[inline]
    pub fn is_five(self) -> bool {
        self.run >= 5
    }

    #[inline]
    pub fn is_open_four(self) -> bool {
        self.run == 4 && self.open_ends == 2
    }

    /// Open three or better-than-three with both ends open
    #[inline]
    pub fn is_open_three_or_more(self) -> bool {
        self.run >= 3 && self.open_ends == 2
    }

    /// Heuristic value of this shape
    #[must_use]
    pub fn score(self) -> i32 {
        match (self.run, self.open_ends) {
            (5.., _) => PatternScore::FIVE,
            (4, 2) => PatternScore::OPEN_FOUR,
            (4, 1) => PatternScore::CLOSED_FOUR,
            (3, 2) => PatternScore::OPEN_THREE,
            (3, 1) => PatternScore::CLOSED_THREE,
            (2, 2) => PatternScore::OPEN_TWO,
            (2, 1) => PatternScore::CLOSED_TWO,
            (3.., 0) => PatternScore::DEAD,
            _ => 0,
        }
    }
}

/// Measure the run of `stone` through `origin` along `axis`.
///
/// The origin cell is counted as holding `stone` whatever it contains, so
/// callers normally measure right after placing there.
#[must_use]
pub fn line_shape(board: &Board, origin: Pos, axis: (i32, i32), stone: Stone) -> LineShape {
    let (dr, dc) = axis;
    let mut run = 1u8;
    let mut open_ends = 0u8;

    for sign in [1, -1] {
        let mut k = 1;
        loop {
            match origin.offset(dr * sign, dc * sign, k) {
                Some(p) if board.get(p) == stone => {
                    run += 1;
                    k += 1;
                }
                Some(p) if board.get(p) == Stone::Empty => {
                    open_ends += 1;
                    break;
                }
                _ => break, // Edge or enemy stone
            }
        }
    }

    LineShape { run, open_ends }
}

/// Pattern scores for evaluation
pub struct PatternScore;

impl PatternScore {
    /// Five in a row - immediate win
    pub const FIVE: i32 = 1_000_000;

    /// Open four: _OOOO_ (cannot be stopped)
    pub const OPEN_FOUR: i32 = 60_000;
    /// Closed four: XOOOO_ or _OOOOX
    pub const CLOSED_FOUR: i32 = 12_000;

    /// Open three: _OOO_ (becomes open four if not blocked)
    pub const OPEN_THREE: i32 = 10_000;
    /// Closed three: XOOO_ or _OOOX
    pub const CLOSED_THREE: i32 = 1_200;

    /// Open two: _OO_
    pub const OPEN_TWO: i32 = 600;
    /// Closed two: XOO_ or _OOX
    pub const CLOSED_TWO: i32 = 80;

    /// Run of three or more with both ends shut; it can never become five
    pub const DEAD: i32 = -50;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_score_hierarchy() {
        assert!(PatternScore::FIVE > PatternScore::OPEN_FOUR);
        assert!(PatternScore::OPEN_FOUR > PatternScore::CLOSED_FOUR);
        assert!(PatternScore::CLOSED_FOUR > PatternScore::OPEN_THREE);
        assert!(PatternScore::OPEN_THREE > PatternScore::CLOSED_THREE);
        assert!(PatternScore::CLOSED_THREE > PatternScore::OPEN_TWO);
        assert!(PatternScore::OPEN_TWO > PatternScore::CLOSED_TWO);
        assert!(PatternScore::DEAD < 0);
    }

    #[test]
    fn test_line_shape_open_three() {
        let board = Board::from_moves(&[
            (Pos::new(7, 5), Stone::Black),
            (Pos::new(7, 6), Stone::Black),
            (Pos::new(7, 7), Stone::Black),
        ]);
        let shape = line_shape(&board, Pos::new(7, 6), (0, 1), Stone::Black);
        assert_eq!(shape, LineShape { run: 3, open_ends: 2 });
        assert_eq!(shape.score(), PatternScore::OPEN_THREE);

        // Vertical axis through the same stone is a lone stone
        let vertical = line_shape(&board, Pos::new(7, 6), (1, 0), Stone::Black);
        assert_eq!(vertical, LineShape { run: 1, open_ends: 2 });
        assert_eq!(vertical.score(), 0);
    }

    #[test]
    fn test_line_shape_blocked_by_enemy_and_edge() {
        let board = Board::from_moves(&[
            (Pos::new(0, 0), Stone::White),
            (Pos::new(0, 1), Stone::White),
            (Pos::new(0, 2), Stone::White),
            (Pos::new(0, 3), Stone::White),
            (Pos::new(0, 4), Stone::Black),
        ]);
        let shape = line_shape(&board, Pos::new(0, 0), (0, 1), Stone::White);
        assert_eq!(shape, LineShape { run: 4, open_ends: 0 });
        assert_eq!(shape.score(), PatternScore::DEAD);
    }

    #[test]
    fn test_line_shape_anti_diagonal() {
        let board = Board::from_moves(&[
            (Pos::new(3, 10), Stone::Black),
            (Pos::new(4, 9), Stone::Black),
            (Pos::new(5, 8), Stone::Black),
            (Pos::new(6, 7), Stone::Black),
            (Pos::new(2, 11), Stone::White),
        ]);
        let shape = line_shape(&board, Pos::new(5, 8), (1, -1), Stone::Black);
        assert_eq!(shape, LineShape { run: 4, open_ends: 1 });
        assert_eq!(shape.score(), PatternScore::CLOSED_FOUR);
    }

    #[test]
    fn test_line_shape_five_scores_win() {
        let board = Board::from_moves(&[
            (Pos::new(2, 2), Stone::Black),
            (Pos::new(3, 3), Stone::Black),
            (Pos::new(4, 4), Stone::Black),
            (Pos::new(5, 5), Stone::Black),
            (Pos::new(6, 6), Stone::Black),
        ]);
        let shape = line_shape(&board, Pos::new(2, 2), (1, 1), Stone::Black);
        assert!(shape.is_five());
        assert_eq!(shape.score(), PatternScore::FIVE);
    }
}
