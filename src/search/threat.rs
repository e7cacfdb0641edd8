//! Tactical threat probes
//!
//! Each probe walks the candidate cells, places the stone, measures the runs
//! through that cell, and takes the stone back before moving on. The board
//! is never left mutated.

use crate::board::{Board, Pos, Stone};
use crate::eval::patterns::{line_shape, AXES};

/// First candidate cell where `stone` completes five or more.
pub fn find_immediate_win(board: &mut Board, stone: Stone) -> Option<Pos> {
    board.near_empty_cells().into_iter().find(|&pos| {
        if !board.apply(pos, stone) {
            return false;
        }
        let wins = board.check_win(stone);
        board.undo(pos);
        wins
    })
}

/// First candidate cell where `stone` makes open fours on two or more axes
/// at once.
pub fn find_double_open_four(board: &mut Board, stone: Stone) -> Option<Pos> {
    board
        .near_empty_cells()
        .into_iter()
        .find(|&pos| probe(board, pos, stone, open_fours_through).unwrap_or(0) >= 2)
}

/// An open run `stone` could make by playing `pos`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threat {
    pub pos: Pos,
    pub run: u8,
}

/// Candidate cell where `stone` makes a run of three or more with both ends
/// open. The longest such run wins; ties keep the first cell in row-major
/// order. A `run` of 4 means `stone` already has an open three on the board.
pub fn find_open_three(board: &mut Board, stone: Stone) -> Option<Threat> {
    let mut best: Option<Threat> = None;
    for pos in board.near_empty_cells() {
        let Some(run) = probe(board, pos, stone, longest_open_run_through) else {
            continue;
        };
        if run >= 3 && best.map_or(true, |b| run > b.run) {
            best = Some(Threat { pos, run });
        }
    }
    best
}

/// Number of axes through `pos` holding an open four for `stone`.
pub fn open_fours_through(board: &Board, pos: Pos, stone: Stone) -> usize {
    AXES
        .iter()
        .filter(|&&axis| line_shape(board, pos, axis, stone).is_open_four())
        .count()
}

/// Longest run through `pos` with both ends open, ignoring fives.
fn longest_open_run_through(board: &Board, pos: Pos, stone: Stone) -> u8 {
    AXES
        .iter()
        .map(|&axis| line_shape(board, pos, axis, stone))
        .filter(|shape| shape.is_open_three_or_more() && !shape.is_five())
        .map(|shape| shape.run)
        .max()
        .unwrap_or(0)
}

/// apply -> measure -> undo
fn probe<T>(
    board: &mut Board,
    pos: Pos,
    stone: Stone,
    measure: impl Fn(&Board, Pos, Stone) -> T,
) -> Option<T> {
    if !board.apply(pos, stone) {
        return None;
    }
    let value = measure(board, pos, stone);
    board.undo(pos);
    Some(value)
}
