//! Heuristic evaluation function for Gomoku
//!
//! Scores every maximal run of a player's stones along the four axes by its
//! (length, open ends) shape and sums the results.

use super::patterns::{line_shape, PatternScore, AXES};
use crate::board::{Board, Pos, Stone};
use crate::learning::LearningStore;

/// Default weight on the opponent's patterns in [`position_value`]
pub const DEFENSE_FACTOR: f64 = 1.1;

/// Pattern score of `stone`'s runs on the board.
///
/// Each maximal run is scored once per axis, from its first stone, so the
/// total does not depend on where the scan enters a run. One-sided: the
/// opponent's stones only matter as blockers.
#[must_use]
pub fn evaluate(board: &Board, stone: Stone) -> i32 {
    let mut score = 0;
    for pos in board.stones(stone).iter_ones() {
        for &(dr, dc) in &AXES {
            // Not the start of this run; it is scored from the start
            if let Some(prev) = pos.offset(dr, dc, -1) {
                if board.get(prev) == stone {
                    continue;
                }
            }
            score += line_shape(board, pos, (dr, dc), stone).score();
        }
    }
    score
}

/// Position value for adversarial search: `me`'s patterns minus the
/// opponent's, the latter scaled by `defense_factor`.
///
/// With a factor above 1.0 taking away an opponent pattern is worth a bit
/// more than building the same pattern.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn position_value(board: &Board, me: Stone, defense_factor: f64) -> i32 {
    let mine = evaluate(board, me);
    let theirs = evaluate(board, me.opponent());
    let weighted = (f64::from(theirs) * defense_factor).round();
    mine.saturating_sub(weighted as i32)
}

/// Pattern value of the cell `pos` for `stone`: the sum over the four axes
/// of the run through it, measured with the stone tentatively placed.
///
/// Returns `None` if the cell is not playable.
#[must_use]
pub fn cell_value(board: &mut Board, pos: Pos, stone: Stone) -> Option<i32> {
    if !board.apply(pos, stone) {
        return None;
    }
    let score = AXES
        .iter()
        .map(|&axis| line_shape(board, pos, axis, stone).score())
        .sum();
    board.undo(pos);
    Some(score)
}

/// One-ply pre-score of a move: [`cell_value`] plus the learned bias for
/// playing `pos` from the current position.
///
/// Unplayable cells score `-PatternScore::FIVE`.
#[must_use]
pub fn score_move(board: &mut Board, pos: Pos, stone: Stone, store: Option<&LearningStore>) -> i32 {
    let hash = board.hash();
    let Some(pattern) = cell_value(board, pos, stone) else {
        return -PatternScore::FIVE;
    };
    let bias = store.map_or(0, |s| s.bias(hash, pos));
    pattern + bias
}

/// Move-ordering score: [`score_move`] for `stone` plus what the cell is
/// worth to the opponent, so strong blocking cells rank high as well.
#[must_use]
pub fn order_score(board: &mut Board, pos: Pos, stone: Stone, store: Option<&LearningStore>) -> i32 {
    let attack = score_move(board, pos, stone, store);
    let defense = cell_value(board, pos, stone.opponent()).unwrap_or(0);
    attack.saturating_add(defense)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Move, BOARD_SIZE};
    use crate::learning::StoreLimits;

    fn place(board: &mut Board, cells: &[(u8, u8)], stone: Stone) {
        for &(r, c) in cells {
            assert!(board.apply(Pos::new(r, c), stone));
        }
    }

    #[test]
    fn test_evaluate_empty_board() {
        let board = Board::new();
        assert_eq!(evaluate(&board, Stone::Black), 0, "Empty board should have score 0");
        assert_eq!(position_value(&board, Stone::White, DEFENSE_FACTOR), 0);
    }

    #[test]
    fn test_evaluate_open_three_counted_once() {
        let mut board = Board::new();
        place(&mut board, &[(7, 5), (7, 6), (7, 7)], Stone::Black);
        assert_eq!(evaluate(&board, Stone::Black), PatternScore::OPEN_THREE);
    }

    #[test]
    fn test_evaluate_five() {
        let mut board = Board::new();
        place(&mut board, &[(9, 0), (9, 1), (9, 2), (9, 3), (9, 4)], Stone::Black);
        let score = evaluate(&board, Stone::Black);
        assert!(score >= PatternScore::FIVE, "Five in a row should dominate, got {}", score);
    }

    #[test]
    fn test_evaluate_open_four_beats_closed_four() {
        let mut open = Board::new();
        place(&mut open, &[(7, 4), (7, 5), (7, 6), (7, 7)], Stone::Black);

        let mut closed = Board::new();
        place(&mut closed, &[(7, 4), (7, 5), (7, 6), (7, 7)], Stone::Black);
        place(&mut closed, &[(7, 3)], Stone::White);

        let open_score = evaluate(&open, Stone::Black);
        let closed_score = evaluate(&closed, Stone::Black);
        assert_eq!(open_score, PatternScore::OPEN_FOUR);
        assert_eq!(closed_score, PatternScore::CLOSED_FOUR);
    }

    #[test]
    fn test_blocked_three_is_penalized() {
        let mut board = Board::new();
        place(&mut board, &[(0, 0), (0, 1), (0, 2)], Stone::Black);
        place(&mut board, &[(0, 3)], Stone::White);
        assert_eq!(evaluate(&board, Stone::Black), PatternScore::DEAD);
    }

    #[test]
    fn test_position_value_favours_defense() {
        let mut board = Board::new();
        place(&mut board, &[(3, 3), (3, 4), (3, 5)], Stone::Black);
        place(&mut board, &[(10, 3), (10, 4), (10, 5)], Stone::White);
        // Mirror-equal patterns: the weighted opponent side wins out
        assert!(position_value(&board, Stone::Black, DEFENSE_FACTOR) < 0);
        assert!(position_value(&board, Stone::White, DEFENSE_FACTOR) < 0);
        assert_eq!(position_value(&board, Stone::Black, 1.0), 0);
    }

    fn rotate(pos: Pos) -> Pos {
        // 90 degrees clockwise
        Pos::new(pos.col, (BOARD_SIZE - 1) as u8 - pos.row)
    }

    fn reflect(pos: Pos) -> Pos {
        Pos::new(pos.row, (BOARD_SIZE - 1) as u8 - pos.col)
    }

    #[test]
    fn test_evaluate_symmetry() {
        let mut board = Board::new();
        place(&mut board, &[(7, 7), (7, 8), (7, 9), (8, 8), (9, 9), (6, 6)], Stone::Black);
        place(&mut board, &[(7, 6), (8, 7), (5, 10), (10, 10)], Stone::White);
        let moves: Vec<Move> = board.moves().to_vec();

        for transform in [rotate as fn(Pos) -> Pos, reflect] {
            let mut turned = Board::new();
            for m in &moves {
                turned.apply(transform(m.pos), m.stone);
            }
            for stone in [Stone::Black, Stone::White] {
                assert_eq!(
                    evaluate(&board, stone),
                    evaluate(&turned, stone),
                    "score changed under symmetry for {:?}",
                    stone
                );
            }
        }
    }

    #[test]
    fn test_cell_value_leaves_board_untouched() {
        let mut board = Board::new();
        place(&mut board, &[(7, 7), (7, 8)], Stone::Black);
        let hash = board.hash();
        let value = cell_value(&mut board, Pos::new(7, 9), Stone::Black);
        assert_eq!(value, Some(PatternScore::OPEN_THREE));
        assert_eq!(board.hash(), hash);
        assert!(board.is_empty_at(Pos::new(7, 9)));
        assert_eq!(cell_value(&mut board, Pos::new(7, 7), Stone::White), None);
    }

    #[test]
    fn test_score_move_adds_learning_bias() {
        let mut board = Board::new();
        place(&mut board, &[(7, 7)], Stone::Black);

        let mut store = LearningStore::in_memory(StoreLimits::default(), 100);
        let game = [
            Move { pos: Pos::new(7, 7), stone: Stone::Black },
            Move { pos: Pos::new(8, 8), stone: Stone::White },
        ];
        store.record_game(&game, Stone::White, Some(Stone::White));

        let plain = score_move(&mut board, Pos::new(8, 8), Stone::White, None);
        let biased = score_move(&mut board, Pos::new(8, 8), Stone::White, Some(&store));
        assert_eq!(biased - plain, 10);
        assert_eq!(score_move(&mut board, Pos::new(7, 7), Stone::White, None), -PatternScore::FIVE);
    }
}
