//! Alpha-Beta search with iterative deepening and a transposition cache
//!
//! Plain minimax from a fixed perspective: the side the search is run for
//! maximizes [`position_value`], the opponent minimizes it. The board is
//! walked in place with apply/undo; nothing is cloned per node.
//!
//! # Features
//!
//! - Iterative deepening; the deepest fully completed iteration decides
//! - Deadline, node budget and external cancellation, polled in the recursion
//! - Transposition cache keyed by (position, remaining depth, side to move)
//! - Best-first move ordering by one-ply pre-score
//!
//! # Example
//!
//! ```
//! use gomoku::board::{Board, Pos, Stone};
//! use gomoku::search::{SearchBudget, Searcher};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut board = Board::new();
//! for col in 3..7 {
//!     board.apply(Pos::new(7, col), Stone::White);
//! }
//!
//! let mut searcher = Searcher::new(30, 1.1);
//! let mut rng = StdRng::seed_from_u64(7);
//! let result = searcher.search(&mut board, Stone::White, 1, SearchBudget::unlimited(), None, &mut rng);
//! assert!(matches!(result.best_move, Some(p) if p == Pos::new(7, 2) || p == Pos::new(7, 7)));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{Board, Pos, Stone};
use crate::eval::{order_score, position_value};
use crate::learning::LearningStore;

use super::tt::{CacheKey, EntryType, TranspositionCache};

/// Saturating value of a won position; larger than any heuristic sum
pub const WIN_SCORE: i32 = 100_000_000;

/// Infinity score for alpha-beta bounds
const INF: i32 = WIN_SCORE * 2;

/// Nodes between deadline and cancellation checks
const CHECK_INTERVAL: u64 = 1024;

/// Shared flag a caller can trip to stop a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Limits on one top-level search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchBudget {
    pub deadline: Option<Instant>,
    pub max_nodes: Option<u64>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Deadline `limit` from now
    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + limit),
            max_nodes: None,
        }
    }

    #[must_use]
    pub fn nodes(mut self, max_nodes: Option<u64>) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}

/// Search result containing the best move found and associated statistics.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best move found; `None` only when the board is full
    pub best_move: Option<Pos>,
    /// Score of the best move at the completed depth
    pub score: i32,
    /// Deepest iteration that ran to completion (0 if none did)
    pub depth: u8,
    /// Total nodes searched
    pub nodes: u64,
    /// The budget or a cancellation cut the search short
    pub aborted: bool,
}

/// Alpha-beta searcher. One instance serves one AI; its cache lives only for
/// the duration of a single [`Searcher::search`] call.
pub struct Searcher {
    cache: TranspositionCache,
    cancel: CancelToken,
    budget: SearchBudget,
    nodes: u64,
    stopped: bool,
    me: Stone,
    max_candidates: usize,
    defense_factor: f64,
}

impl Searcher {
    #[must_use]
    pub fn new(max_candidates: usize, defense_factor: f64) -> Self {
        Self {
            cache: TranspositionCache::new(),
            cancel: CancelToken::new(),
            budget: SearchBudget::unlimited(),
            nodes: 0,
            stopped: false,
            me: Stone::Black,
            max_candidates: max_candidates.max(1),
            defense_factor,
        }
    }

    /// Replace the cancellation flag this searcher polls
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    /// Iterative deepening search for `me` up to `max_depth` plies.
    ///
    /// The board is mutated during the search and restored before return.
    /// When the budget runs out the best move of the deepest completed
    /// iteration is returned, or the best pre-scored candidate if even
    /// depth 1 did not finish.
    pub fn search<R: Rng>(
        &mut self,
        board: &mut Board,
        me: Stone,
        max_depth: u8,
        budget: SearchBudget,
        store: Option<&LearningStore>,
        rng: &mut R,
    ) -> SearchResult {
        self.cache.clear();
        self.nodes = 0;
        self.stopped = false;
        self.budget = budget;
        self.me = me;

        let root_moves = self.ordered_moves(board, me, store);
        let mut result = SearchResult {
            best_move: root_moves.first().copied(),
            score: 0,
            depth: 0,
            nodes: 0,
            aborted: false,
        };
        if root_moves.is_empty() {
            return result;
        }

        for depth in 1..=max_depth.max(1) {
            if depth > 1 && (self.deadline_passed() || self.cancel.is_cancelled()) {
                result.aborted = true;
                break;
            }
            let Some((best_moves, score)) = self.search_root(board, &root_moves, depth, store) else {
                result.aborted = true;
                break;
            };
            result.best_move = best_moves.choose(rng).copied();
            result.score = score;
            result.depth = depth;

            if score >= WIN_SCORE {
                break; // Forced win found; deeper search cannot improve it
            }
        }

        result.nodes = self.nodes;
        debug!(
            "search {:?}: depth {} score {} nodes {} cache {:.1}% aborted {}",
            result.best_move,
            result.depth,
            result.score,
            result.nodes,
            self.cache.stats().hit_rate(),
            result.aborted
        );
        result
    }

    /// One root iteration. Non-winning moves score their minimax value plus
    /// the learned bias. Returns every move sharing the best score, or
    /// `None` if the search was stopped before the iteration finished.
    fn search_root(
        &mut self,
        board: &mut Board,
        moves: &[Pos],
        depth: u8,
        store: Option<&LearningStore>,
    ) -> Option<(Vec<Pos>, i32)> {
        let mut best_score = -INF;
        let mut best_moves = Vec::new();
        let root_hash = board.hash();

        for &mov in moves {
            // Learned preference for this move from this position
            let bias = store.map_or(0, |s| s.bias(root_hash, mov));
            board.apply(mov, self.me);
            let score = if board.is_five_at(mov, self.me) {
                WIN_SCORE + i32::from(depth)
            } else {
                // Window just below the best so far keeps exact values for ties
                let alpha = if best_score > -INF { best_score - bias - 1 } else { -INF };
                self.alpha_beta(board, depth - 1, alpha, INF, false, mov, store) + bias
            };
            board.undo(mov);

            if self.stopped {
                return None;
            }

            if score > best_score {
                best_score = score;
                best_moves.clear();
                best_moves.push(mov);
            } else if score == best_score {
                best_moves.push(mov);
            }
        }

        Some((best_moves, best_score))
    }

    /// Minimax with alpha-beta pruning. `last` is the move that led here,
    /// played by the side not to move.
    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        maximizing: bool,
        last: Pos,
        store: Option<&LearningStore>,
    ) -> i32 {
        self.nodes += 1;
        if self.should_stop() {
            return 0;
        }

        let just_moved = if maximizing { self.me.opponent() } else { self.me };
        if board.is_five_at(last, just_moved) {
            // Nearer wins and later losses score further from zero
            let magnitude = WIN_SCORE + i32::from(depth);
            return if maximizing { -magnitude } else { magnitude };
        }
        if depth == 0 || board.is_full() {
            return position_value(board, self.me, self.defense_factor);
        }

        let key = CacheKey {
            hash: board.hash(),
            depth,
            maximizing,
        };
        if let Some(score) = self.cache.probe(key, alpha, beta) {
            return score;
        }

        let (alpha_orig, beta_orig) = (alpha, beta);
        let mover = if maximizing { self.me } else { self.me.opponent() };
        let moves = self.ordered_moves(board, mover, store);

        let mut best = if maximizing { -INF } else { INF };
        for mov in moves {
            board.apply(mov, mover);
            let score = self.alpha_beta(board, depth - 1, alpha, beta, !maximizing, mov, store);
            board.undo(mov);

            if self.stopped {
                return 0;
            }

            if maximizing {
                best = best.max(score);
                alpha = alpha.max(best);
            } else {
                best = best.min(score);
                beta = beta.min(best);
            }
            if alpha >= beta {
                break;
            }
        }

        let entry_type = if best <= alpha_orig {
            EntryType::UpperBound
        } else if best >= beta_orig {
            EntryType::LowerBound
        } else {
            EntryType::Exact
        };
        self.cache.store(key, best, entry_type);
        best
    }

    /// Candidate cells for `mover`, best first, capped at `max_candidates`.
    fn ordered_moves(&self, board: &mut Board, mover: Stone, store: Option<&LearningStore>) -> Vec<Pos> {
        let mut scored: Vec<(Pos, i32)> = board
            .near_empty_cells()
            .into_iter()
            .map(|pos| (pos, order_score(board, pos, mover, store)))
            .collect();

        // Stable: equal scores keep row-major order
        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(self.max_candidates);
        scored.into_iter().map(|(pos, _)| pos).collect()
    }

    #[inline]
    fn deadline_passed(&self) -> bool {
        self.budget.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Poll the budget; latches `stopped` once any limit is hit.
    #[inline]
    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }
        if let Some(max) = self.budget.max_nodes {
            if self.nodes > max {
                self.stopped = true;
                return true;
            }
        }
        if self.cancel.is_cancelled() {
            self.stopped = true;
        } else if self.nodes % CHECK_INTERVAL == 0 {
            self.stopped = self.deadline_passed();
        }
        self.stopped
    }
}
