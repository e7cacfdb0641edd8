//! Main AI Engine integrating all search components
//!
//! The engine picks a move with one of three strategies, chosen by
//! [`Difficulty`]:
//!
//! - **Easy**: uniform random empty cell
//! - **Medium**: win if possible, else block an immediate loss, else a random
//!   cell near the stones already down
//! - **Hard**: a threat-priority chain, then alpha-beta search:
//!   1. **Immediate win**
//!   2. **Block** the opponent's immediate win
//!   3. **Block** the opponent's double open four
//!   4. **Block** the opponent's open three
//!   5. **Opening**: one-ply pick near the centre while the board is sparse
//!   6. **Alpha-Beta** search with learning-biased move ordering
//!
//! # Example
//!
//! ```
//! use gomoku::{AIEngine, Board, Difficulty, EngineConfig, Pos, Stone};
//!
//! let mut engine = AIEngine::with_seed(Stone::White, Difficulty::Hard, EngineConfig::default(), 7);
//! let mut board = Board::new();
//! board.apply(Pos::new(7, 7), Stone::Black);
//!
//! let result = engine.get_move_with_stats(&mut board);
//! println!("Best move: {:?}", result.best_move);
//! println!("Search type: {:?}", result.search_type);
//! println!("Time: {}ms", result.time_ms);
//! ```

use std::fmt;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Pos, Stone};
use crate::config::EngineConfig;
use crate::error::TaskError;
use crate::eval::order_score;
use crate::learning::{LearningStore, StoreLimits};
use crate::search::{
    find_double_open_four, find_immediate_win, find_open_three, CancelToken, SearchBudget,
    SearchResult, Searcher,
};

/// AI strength
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Type of search that produced the result.
///
/// Names the step of the active strategy that decided the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Uniform random empty cell
    Random,
    /// Random cell near existing stones
    NearRandom,
    /// Completes five in a row
    ImmediateWin,
    /// Blocks the opponent's five
    BlockWin,
    /// Blocks a cell giving the opponent two open fours
    BlockDoubleFour,
    /// Blocks the opponent's open three
    BlockOpenThree,
    /// One-ply pick near the centre on a sparse board
    Opening,
    /// Regular alpha-beta search result
    AlphaBeta,
}

/// Result of a move search with detailed statistics.
#[derive(Debug, Clone)]
pub struct MoveResult {
    /// Chosen move; `None` only when the board has no empty cell
    pub best_move: Option<Pos>,
    /// Score reported by the deciding step (0 for non-scoring steps)
    pub score: i32,
    /// Step that produced the move
    pub search_type: SearchType,
    /// Time taken in milliseconds
    pub time_ms: u64,
    /// Number of nodes searched
    pub nodes: u64,
}

impl MoveResult {
    #[inline]
    fn quick(pos: Option<Pos>, search_type: SearchType, start: Instant) -> Self {
        Self {
            best_move: pos,
            score: 0,
            search_type,
            time_ms: elapsed_ms(start),
            nodes: 0,
        }
    }

    #[inline]
    fn from_alphabeta(result: SearchResult, start: Instant) -> Self {
        Self {
            best_move: result.best_move,
            score: result.score,
            search_type: SearchType::AlphaBeta,
            time_ms: elapsed_ms(start),
            nodes: result.nodes,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// State the Hard strategy keeps between moves
pub struct HardState {
    searcher: Searcher,
    store: LearningStore,
}

/// Move-selection policy. Only Hard carries state.
pub enum Strategy {
    Easy,
    Medium,
    Hard(Box<HardState>),
}

impl Strategy {
    /// Build the policy for `difficulty`; Hard loads the learning store.
    pub fn build(difficulty: Difficulty, config: &EngineConfig) -> Self {
        match difficulty {
            Difficulty::Easy => Strategy::Easy,
            Difficulty::Medium => Strategy::Medium,
            Difficulty::Hard => {
                let limits = StoreLimits {
                    ceiling: config.store_ceiling,
                    floor: config.store_floor,
                };
                Strategy::Hard(Box::new(HardState {
                    searcher: Searcher::new(config.max_candidates, config.defense_factor),
                    store: LearningStore::load(config.data_dir.clone(), limits, config.bias_clamp),
                }))
            }
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        match self {
            Strategy::Easy => Difficulty::Easy,
            Strategy::Medium => Difficulty::Medium,
            Strategy::Hard(_) => Difficulty::Hard,
        }
    }

    /// Pick a move for `me` on `board`. The board is left as it was found.
    pub fn find_move(
        &mut self,
        board: &mut Board,
        me: Stone,
        rng: &mut StdRng,
        config: &EngineConfig,
        budget: SearchBudget,
    ) -> MoveResult {
        let start = Instant::now();
        match self {
            Strategy::Easy => {
                let pos = board.empty_cells().choose(rng).copied();
                MoveResult::quick(pos, SearchType::Random, start)
            }
            Strategy::Medium => {
                if let Some(pos) = find_immediate_win(board, me) {
                    return MoveResult::quick(Some(pos), SearchType::ImmediateWin, start);
                }
                if let Some(pos) = find_immediate_win(board, me.opponent()) {
                    return MoveResult::quick(Some(pos), SearchType::BlockWin, start);
                }
                let pos = board.near_empty_cells().choose(rng).copied();
                MoveResult::quick(pos, SearchType::NearRandom, start)
            }
            Strategy::Hard(state) => state.find_move(board, me, rng, config, budget, start),
        }
    }

    pub fn store(&self) -> Option<&LearningStore> {
        match self {
            Strategy::Hard(state) => Some(&state.store),
            _ => None,
        }
    }
}

impl HardState {
    fn find_move(
        &mut self,
        board: &mut Board,
        me: Stone,
        rng: &mut StdRng,
        config: &EngineConfig,
        budget: SearchBudget,
        start: Instant,
    ) -> MoveResult {
        let opponent = me.opponent();

        if board.is_full() {
            return MoveResult::quick(None, SearchType::AlphaBeta, start);
        }

        // 1. Our own five
        if let Some(pos) = find_immediate_win(board, me) {
            return MoveResult::quick(Some(pos), SearchType::ImmediateWin, start);
        }

        // 2. Their five
        if let Some(pos) = find_immediate_win(board, opponent) {
            return MoveResult::quick(Some(pos), SearchType::BlockWin, start);
        }

        // 3. A cell that would give them two open fours
        if let Some(pos) = find_double_open_four(board, opponent) {
            return MoveResult::quick(Some(pos), SearchType::BlockDoubleFour, start);
        }

        // 4. An open three already on the board, about to become an open four
        if let Some(threat) = find_open_three(board, opponent) {
            if threat.run >= 4 {
                return MoveResult::quick(Some(threat.pos), SearchType::BlockOpenThree, start);
            }
        }

        // 5. Sparse board: no tree search
        if board.stone_count() < config.opening_stones {
            if let Some(pos) = self.opening_move(board, me, rng, config) {
                return MoveResult::quick(Some(pos), SearchType::Opening, start);
            }
        }

        // 6. Alpha-beta
        let result = self.searcher.search(
            board,
            me,
            config.search_depth,
            budget,
            Some(&self.store),
            rng,
        );
        if result.best_move.is_none() {
            let pos = board.near_empty_cells().choose(rng).copied();
            return MoveResult::quick(pos, SearchType::NearRandom, start);
        }
        MoveResult::from_alphabeta(result, start)
    }

    /// Best-pre-scored empty cell within `opening_radius` of the centre,
    /// random among equals.
    fn opening_move(
        &self,
        board: &mut Board,
        me: Stone,
        rng: &mut StdRng,
        config: &EngineConfig,
    ) -> Option<Pos> {
        let center = Pos::center();
        let zone: Vec<Pos> = board
            .empty_cells()
            .into_iter()
            .filter(|p| p.distance(center) <= config.opening_radius)
            .collect();

        let scored: Vec<(Pos, i32)> = zone
            .into_iter()
            .map(|pos| (pos, order_score(board, pos, me, Some(&self.store))))
            .collect();
        let top = scored.iter().map(|&(_, s)| s).max()?;
        let best: Vec<Pos> = scored
            .into_iter()
            .filter(|&(_, s)| s == top)
            .map(|(pos, _)| pos)
            .collect();
        best.choose(rng).copied()
    }
}

/// Main AI Engine for Gomoku.
///
/// Plays one colour at one difficulty. Changing difficulty rebuilds the
/// strategy, dropping any in-memory search state; the learning store is
/// reloaded from disk.
pub struct AIEngine {
    stone: Stone,
    difficulty: Difficulty,
    strategy: Strategy,
    rng: StdRng,
    config: EngineConfig,
    cancel: CancelToken,
}

impl AIEngine {
    /// Create an engine seeded from system entropy.
    pub fn new(stone: Stone, difficulty: Difficulty, config: EngineConfig) -> Self {
        Self::with_rng(stone, difficulty, config, StdRng::from_entropy())
    }

    /// Create an engine with a fixed seed for reproducible play.
    pub fn with_seed(stone: Stone, difficulty: Difficulty, config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(stone, difficulty, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(stone: Stone, difficulty: Difficulty, config: EngineConfig, rng: StdRng) -> Self {
        let strategy = Strategy::build(difficulty, &config);
        Self {
            stone,
            difficulty,
            strategy,
            rng,
            config,
            cancel: CancelToken::new(),
        }
    }

    #[inline]
    pub fn stone(&self) -> Stone {
        self.stone
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&LearningStore> {
        self.strategy.store()
    }

    /// Switch difficulty, rebuilding the strategy.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        debug!("difficulty {} -> {}", self.difficulty, difficulty);
        self.difficulty = difficulty;
        self.strategy = Strategy::build(difficulty, &self.config);
    }

    /// Share a cancellation flag with the caller. A tripped flag makes Hard
    /// return its best move so far.
    pub fn set_cancel_token(&mut self, token: CancelToken) {
        self.cancel = token;
    }

    /// Get the best move for this engine's colour.
    ///
    /// Returns `None` only when the board is full.
    #[must_use]
    pub fn get_move(&mut self, board: &mut Board) -> Option<Pos> {
        self.get_move_with_stats(board).best_move
    }

    /// Get the best move with search statistics, using the configured time
    /// and node budget.
    #[must_use]
    pub fn get_move_with_stats(&mut self, board: &mut Board) -> MoveResult {
        let budget = self.default_budget();
        self.get_move_with_budget(board, budget)
    }

    /// Get the best move under an explicit budget.
    #[must_use]
    pub fn get_move_with_budget(&mut self, board: &mut Board, budget: SearchBudget) -> MoveResult {
        if let Strategy::Hard(state) = &mut self.strategy {
            state.searcher.set_cancel_token(self.cancel.clone());
        }
        let result = self
            .strategy
            .find_move(board, self.stone, &mut self.rng, &self.config, budget);
        debug!(
            "{} {:?} -> {:?} via {:?} in {}ms ({} nodes)",
            self.difficulty,
            self.stone,
            result.best_move,
            result.search_type,
            result.time_ms,
            result.nodes
        );
        result
    }

    fn default_budget(&self) -> SearchBudget {
        let budget = if self.config.time_limit_ms == 0 {
            SearchBudget::unlimited()
        } else {
            SearchBudget::with_time_limit(self.config.time_limit())
        };
        budget.nodes(self.config.max_nodes)
    }

    /// Feed a finished game into the learning store and save it.
    ///
    /// Only Hard learns. `winner` is `None` for a draw. Save failures are
    /// logged and otherwise ignored.
    pub fn record_game(&mut self, board: &Board, winner: Option<Stone>) {
        let Strategy::Hard(state) = &mut self.strategy else {
            return;
        };
        let touched = state.store.record_game(board.moves(), self.stone, winner);
        debug!("recorded {} positions for {:?}", touched, winner);
        if let Err(e) = state.store.save() {
            warn!("failed to save learning data: {}", e);
        }
    }
}

/// Outcome of a [`MoveTask`]: the engine handed back with its move.
pub struct TaskOutcome {
    pub engine: AIEngine,
    pub result: MoveResult,
}

/// An engine move computed on a worker thread.
///
/// The engine and a copy of the board move into the worker; the engine comes
/// back through [`MoveTask::try_finish`] or [`MoveTask::wait`].
pub struct MoveTask {
    receiver: Receiver<TaskOutcome>,
    cancel: CancelToken,
    started: Instant,
}

impl MoveTask {
    /// Start searching. `deadline` overrides the engine's configured time
    /// limit; the node budget still applies.
    pub fn spawn(mut engine: AIEngine, mut board: Board, deadline: Option<Instant>) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        engine.set_cancel_token(cancel.clone());

        let mut budget = engine.default_budget();
        if deadline.is_some() {
            budget.deadline = deadline;
        }

        thread::spawn(move || {
            let result = engine.get_move_with_budget(&mut board, budget);
            // Receiver gone means the caller abandoned the task
            let _ = tx.send(TaskOutcome { engine, result });
        });

        Self {
            receiver: rx,
            cancel,
            started: Instant::now(),
        }
    }

    /// Ask the worker to stop and return its best move so far.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Non-blocking poll. `Ok(None)` while the worker is still running.
    pub fn try_finish(&self) -> Result<Option<TaskOutcome>, TaskError> {
        match self.receiver.try_recv() {
            Ok(outcome) => Ok(Some(outcome)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TaskError::WorkerLost),
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> Result<TaskOutcome, TaskError> {
        self.receiver.recv().map_err(|_| TaskError::WorkerLost)
    }
}
