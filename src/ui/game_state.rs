//! Game state management for the Gomoku GUI

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::AppConfig;
use crate::{AIEngine, Board, Difficulty, EngineConfig, MoveResult, MoveTask, Pos, Stone};

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win(Stone),
    Draw,
}

impl GameOutcome {
    fn winner(self) -> Option<Stone> {
        match self {
            GameOutcome::Win(stone) => Some(stone),
            GameOutcome::Draw => None,
        }
    }
}

/// AI computation state
pub enum AiState {
    /// Engine parked between moves
    Idle(AIEngine),
    /// Engine moved into a worker thread
    Thinking(MoveTask),
    /// Worker died with the engine; rebuilt on the next reset
    Lost,
}

/// Human plays Black and moves first, the AI plays White.
pub struct GameState {
    pub board: Board,
    pub human: Stone,
    pub current_turn: Stone,
    pub outcome: Option<GameOutcome>,
    pub last_ai_result: Option<MoveResult>,
    pub message: Option<String>,
    ai: AiState,
    difficulty: Difficulty,
    engine_config: EngineConfig,
    ai_delay: Duration,
    /// The AI waits until this instant before it starts searching
    ai_ready_at: Option<Instant>,
    recorded: bool,
}

impl GameState {
    pub fn new(config: &AppConfig) -> Self {
        let human = Stone::Black;
        let ai = AIEngine::new(human.opponent(), config.difficulty, config.engine.clone());
        Self {
            board: Board::new(),
            human,
            current_turn: Stone::Black,
            outcome: None,
            last_ai_result: None,
            message: None,
            ai: AiState::Idle(ai),
            difficulty: config.difficulty,
            engine_config: config.engine.clone(),
            ai_delay: Duration::from_millis(config.ai_delay_ms),
            ai_ready_at: None,
            recorded: false,
        }
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Start a new game with the same AI.
    pub fn reset(&mut self) {
        self.reclaim_engine();
        self.board.reset();
        self.current_turn = Stone::Black;
        self.outcome = None;
        self.last_ai_result = None;
        self.message = None;
        self.ai_ready_at = None;
        self.recorded = false;
    }

    /// Switch difficulty. Resets the game and rebuilds the AI.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.reset();
        self.difficulty = difficulty;
        // reset() leaves the engine idle
        if let AiState::Idle(engine) = &mut self.ai {
            engine.set_difficulty(difficulty);
        }
    }

    pub fn is_human_turn(&self) -> bool {
        self.outcome.is_none() && self.current_turn == self.human
    }

    pub fn is_ai_turn(&self) -> bool {
        self.outcome.is_none() && self.current_turn != self.human
    }

    pub fn is_ai_thinking(&self) -> bool {
        matches!(self.ai, AiState::Thinking(_))
    }

    /// Elapsed search time while the AI is thinking
    pub fn ai_thinking_elapsed(&self) -> Option<Duration> {
        match &self.ai {
            AiState::Thinking(task) => Some(task.elapsed()),
            _ => None,
        }
    }

    /// Attempt to place the human's stone at `pos`
    pub fn try_place_stone(&mut self, pos: Pos) -> Result<(), String> {
        if self.outcome.is_some() {
            return Err("Game is over".to_string());
        }
        if !self.is_human_turn() {
            return Err("Not your turn".to_string());
        }
        if !self.board.is_empty_at(pos) {
            return Err("Cell is occupied".to_string());
        }

        self.execute_move(pos);
        if self.is_ai_turn() {
            self.ai_ready_at = Some(Instant::now() + self.ai_delay);
        }
        Ok(())
    }

    /// Advance the AI: collect a finished search, or start one once the
    /// pacing delay has passed. Call once per frame.
    pub fn update(&mut self, now: Instant) {
        self.poll_ai();

        if !self.is_ai_turn() || self.is_ai_thinking() {
            return;
        }
        if self.ai_ready_at.is_some_and(|at| now < at) {
            return;
        }
        self.ai_ready_at = None;

        match std::mem::replace(&mut self.ai, AiState::Lost) {
            AiState::Idle(engine) => {
                self.ai = AiState::Thinking(MoveTask::spawn(engine, self.board.clone(), None));
            }
            other => self.ai = other,
        }
    }

    /// Human-readable status line
    pub fn status_text(&self) -> String {
        match self.outcome {
            Some(GameOutcome::Win(stone)) if stone == self.human => "You win!".to_string(),
            Some(GameOutcome::Win(_)) => "AI wins".to_string(),
            Some(GameOutcome::Draw) => "Draw".to_string(),
            None if self.is_ai_turn() => format!("AI ({}) thinking...", self.difficulty),
            None => "Your turn".to_string(),
        }
    }

    fn poll_ai(&mut self) {
        let AiState::Thinking(task) = &self.ai else {
            return;
        };
        match task.try_finish() {
            Ok(None) => {}
            Ok(Some(outcome)) => {
                self.ai = AiState::Idle(outcome.engine);
                let result = outcome.result;
                match result.best_move {
                    Some(pos) if self.is_ai_turn() && self.board.is_empty_at(pos) => self.execute_move(pos),
                    _ => self.message = Some("AI could not find a move".to_string()),
                }
                self.last_ai_result = Some(result);
            }
            Err(e) => {
                warn!("{}", e);
                self.ai = AiState::Lost;
                self.message = Some("AI error".to_string());
            }
        }
    }

    /// Place a stone for the side to move and settle the game if it ended.
    fn execute_move(&mut self, pos: Pos) {
        let color = self.current_turn;
        if !self.board.apply(pos, color) {
            return;
        }
        self.message = None;

        if self.board.check_win(color) {
            self.finish(GameOutcome::Win(color));
        } else if self.board.is_full() {
            self.finish(GameOutcome::Draw);
        } else {
            self.current_turn = color.opponent();
        }
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.outcome = Some(outcome);
        info!("game over after {} moves: {:?}", self.board.stone_count(), outcome);
        if self.recorded {
            return;
        }
        self.recorded = true;
        if let AiState::Idle(engine) = &mut self.ai {
            engine.record_game(&self.board, outcome.winner());
        }
    }

    /// Bring the engine back from an in-flight search.
    fn reclaim_engine(&mut self) {
        match std::mem::replace(&mut self.ai, AiState::Lost) {
            AiState::Thinking(task) => {
                task.cancel();
                self.ai = match task.wait() {
                    Ok(outcome) => AiState::Idle(outcome.engine),
                    Err(_) => AiState::Idle(self.fresh_engine()),
                };
            }
            AiState::Lost => self.ai = AiState::Idle(self.fresh_engine()),
            idle => self.ai = idle,
        }
    }

    fn fresh_engine(&self) -> AIEngine {
        AIEngine::new(self.human.opponent(), self.difficulty, self.engine_config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BOARD_SIZE;
    use std::thread;

    fn config(difficulty: Difficulty) -> AppConfig {
        AppConfig {
            difficulty,
            ai_delay_ms: 0,
            engine: EngineConfig {
                time_limit_ms: 200,
                ..EngineConfig::default()
            },
        }
    }

    fn wait_for_ai(state: &mut GameState) {
        for _ in 0..500 {
            state.update(Instant::now());
            if !state.is_ai_turn() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("AI did not move in time");
    }

    #[test]
    fn test_human_then_ai_alternate() {
        let mut state = GameState::new(&config(Difficulty::Easy));
        assert!(state.is_human_turn());
        state.try_place_stone(Pos::new(7, 7)).unwrap();
        assert!(state.is_ai_turn());
        assert!(state.try_place_stone(Pos::new(0, 0)).is_err());

        wait_for_ai(&mut state);
        assert_eq!(state.board.stone_count(), 2);
        assert_eq!(state.board.last_move().map(|m| m.stone), Some(Stone::White));
        assert!(state.is_human_turn());
        assert!(state.last_ai_result.is_some());
    }

    #[test]
    fn test_rejects_occupied_cell() {
        let mut state = GameState::new(&config(Difficulty::Easy));
        state.board.apply(Pos::new(3, 3), Stone::White);
        assert_eq!(state.try_place_stone(Pos::new(3, 3)), Err("Cell is occupied".to_string()));
    }

    #[test]
    fn test_five_ends_game() {
        let mut state = GameState::new(&config(Difficulty::Easy));
        for c in 0..4 {
            state.board.apply(Pos::new(7, c), Stone::Black);
        }
        state.try_place_stone(Pos::new(7, 4)).unwrap();
        assert_eq!(state.outcome, Some(GameOutcome::Win(Stone::Black)));
        assert_eq!(state.board.win_line().len(), 5);
        assert!(!state.is_ai_turn());
        assert_eq!(state.status_text(), "You win!");
        assert!(state.try_place_stone(Pos::new(0, 0)).is_err());
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut state = GameState::new(&config(Difficulty::Easy));
        // Runs never exceed two in any direction
        let stone_at = |r: usize, c: usize| if (c / 2 + r) % 2 == 0 { Stone::Black } else { Stone::White };
        let last = Pos::new(14, 14);
        for r in 0..BOARD_SIZE {
            for c in 0..BOARD_SIZE {
                let pos = Pos::new(r as u8, c as u8);
                if pos != last {
                    state.board.apply(pos, stone_at(r, c));
                }
            }
        }
        state.current_turn = stone_at(14, 14);
        state.execute_move(last);
        assert_eq!(state.outcome, Some(GameOutcome::Draw));
        assert!(state.board.win_line().is_empty());
    }

    #[test]
    fn test_hard_records_finished_game_once() {
        let mut state = GameState::new(&config(Difficulty::Hard));
        state.board.apply(Pos::new(0, 14), Stone::White);
        for c in 0..4 {
            state.board.apply(Pos::new(7, c), Stone::Black);
        }
        state.try_place_stone(Pos::new(7, 4)).unwrap();
        state.finish(GameOutcome::Win(Stone::Black));

        let AiState::Idle(engine) = &state.ai else {
            panic!("engine should be idle");
        };
        let store = engine.store().unwrap();
        assert_eq!(store.bad().len(), 1);
        assert!(store.good().is_empty());
    }

    #[test]
    fn test_set_difficulty_resets_game() {
        let mut state = GameState::new(&config(Difficulty::Hard));
        state.try_place_stone(Pos::new(7, 7)).unwrap();
        state.update(Instant::now());
        state.set_difficulty(Difficulty::Medium);

        assert_eq!(state.difficulty(), Difficulty::Medium);
        assert!(state.board.is_board_empty());
        assert!(state.is_human_turn());
        assert!(!state.is_ai_thinking());
        let AiState::Idle(engine) = &state.ai else {
            panic!("engine should be idle");
        };
        assert_eq!(engine.difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_ai_waits_for_pacing_delay() {
        let mut cfg = config(Difficulty::Easy);
        cfg.ai_delay_ms = 60_000;
        let mut state = GameState::new(&cfg);
        state.try_place_stone(Pos::new(7, 7)).unwrap();
        state.update(Instant::now());
        assert!(!state.is_ai_thinking());
        state.update(Instant::now() + Duration::from_secs(61));
        assert!(state.is_ai_thinking() || state.board.stone_count() == 2);
    }
}
