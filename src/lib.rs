//! Gomoku engine and desktop client
//!
//! Five-in-a-row on a 15x15 board, freestyle rules:
//! - Black moves first, players alternate
//! - Five or more in a row on any line wins
//! - A full board with no winner is a draw
//!
//! # Architecture
//!
//! - [`board`]: Bitboard storage, Zobrist position hash, move history
//! - [`eval`]: Line-shape patterns and position scoring
//! - [`search`]: Threat probes and alpha-beta with iterative deepening
//! - [`learning`]: Persistent per-position move bias learned from finished games
//! - [`engine`]: Difficulty levels and the move-selection strategies
//! - [`config`]: TOML configuration
//! - [`ui`]: egui front end
//!
//! # Quick Start
//!
//! ```
//! use gomoku::{AIEngine, Board, Difficulty, EngineConfig, Pos, Stone};
//!
//! let mut board = Board::new();
//! let mut engine = AIEngine::new(Stone::White, Difficulty::Hard, EngineConfig::default());
//!
//! board.apply(Pos::new(7, 7), Stone::Black);
//!
//! // AI responds as White
//! if let Some(pos) = engine.get_move(&mut board) {
//!     board.apply(pos, Stone::White);
//!     println!("AI plays at ({}, {})", pos.row, pos.col);
//! }
//! ```
//!
//! # Search Priority (Hard)
//!
//! 1. Immediate winning move
//! 2. Block the opponent's immediate win
//! 3. Block a cell giving the opponent two open fours
//! 4. Block the opponent's open three
//! 5. Opening pick near the centre while the board is sparse
//! 6. Alpha-Beta search with transposition cache and learned move bias

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod learning;
pub mod search;
pub mod ui;

// Re-export commonly used types for convenience
pub use board::{Board, Move, Pos, PositionHash, Stone, BOARD_SIZE};
pub use config::{AppConfig, EngineConfig};
pub use engine::{AIEngine, Difficulty, MoveResult, MoveTask, SearchType};
pub use error::{ConfigError, StoreError, TaskError};
pub use learning::{LearningStore, StoreLimits};
