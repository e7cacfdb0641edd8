//! Search module for Gomoku AI
//!
//! Contains:
//! - Tactical threat probes (immediate win, double open four, open three)
//! - Transposition cache scoped to one top-level search
//! - Alpha-Beta search with iterative deepening and a cancellable budget

pub mod alphabeta;
pub mod threat;
pub mod tt;

pub use alphabeta::{CancelToken, SearchBudget, SearchResult, Searcher, WIN_SCORE};
pub use threat::{find_double_open_four, find_immediate_win, find_open_three, Threat};
pub use tt::{CacheKey, CacheStats, EntryType, TranspositionCache};
