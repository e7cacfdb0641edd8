//! Position evaluation
//!
//! - [`patterns`]: line shapes along the four axes and their scores
//! - [`heuristic`]: whole-board scoring and one-ply move pre-scores

pub mod heuristic;
pub mod patterns;

pub use heuristic::{cell_value, evaluate, order_score, position_value, score_move, DEFENSE_FACTOR};
pub use patterns::{line_shape, LineShape, PatternScore, AXES};
