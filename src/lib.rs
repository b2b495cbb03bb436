//! 8×8 Reversi engine: board model and move rules, static evaluation,
//! negamax search with alpha-beta pruning, quiescence and a transposition
//! table, plus a small session facade for embedding applications.
//!
//! The crate has no wire protocol or UI; callers hand in a board, a player
//! to move and a difficulty, and get back legal moves, fresh boards, or the
//! engine's chosen move.

pub mod ai;
pub mod board;
pub mod game;
pub mod types;

pub use ai::{Searcher, difficulty_depth};
pub use board::Board;
pub use game::{GameInstance, MoveSelector, SearchSelector};
pub use types::{Cell, Difficulty, EngineError, GameResult, GameState, Player, Position};
