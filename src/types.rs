use serde::Serialize;
use thiserror::Error;

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// Side to move / disc owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// Maps each player to the other. Total, no third value.
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// Encoding used by [`GameState`]: 1=black, 2=white.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Black => 1,
            Self::White => 2,
        }
    }
}

/// Occupancy of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Row-major square index in `0..64`.
    pub fn index(self) -> usize {
        (self.row as usize) * BOARD_SIZE + self.col as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self {
            row: (index / BOARD_SIZE) as u8,
            col: (index % BOARD_SIZE) as u8,
        }
    }
}

/// Engine strength setting, mapped to a search depth by
/// [`crate::ai::difficulty_depth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Public game state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub board: Vec<u8>,
    pub current_player: u8,
    pub black_count: u8,
    pub white_count: u8,
    pub is_game_over: bool,
    /// Contract:
    /// - `true` when the previous action was a pass.
    /// - `false` when the previous action was a normal move.
    pub is_pass: bool,
    /// Contract:
    /// - Normal move: list of flipped square indices (0..=63).
    /// - Pass: must be an empty list.
    pub flipped: Vec<u8>,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// 1=black, 2=white, 0=draw.
    pub winner: u8,
    pub black_count: u8,
    pub white_count: u8,
}

/// Errors surfaced by the session facade in [`crate::game`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("game is already over")]
    GameOver,
    #[error("it is not {0:?}'s turn")]
    OutOfTurn(Player),
    #[error("row/col out of range")]
    OutOfRange,
    #[error("illegal move")]
    IllegalMove,
    #[error("engine has no legal moves")]
    NoLegalMoves,
    #[error("engine selected an illegal move")]
    SelectorMisbehaved,
}
