//! Adversarial search: evaluators, move ordering, transposition table,
//! negamax searcher and the difficulty policy mapping a named level and
//! game phase to a search depth.

pub mod eval;
pub mod ordering;
pub mod search;
pub mod table;

pub use search::Searcher;
pub use table::TranspositionTable;

use crate::types::Difficulty;

/// A move flipping this many discs counts as noisy for quiescence search.
pub(crate) const QUIET_FLIP_THRESHOLD: u32 = 3;

const EARLY_GAME_DISCS: u8 = 16;
const MID_GAME_DISCS: u8 = 32;

/// Search depth for a difficulty level at the current game phase.
///
/// Base depths rise with difficulty and with lateness; the dynamic boost adds
/// up to two plies as the board fills, since a fuller board means a cheaper
/// subtree.
pub fn difficulty_depth(difficulty: Difficulty, discs_placed: u8) -> u8 {
    let base = match difficulty {
        Difficulty::Easy => phase_pick(discs_placed, 2, 2, 4),
        Difficulty::Medium => phase_pick(discs_placed, 3, 2, 6),
        Difficulty::Hard => phase_pick(discs_placed, 5, 6, 8),
    };
    base + endgame_boost(discs_placed)
}

fn phase_pick(discs_placed: u8, early: u8, mid: u8, late: u8) -> u8 {
    if discs_placed < EARLY_GAME_DISCS {
        early
    } else if discs_placed < MID_GAME_DISCS {
        mid
    } else {
        late
    }
}

fn endgame_boost(discs_placed: u8) -> u8 {
    (64u8.saturating_sub(discs_placed) / 10).min(2)
}
