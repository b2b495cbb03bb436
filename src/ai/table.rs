//! Transposition table: cached search results keyed by exact position.
//!
//! The key is the full `(black, white, side-to-move)` triple, so distinct
//! boards can never collide. The table is owned by a [`crate::ai::Searcher`]
//! rather than living in a global, and it deliberately never evicts within a
//! session; callers reset it by dropping the searcher or calling [`clear`].
//!
//! [`clear`]: TranspositionTable::clear

use std::collections::HashMap;
use std::sync::Mutex;

use crate::board::Board;
use crate::types::Player;

/// How a cached value relates to the true score of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Search completed inside the window.
    Exact,
    /// Fail-high: true score >= value.
    LowerBound,
    /// Fail-low: true score <= value.
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TableKey {
    black: u64,
    white: u64,
    player: Player,
}

impl TableKey {
    fn new(board: &Board, player: Player) -> Self {
        let (black, white) = board.bitboards();
        Self {
            black,
            white,
            player,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    value: f32,
    depth: u8,
    bound: Bound,
}

/// Shared cache from `(board, player)` to a search bound.
///
/// Interior locking lets the parallel root share one table; a write is a
/// single insert under the lock, so readers never observe a partial entry.
#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: Mutex<HashMap<TableKey, TableEntry>>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a cached value usable to short-circuit the current node:
    /// the stored depth must cover the requested depth, and the bound kind
    /// must be conclusive for the `[alpha, beta]` window.
    pub fn lookup(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        alpha: f32,
        beta: f32,
    ) -> Option<f32> {
        let entries = self.entries.lock().expect("transposition table lock poisoned");
        let entry = entries.get(&TableKey::new(board, player))?;

        if entry.depth < depth {
            return None;
        }

        match entry.bound {
            Bound::Exact => Some(entry.value),
            Bound::LowerBound if entry.value >= beta => Some(entry.value),
            Bound::UpperBound if entry.value <= alpha => Some(entry.value),
            _ => None,
        }
    }

    /// Classifies `value` against the window the node was entered with and
    /// records it, preferring deeper entries over shallower ones.
    pub fn store(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        value: f32,
        alpha_orig: f32,
        beta: f32,
    ) {
        let bound = if value <= alpha_orig {
            Bound::UpperBound
        } else if value >= beta {
            Bound::LowerBound
        } else {
            Bound::Exact
        };

        let key = TableKey::new(board, player);
        let mut entries = self.entries.lock().expect("transposition table lock poisoned");
        match entries.get(&key) {
            Some(existing) if existing.depth > depth => {}
            _ => {
                entries.insert(key, TableEntry { value, depth, bound });
            }
        }
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("transposition table lock poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("transposition table lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
