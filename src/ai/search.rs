use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use rayon::prelude::*;

use crate::ai::ordering::order_moves;
use crate::ai::table::TranspositionTable;
use crate::ai::{QUIET_FLIP_THRESHOLD, eval};
use crate::board::Board;
use crate::types::{BOARD_SIZE, Difficulty, Player, Position};

const MIN_SCORE: f32 = f32::NEG_INFINITY;
const MAX_SCORE: f32 = f32::INFINITY;

/// Negamax searcher with alpha-beta pruning, quiescence at the horizon and
/// a transposition table it owns for its whole lifetime (one per session).
///
/// All methods take `&self`; the table handles its own locking, so one
/// searcher can serve the rayon fork-join root as well as the sequential
/// baseline.
#[derive(Debug, Default)]
pub struct Searcher {
    table: TranspositionTable,
    nodes: AtomicU64,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session-wide transposition table, exposed for reset and stats.
    pub fn table(&self) -> &TranspositionTable {
        &self.table
    }

    /// Searches the best move for `player` at the given depth.
    ///
    /// Every root child is evaluated with a fresh full window, so the first
    /// move never shadows a sibling; ties keep the orderer's first choice.
    /// Returns `None` when `player` has no legal move (forced pass).
    pub fn find_best_move(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        difficulty: Difficulty,
    ) -> Option<Position> {
        let moves = board.legal_positions(player);
        if moves.is_empty() {
            return None;
        }

        self.nodes.store(0, Ordering::Relaxed);
        let depth = depth.max(1);
        let ordered = order_moves(board, &moves, player, difficulty);

        let mut best: Option<(Position, f32)> = None;
        for mv in ordered {
            let Some(next) = board.apply_move(mv, player) else {
                continue;
            };
            let score = -self.negamax(
                &next,
                depth - 1,
                MIN_SCORE,
                MAX_SCORE,
                player.opponent(),
                difficulty,
            );
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        self.log_result(best, depth);
        best.map(|(mv, _)| mv)
    }

    /// Same contract as [`find_best_move`], with the root children evaluated
    /// concurrently. Each child starts from the window at fork time; siblings
    /// share no live pruning, a deliberate tradeoff for parallel throughput.
    /// A panicking child propagates out of the join instead of producing a
    /// partial result.
    ///
    /// [`find_best_move`]: Searcher::find_best_move
    pub fn find_best_move_parallel(
        &self,
        board: &Board,
        player: Player,
        depth: u8,
        difficulty: Difficulty,
    ) -> Option<Position> {
        let moves = board.legal_positions(player);
        if moves.is_empty() {
            return None;
        }

        self.nodes.store(0, Ordering::Relaxed);
        let depth = depth.max(1);
        let ordered = order_moves(board, &moves, player, difficulty);

        let scored: Vec<(usize, Position, f32)> = ordered
            .par_iter()
            .enumerate()
            .filter_map(|(order, &mv)| {
                let next = board.apply_move(mv, player)?;
                let score = -self.negamax(
                    &next,
                    depth - 1,
                    MIN_SCORE,
                    MAX_SCORE,
                    player.opponent(),
                    difficulty,
                );
                Some((order, mv, score))
            })
            .collect();

        // Deterministic combination regardless of completion order: highest
        // score wins, ties go to the earlier orderer rank.
        let best = scored
            .into_iter()
            .max_by(|a, b| a.2.total_cmp(&b.2).then_with(|| b.0.cmp(&a.0)))
            .map(|(_, mv, score)| (mv, score));

        self.log_result(best, depth);
        best.map(|(mv, _)| mv)
    }

    /// Value of `board` from `player`'s perspective (negamax convention).
    fn negamax(
        &self,
        board: &Board,
        depth: u8,
        alpha: f32,
        beta: f32,
        player: Player,
        difficulty: Difficulty,
    ) -> f32 {
        self.nodes.fetch_add(1, Ordering::Relaxed);

        if let Some(value) = self.table.lookup(board, player, depth, alpha, beta) {
            return value;
        }
        let alpha_orig = alpha;

        if depth == 0 || board.is_game_over() {
            let value = self.quiescence(board, player, alpha, beta);
            self.table.store(board, player, depth, value, alpha_orig, beta);
            return value;
        }

        let moves = board.legal_positions(player);
        let value = if moves.is_empty() {
            // Forced pass: same position, roles swapped, window negated.
            -self.negamax(board, depth - 1, -beta, -alpha, player.opponent(), difficulty)
        } else {
            let ordered = order_moves(board, &moves, player, difficulty);
            let mut alpha = alpha;
            let mut best = MIN_SCORE;
            for mv in ordered {
                let Some(next) = board.apply_move(mv, player) else {
                    continue;
                };
                let score =
                    -self.negamax(&next, depth - 1, -beta, -alpha, player.opponent(), difficulty);
                if score > best {
                    best = score;
                }
                if score > alpha {
                    alpha = score;
                }
                if alpha >= beta {
                    break;
                }
            }
            best
        };

        self.table.store(board, player, depth, value, alpha_orig, beta);
        value
    }

    /// Noisy-move-only extension at the search horizon.
    ///
    /// The advanced evaluator provides the stand-pat baseline; only moves on
    /// a board edge or flipping at least three discs are expanded, so the
    /// recursion is bounded by the noisy filter and the finite board rather
    /// than a fixed depth.
    fn quiescence(&self, board: &Board, player: Player, alpha: f32, beta: f32) -> f32 {
        let stand_pat = eval::advanced(board, player);
        if stand_pat >= beta {
            return stand_pat;
        }
        let mut alpha = alpha.max(stand_pat);
        let mut best = stand_pat;

        for mv in noisy_moves(board, player) {
            let Some(next) = board.apply_move(mv, player) else {
                continue;
            };
            let score = -self.quiescence(&next, player.opponent(), -beta, -alpha);
            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        best
    }

    fn log_result(&self, best: Option<(Position, f32)>, depth: u8) {
        if let Some((mv, score)) = best {
            debug!(
                "search done: depth={} best=({},{}) score={:.1} nodes={} table_entries={}",
                depth,
                mv.row,
                mv.col,
                score,
                self.nodes.load(Ordering::Relaxed),
                self.table.len(),
            );
        }
    }
}

/// Moves volatile enough to look past the horizon: edge placements and
/// multi-disc captures.
fn noisy_moves(board: &Board, player: Player) -> Vec<Position> {
    board
        .legal_positions(player)
        .into_iter()
        .filter(|&mv| {
            is_edge(mv) || board.move_flips(mv, player).count_ones() >= QUIET_FLIP_THRESHOLD
        })
        .collect()
}

fn is_edge(pos: Position) -> bool {
    let last = (BOARD_SIZE - 1) as u8;
    pos.row == 0 || pos.row == last || pos.col == 0 || pos.col == last
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(row: usize, col: usize) -> usize {
        row * BOARD_SIZE + col
    }

    fn bit(pos: usize) -> u64 {
        1u64 << pos
    }

    #[test]
    fn search_returns_a_legal_move_from_the_start_position() {
        let searcher = Searcher::new();
        let board = Board::new();

        let mv = searcher
            .find_best_move(&board, Player::Black, 3, Difficulty::Medium)
            .expect("black has four openings");

        assert_ne!(board.legal_moves(Player::Black) & bit(mv.index()), 0);
    }

    #[test]
    fn search_returns_none_when_the_player_must_pass() {
        let searcher = Searcher::new();
        let black = bit(idx(0, 1));
        let white = u64::MAX ^ bit(idx(0, 0)) ^ black;
        let board = Board::from_bitboards(black, white);

        assert_eq!(board.legal_moves(Player::Black), 0);
        assert_eq!(
            searcher.find_best_move(&board, Player::Black, 4, Difficulty::Hard),
            None
        );
    }

    #[test]
    fn search_takes_the_only_legal_move() {
        let searcher = Searcher::new();
        let white = bit(idx(0, 1));
        let black = u64::MAX ^ bit(idx(0, 0)) ^ white;
        let board = Board::from_bitboards(black, white);

        let mv = searcher
            .find_best_move(&board, Player::Black, 6, Difficulty::Easy)
            .expect("the last hole is playable");
        assert_eq!(mv, Position::new(0, 0));
    }

    #[test]
    fn search_is_deterministic_across_repeated_calls() {
        let searcher = Searcher::new();
        let board = Board::new();

        let first = searcher.find_best_move(&board, Player::Black, 4, Difficulty::Hard);
        // Second call runs against a warm table and must agree.
        let second = searcher.find_best_move(&board, Player::Black, 4, Difficulty::Hard);
        assert_eq!(first, second);
        assert!(searcher.table().len() > 0);
    }

    #[test]
    fn parallel_root_agrees_with_the_sequential_baseline() {
        let board = Board::new();

        let sequential =
            Searcher::new().find_best_move(&board, Player::Black, 3, Difficulty::Medium);
        let parallel = Searcher::new().find_best_move_parallel(
            &board,
            Player::Black,
            3,
            Difficulty::Medium,
        );

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn search_never_mutates_the_caller_board() {
        let searcher = Searcher::new();
        let board = Board::new();
        let before = board;

        searcher.find_best_move(&board, Player::Black, 4, Difficulty::Hard);
        searcher.find_best_move_parallel(&board, Player::White, 3, Difficulty::Easy);

        assert_eq!(board, before);
    }

    #[test]
    fn pass_nodes_are_searched_through_not_scored_as_terminal() {
        // White is blocked but black is not, so the search must pass through
        // white's turn inside the tree instead of treating it as game over.
        let searcher = Searcher::new();
        let black = bit(idx(0, 1)) | bit(idx(0, 2)) | bit(idx(2, 0));
        let white = bit(idx(1, 1)) | bit(idx(1, 2));
        let board = Board::from_bitboards(black, white);
        assert_eq!(board.legal_moves(Player::White), 0);
        assert_ne!(board.legal_moves(Player::Black), 0);

        let mv = searcher.find_best_move(&board, Player::Black, 4, Difficulty::Medium);
        assert!(mv.is_some());
    }

    #[test]
    fn noisy_moves_are_edges_or_big_captures() {
        let board = Board::new();
        // All four openings flip exactly one interior disc: nothing is noisy.
        assert!(noisy_moves(&board, Player::Black).is_empty());

        let black = bit(idx(0, 1)) | bit(idx(0, 5));
        let white = bit(idx(0, 2)) | bit(idx(0, 6));
        let edge_board = Board::from_bitboards(black, white);
        let noisy = noisy_moves(&edge_board, Player::White);
        assert!(noisy.contains(&Position::new(0, 0)));
    }
}
