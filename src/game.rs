use log::debug;

use crate::ai::{Searcher, difficulty_depth};
use crate::board::Board;
use crate::types::{Difficulty, EngineError, GameResult, GameState, Player, Position};

/// The human plays white, the engine plays black, matching the application
/// this engine serves. White opens.
pub const HUMAN: Player = Player::White;
pub const ENGINE: Player = Player::Black;

/// Strategy seam for the engine's move choice. The default implementation
/// runs the negamax searcher; tests substitute fixed or scripted selectors.
pub trait MoveSelector: Send + Sync {
    fn select_move(&self, board: &Board, player: Player, difficulty: Difficulty)
    -> Option<Position>;
}

/// Default selector: a [`Searcher`] driven by the difficulty policy.
///
/// The searcher (and with it the transposition table) lives as long as the
/// selector, so the cache persists across moves within one session.
#[derive(Debug, Default)]
pub struct SearchSelector {
    searcher: Searcher,
}

impl SearchSelector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MoveSelector for SearchSelector {
    fn select_move(
        &self,
        board: &Board,
        player: Player,
        difficulty: Difficulty,
    ) -> Option<Position> {
        let depth = difficulty_depth(difficulty, board.discs_placed());
        self.searcher.find_best_move(board, player, depth, difficulty)
    }
}

/// One game session: board, turn state and the engine's move selector.
///
/// Turn sequencing stays with the caller; the instance only enforces that
/// each entry point is used on the right turn and with legal moves.
pub struct GameInstance {
    board: Board,
    pub current_player: Player,
    pub difficulty: Difficulty,
    pub is_game_over: bool,
    pub is_pass: bool,
    pub flipped: Vec<u8>,
    selector: Box<dyn MoveSelector>,
}

impl GameInstance {
    pub fn new(difficulty: Difficulty, selector: Box<dyn MoveSelector>) -> Self {
        Self {
            board: Board::new(),
            current_player: HUMAN,
            difficulty,
            is_game_over: false,
            is_pass: false,
            flipped: Vec::new(),
            selector,
        }
    }

    pub fn new_with_search(difficulty: Difficulty) -> Self {
        Self::new(difficulty, Box::new(SearchSelector::new()))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Applies the human's move. Fails fast on out-of-turn, out-of-range and
    /// illegal placements rather than silently ignoring them.
    pub fn place(&mut self, row: u8, col: u8) -> Result<(), EngineError> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        if self.current_player != HUMAN {
            return Err(EngineError::OutOfTurn(HUMAN));
        }
        if row >= 8 || col >= 8 {
            return Err(EngineError::OutOfRange);
        }

        self.apply(Position::new(row, col), HUMAN)
    }

    /// Asks the selector for the engine's move and applies it. The selected
    /// move is re-checked against the legal mask before application.
    pub fn do_engine_move(&mut self) -> Result<(), EngineError> {
        if self.is_game_over {
            return Err(EngineError::GameOver);
        }
        if self.current_player != ENGINE {
            return Err(EngineError::OutOfTurn(ENGINE));
        }
        if self.board.legal_moves(ENGINE) == 0 {
            return Err(EngineError::NoLegalMoves);
        }

        let selected = self
            .selector
            .select_move(&self.board, ENGINE, self.difficulty)
            .ok_or(EngineError::SelectorMisbehaved)?;
        if !self.board.is_valid_move(selected, ENGINE) {
            return Err(EngineError::SelectorMisbehaved);
        }

        self.apply(selected, ENGINE)
    }

    pub fn has_legal_moves_for_current(&self) -> bool {
        self.board.legal_moves(self.current_player) != 0
    }

    /// Transfers the turn without placing a disc. The caller invokes this
    /// when the side to move has no legal move while the opponent still does.
    pub fn pass(&mut self) {
        self.is_pass = true;
        self.flipped.clear();
        self.current_player = self.current_player.opponent();
    }

    pub fn end_game(&mut self) {
        self.is_game_over = true;
    }

    pub fn get_legal_moves(&self) -> Vec<Position> {
        self.board.legal_positions(self.current_player)
    }

    pub fn to_game_state(&self) -> GameState {
        let (black_count, white_count) = self.board.counts();
        GameState {
            board: self.board.to_array().to_vec(),
            current_player: self.current_player.as_u8(),
            black_count,
            white_count,
            is_game_over: self.is_game_over,
            is_pass: self.is_pass,
            flipped: self.flipped.clone(),
        }
    }

    pub fn to_game_result(&self) -> GameResult {
        let (black_count, white_count) = self.board.counts();
        GameResult {
            winner: if black_count > white_count {
                Player::Black.as_u8()
            } else if white_count > black_count {
                Player::White.as_u8()
            } else {
                0
            },
            black_count,
            white_count,
        }
    }

    fn apply(&mut self, pos: Position, player: Player) -> Result<(), EngineError> {
        let flips = self.board.move_flips(pos, player);
        if flips == 0 {
            return Err(EngineError::IllegalMove);
        }

        self.board = self
            .board
            .apply_move(pos, player)
            .ok_or(EngineError::IllegalMove)?;
        self.is_pass = false;
        self.flipped = bitmask_to_indices(flips);
        self.current_player = player.opponent();
        debug!(
            "{player:?} played ({},{}) flipping {} discs",
            pos.row,
            pos.col,
            self.flipped.len()
        );

        if self.board.is_game_over() {
            self.end_game();
        }

        Ok(())
    }

    #[cfg(test)]
    fn set_board_for_test(&mut self, board: Board, current_player: Player) {
        self.board = board;
        self.current_player = current_player;
        self.is_game_over = false;
        self.is_pass = false;
        self.flipped.clear();
    }
}

fn bitmask_to_indices(mask: u64) -> Vec<u8> {
    let mut bits = mask;
    let mut out = Vec::new();

    while bits != 0 {
        let idx = bits.trailing_zeros() as u8;
        out.push(idx);
        bits &= bits - 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_BOARD: u64 = u64::MAX;
    const BOARD_WIDTH: usize = 8;

    struct FixedMoveSelector {
        mv: Position,
    }

    impl MoveSelector for FixedMoveSelector {
        fn select_move(
            &self,
            _board: &Board,
            _player: Player,
            _difficulty: Difficulty,
        ) -> Option<Position> {
            Some(self.mv)
        }
    }

    fn bit(row: usize, col: usize) -> u64 {
        1u64 << (row * BOARD_WIDTH + col)
    }

    #[test]
    fn initial_state_is_correct() {
        let game = GameInstance::new_with_search(Difficulty::Medium);
        let state = game.to_game_state();

        assert_eq!(state.current_player, Player::White.as_u8());
        assert_eq!(state.black_count, 2);
        assert_eq!(state.white_count, 2);
        assert!(!state.is_game_over);
        assert!(!state.is_pass);
        assert!(state.flipped.is_empty());
        assert_eq!(game.get_legal_moves().len(), 4);
    }

    #[test]
    fn t02_illegal_human_move_returns_error() {
        let mut game = GameInstance::new_with_search(Difficulty::Easy);

        assert_eq!(game.place(0, 0), Err(EngineError::IllegalMove));
        assert_eq!(game.place(9, 0), Err(EngineError::OutOfRange));
    }

    #[test]
    fn human_move_flips_and_hands_the_turn_to_the_engine() {
        let mut game = GameInstance::new_with_search(Difficulty::Easy);

        // e3 is a white opening; it flips e4.
        game.place(2, 4).unwrap();
        let state = game.to_game_state();

        assert_eq!(state.current_player, Player::Black.as_u8());
        assert_eq!(state.white_count, 4);
        assert_eq!(state.black_count, 1);
        assert_eq!(state.flipped, vec![28]);
    }

    #[test]
    fn engine_move_out_of_turn_is_rejected() {
        let mut game = GameInstance::new_with_search(Difficulty::Easy);

        assert_eq!(game.do_engine_move(), Err(EngineError::OutOfTurn(ENGINE)));
    }

    #[test]
    fn t03_pass_occurrence_switches_turn() {
        let mut game = GameInstance::new_with_search(Difficulty::Easy);
        let white = bit(0, 1);
        let black = FULL_BOARD ^ bit(0, 0) ^ white;
        game.set_board_for_test(Board::from_bitboards(black, white), HUMAN);

        assert!(!game.has_legal_moves_for_current());
        game.pass();

        assert_eq!(game.current_player, ENGINE);
        assert!(game.is_pass);
        assert!(game.flipped.is_empty());
        assert!(!game.is_game_over);
        assert!(game.has_legal_moves_for_current());
    }

    #[test]
    fn t04_both_passes_end_game() {
        let mut game = GameInstance::new_with_search(Difficulty::Easy);
        let white = FULL_BOARD ^ bit(0, 0);
        game.set_board_for_test(Board::from_bitboards(0, white), HUMAN);

        assert!(!game.has_legal_moves_for_current());
        game.pass();
        assert_eq!(game.current_player, ENGINE);
        assert!(!game.has_legal_moves_for_current());

        game.end_game();
        assert!(game.is_game_over);
    }

    #[test]
    fn t05_full_board_after_move_sets_game_over() {
        let mut game = GameInstance::new(
            Difficulty::Easy,
            Box::new(FixedMoveSelector {
                mv: Position::new(0, 0),
            }),
        );
        let white = bit(0, 1);
        let black = FULL_BOARD ^ bit(0, 0) ^ white;
        game.set_board_for_test(Board::from_bitboards(black, white), ENGINE);

        game.do_engine_move().unwrap();
        let state = game.to_game_state();

        assert!(state.is_game_over);
        assert_eq!(state.current_player, Player::White.as_u8());
        assert_eq!(state.black_count, 64);
        assert_eq!(state.white_count, 0);
        assert_eq!(state.flipped, vec![1]);
        assert_eq!(game.to_game_result().winner, Player::Black.as_u8());
    }

    #[test]
    fn misbehaving_selector_is_caught_before_application() {
        let mut game = GameInstance::new(
            Difficulty::Easy,
            Box::new(FixedMoveSelector {
                mv: Position::new(0, 0), // a1 flips nothing at the start
            }),
        );
        game.set_board_for_test(Board::new(), ENGINE);

        assert_eq!(game.do_engine_move(), Err(EngineError::SelectorMisbehaved));
    }

    #[test]
    fn engine_with_search_selector_plays_a_legal_move() {
        let mut game = GameInstance::new_with_search(Difficulty::Easy);
        game.set_board_for_test(Board::new(), ENGINE);
        let legal = game.board().legal_moves(ENGINE);

        game.do_engine_move().unwrap();
        let state = game.to_game_state();

        assert_eq!(state.black_count + state.white_count, 5);
        assert_eq!(state.current_player, Player::White.as_u8());
        // Exactly one previously-legal square is now black.
        let (black, _) = game.board().bitboards();
        assert_ne!(black & legal, 0);
    }
}
