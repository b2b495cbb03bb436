use once_cell::sync::Lazy;

use crate::types::{BOARD_SIZE, Cell, NUM_SQUARES, Player, Position};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Squares along one direction from a given square, nearest first.
#[derive(Debug, Clone, Copy)]
struct Ray {
    squares: [u8; BOARD_SIZE - 1],
    len: u8,
}

/// Per-square ray table over the 8 direction offsets. Built once; the flip
/// scan walks these instead of re-deriving neighbours per node.
static RAYS: Lazy<[[Ray; 8]; NUM_SQUARES]> = Lazy::new(build_rays);

fn build_rays() -> [[Ray; 8]; NUM_SQUARES] {
    let empty = Ray {
        squares: [0; BOARD_SIZE - 1],
        len: 0,
    };
    let mut rays = [[empty; 8]; NUM_SQUARES];

    for pos in 0..NUM_SQUARES {
        let (row, col) = pos_to_row_col(pos);
        for (dir, &(dr, dc)) in DIRECTIONS.iter().enumerate() {
            let ray = &mut rays[pos][dir];
            let mut r = row + dr;
            let mut c = col + dc;
            while in_bounds(r, c) {
                ray.squares[ray.len as usize] = (r as usize * BOARD_SIZE + c as usize) as u8;
                ray.len += 1;
                r += dr;
                c += dc;
            }
        }
    }

    rays
}

/// Reversi board state represented by two bitboards.
///
/// `Board` is a plain value: every operation that "applies" a move returns a
/// fresh board and leaves the receiver untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    /// Builds a board from raw bitboards. Overlapping masks are a caller bug.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        debug_assert_eq!(black & white, 0, "a square cannot hold two discs");
        Self { black, white }
    }

    /// Raw `(black, white)` masks; the canonical encoding of the position.
    pub fn bitboards(&self) -> (u64, u64) {
        (self.black, self.white)
    }

    /// Occupancy of a single cell.
    pub fn cell(&self, pos: Position) -> Cell {
        let square = bit(pos.index());
        if (self.black & square) != 0 {
            Cell::Black
        } else if (self.white & square) != 0 {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    /// Returns legal move mask for the given side.
    pub fn legal_moves(&self, player: Player) -> u64 {
        let (me, opp) = self.sides(player);
        let occupied = me | opp;
        let mut legal = 0u64;

        for pos in 0..NUM_SQUARES {
            let move_bit = bit(pos);
            if (occupied & move_bit) != 0 {
                continue;
            }
            if Self::collect_flips(pos, me, opp) != 0 {
                legal |= move_bit;
            }
        }

        legal
    }

    /// Legal moves in ascending row-major order. The order is part of the
    /// contract: move ordering and tests rely on it being deterministic.
    pub fn legal_positions(&self, player: Player) -> Vec<Position> {
        let mut mask = self.legal_moves(player);
        let mut out = Vec::new();
        while mask != 0 {
            out.push(Position::from_index(mask.trailing_zeros() as usize));
            mask &= mask - 1;
        }
        out
    }

    /// True iff placing at `pos` would flip at least one opponent run.
    pub fn is_valid_move(&self, pos: Position, player: Player) -> bool {
        self.move_flips(pos, player) != 0
    }

    /// Mask of opponent discs the move would flip. Zero when the move is
    /// illegal (occupied target or no bounded run in any direction).
    pub fn move_flips(&self, pos: Position, player: Player) -> u64 {
        let (me, opp) = self.sides(player);
        Self::collect_flips(pos.index(), me, opp)
    }

    /// Places a disc and flips every bounded opponent run, returning the new
    /// board. `None` when the move is illegal; the receiver is never mutated.
    pub fn apply_move(&self, pos: Position, player: Player) -> Option<Board> {
        let (me, opp) = self.sides(player);
        let flips = Self::collect_flips(pos.index(), me, opp);
        if flips == 0 {
            return None;
        }

        let next_me = me | bit(pos.index()) | flips;
        let next_opp = opp & !flips;

        Some(match player {
            Player::Black => Self {
                black: next_me,
                white: next_opp,
            },
            Player::White => Self {
                black: next_opp,
                white: next_me,
            },
        })
    }

    /// True once the board is full or neither side has a legal move.
    pub fn is_game_over(&self) -> bool {
        self.empty_count() == 0
            || (self.legal_moves(Player::Black) == 0 && self.legal_moves(Player::White) == 0)
    }

    /// Number of discs owned by `player`.
    pub fn count(&self, player: Player) -> u8 {
        match player {
            Player::Black => self.black.count_ones() as u8,
            Player::White => self.white.count_ones() as u8,
        }
    }

    /// Returns `(black_count, white_count)`.
    pub fn counts(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        NUM_SQUARES as u8 - self.discs_placed()
    }

    /// Total discs on the board; the game-phase input of the difficulty policy.
    pub fn discs_placed(&self) -> u8 {
        (self.black | self.white).count_ones() as u8
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (pos, cell) in board.iter_mut().enumerate() {
            let square = bit(pos);
            *cell = if (self.black & square) != 0 {
                1
            } else if (self.white & square) != 0 {
                2
            } else {
                0
            };
        }
        board
    }

    fn sides(&self, player: Player) -> (u64, u64) {
        match player {
            Player::Black => (self.black, self.white),
            Player::White => (self.white, self.black),
        }
    }

    fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
        if pos >= NUM_SQUARES {
            return 0;
        }

        let move_bit = bit(pos);
        if ((me | opp) & move_bit) != 0 {
            return 0;
        }

        let mut flips = 0u64;

        for ray in &RAYS[pos] {
            let mut line = 0u64;
            let mut has_opponent = false;

            for &sq in &ray.squares[..ray.len as usize] {
                let square = bit(sq as usize);
                if (opp & square) != 0 {
                    has_opponent = true;
                    line |= square;
                } else if (me & square) != 0 {
                    if has_opponent {
                        flips |= line;
                    }
                    break;
                } else {
                    break;
                }
            }
        }

        flips
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
