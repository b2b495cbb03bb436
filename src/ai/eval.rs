//! Static position evaluators.
//!
//! Both functions score a board for one player, higher meaning better for
//! that player. `basic` is the cheap weighted-squares heuristic used for
//! move ordering below Hard; `advanced` adds corner, mobility, parity and
//! X/C-square terms and is the stand-pat baseline of quiescence search.

use crate::board::Board;
use crate::types::Player;

/// Positional weights, row-major. Corners dominate, the squares next to a
/// corner are liabilities until the corner is settled, the center is flat.
const WEIGHTS: [i32; 64] = [
    100, -20, 10, 5, 5, 10, -20, 100, //
    -20, -50, -2, -2, -2, -2, -50, -20, //
    10, -2, -1, -1, -1, -1, -2, 10, //
    5, -2, -1, -1, -1, -1, -2, 5, //
    5, -2, -1, -1, -1, -1, -2, 5, //
    10, -2, -1, -1, -1, -1, -2, 10, //
    -20, -50, -2, -2, -2, -2, -50, -20, //
    100, -20, 10, 5, 5, 10, -20, 100,
];

const CORNERS: [usize; 4] = [0, 7, 56, 63];
/// For each corner: its X-square (diagonal neighbour) and two C-squares
/// (orthogonal neighbours). Penalized only while the corner is still empty.
const CORNER_NEIGHBOURS: [(usize, usize, [usize; 2]); 4] = [
    (0, 9, [1, 8]),
    (7, 14, [6, 15]),
    (56, 49, [48, 57]),
    (63, 54, [55, 62]),
];

const CORNER_WEIGHT: f32 = 500.0;
const X_SQUARE_PENALTY: f32 = 30.0;
const C_SQUARE_PENALTY: f32 = 15.0;
const MOBILITY_WEIGHT: f32 = 10.0;

/// Weighted-squares sum plus a mobility bonus.
pub fn basic(board: &Board, player: Player) -> f32 {
    let (me, opp) = masks(board, player);
    let positional = weight_sum(me) - weight_sum(opp);
    positional as f32 + MOBILITY_WEIGHT * mobility(board, player) as f32
}

/// Full evaluator: positional diff, corner ownership, phase-weighted
/// mobility and disc-parity ratios, and X/C-square penalties that fade
/// once the endgame is close enough that those squares stop being traps.
pub fn advanced(board: &Board, player: Player) -> f32 {
    let (me, opp) = masks(board, player);

    let positional = (weight_sum(me) - weight_sum(opp)) as f32;

    let my_corners = CORNERS.iter().filter(|&&c| me & (1u64 << c) != 0).count() as f32;
    let opp_corners = CORNERS.iter().filter(|&&c| opp & (1u64 << c) != 0).count() as f32;
    let corner_term = CORNER_WEIGHT * (my_corners - opp_corners);

    let my_moves = mobility(board, player) as f32;
    let opp_moves = mobility(board, player.opponent()) as f32;
    let mobility_term = ratio_term(my_moves, opp_moves);

    let my_discs = me.count_ones() as f32;
    let opp_discs = opp.count_ones() as f32;
    let parity_term = ratio_term(my_discs, opp_discs);

    let empties = board.empty_count();
    // Parity decides games at the end; mobility is what wins the middle game.
    let (mobility_weight, parity_weight) = if empties <= 16 { (0.5, 2.0) } else { (2.0, 0.5) };

    let danger_scale = if empties < 20 { 0.4 } else { 1.0 };
    let mut danger = 0.0f32;
    for &(corner, x_square, c_squares) in &CORNER_NEIGHBOURS {
        if (me | opp) & (1u64 << corner) != 0 {
            continue;
        }
        danger -= occupancy_sign(me, opp, x_square) * X_SQUARE_PENALTY;
        for &c in &c_squares {
            danger -= occupancy_sign(me, opp, c) * C_SQUARE_PENALTY;
        }
    }

    positional
        + corner_term
        + mobility_weight * mobility_term
        + parity_weight * parity_term
        + danger_scale * danger
}

/// Count of legal moves for `player`.
pub fn mobility(board: &Board, player: Player) -> u32 {
    board.legal_moves(player).count_ones()
}

/// `100 * (mine - theirs) / (mine + theirs)`, zero when both are zero.
fn ratio_term(mine: f32, theirs: f32) -> f32 {
    if mine + theirs == 0.0 {
        0.0
    } else {
        100.0 * (mine - theirs) / (mine + theirs)
    }
}

/// Splits the board into `(me, opp)` masks for the scoring player.
fn masks(board: &Board, player: Player) -> (u64, u64) {
    let (black, white) = board.bitboards();
    match player {
        Player::Black => (black, white),
        Player::White => (white, black),
    }
}

fn weight_sum(mask: u64) -> i32 {
    let mut sum = 0;
    let mut bits = mask;
    while bits != 0 {
        sum += WEIGHTS[bits.trailing_zeros() as usize];
        bits &= bits - 1;
    }
    sum
}

/// +1 when I occupy the square, -1 when the opponent does, 0 when empty.
fn occupancy_sign(me: u64, opp: u64, square: usize) -> f32 {
    let bit = 1u64 << square;
    if me & bit != 0 {
        1.0
    } else if opp & bit != 0 {
        -1.0
    } else {
        0.0
    }
}
