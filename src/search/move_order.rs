use std::cmp::Reverse;
use std::collections::HashMap;
use std::fmt::Debug;

use shakmaty::Move;

use crate::games::chess::Chessboard;

/// Unseen moves are treated as if they had been ranked 5th once.
pub const DEFAULT_PRIOR_RANK: i64 = 5;
const BEST_RANK_REWARD: i64 = 3000;
const RANK_PENALTY: i64 = 150;

/// The score a move gets for being ranked `rank`th (starting at 0) among its siblings.
pub const fn rank_reward(rank: i64) -> i64 {
    BEST_RANK_REWARD - RANK_PENALTY * rank
}

/// Decides in which order the children of a node get searched.
///
/// Because the budget of a node is split evenly between its children and the search stops
/// iterating once the bounds cross, the order mostly matters for how early that happens.
/// An instance lives for exactly one top-level search.
pub trait MoveOrder: Debug + Default {
    fn order_moves(&self, board: &Chessboard) -> Vec<Move>;

    /// Called once for every completed group of siblings, best move first.
    fn update_priors(&mut self, sorted_moves: &[Move]);
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Prior {
    sum: i64,
    count: i64,
}

impl Default for Prior {
    fn default() -> Self {
        Self {
            sum: rank_reward(DEFAULT_PRIOR_RANK),
            count: 1,
        }
    }
}

impl Prior {
    fn value(self) -> i64 {
        self.sum.div_euclid(self.count)
    }
}

/// Orders moves by how well they ranked whenever they were searched before, anywhere in the tree.
/// Priors are keyed by the move alone, so the same move in different positions shares one entry.
#[derive(Debug, Default, Clone)]
pub struct PriorWeighted {
    priors: HashMap<Move, Prior>,
}

impl PriorWeighted {
    fn prior(&self, mov: &Move) -> Prior {
        self.priors.get(mov).copied().unwrap_or_default()
    }
}

impl MoveOrder for PriorWeighted {
    fn order_moves(&self, board: &Chessboard) -> Vec<Move> {
        let mut moves = board.legal_moves().to_vec();
        // stable, so ties keep the move generator's order
        moves.sort_by_cached_key(|mov| Reverse(self.prior(mov).value()));
        moves
    }

    fn update_priors(&mut self, sorted_moves: &[Move]) {
        for (rank, mov) in sorted_moves.iter().enumerate() {
            // the first real observation is averaged with the default, not replacing it
            let entry = self.priors.entry(mov.clone()).or_default();
            entry.sum += rank_reward(rank as i64);
            entry.count += 1;
        }
    }
}

#[derive(Debug, Default, Copy, Clone)]
pub struct Unordered {}

impl MoveOrder for Unordered {
    fn order_moves(&self, board: &Chessboard) -> Vec<Move> {
        board.legal_moves().to_vec()
    }

    fn update_priors(&mut self, _sorted_moves: &[Move]) {}
}
