use std::collections::HashMap;
use std::ops::RangeInclusive;

use itertools::Itertools;
use shakmaty::Move;

use crate::games::chess::move_to_uci;
use crate::search::Eval;

/// Only nodes this many plies away from the root get a path key.
/// Closer to the root there are too few transpositions, further away the keys get too expensive.
pub const REPETITION_DEPTHS: RangeInclusive<usize> = 3..=6;

/// The moves from the root to a node, in any order.
///
/// This is an approximation of transposition detection: two paths only share a key if they
/// consist of the same moves, which usually (but not always) means they reach the same position.
pub fn path_key(path: &[Move]) -> Option<String> {
    if !REPETITION_DEPTHS.contains(&path.len()) {
        return None;
    }
    Some(path.iter().map(move_to_uci).sorted_unstable().join(" "))
}

/// Results of nodes in the depth band, for the duration of a single top-level search.
#[derive(Debug, Default, Clone)]
pub struct RepeatCache {
    results: HashMap<String, Eval>,
}

impl RepeatCache {
    pub fn get(&self, key: &str) -> Option<&Eval> {
        self.results.get(key)
    }

    pub fn insert(&mut self, key: String, eval: Eval) {
        _ = self.results.insert(key, eval);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
