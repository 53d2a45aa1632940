use std::fmt::{Display, Formatter};

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display as StrumDisplay, EnumCount as EnumCountMacro, EnumIter};

#[derive(Debug, Copy, Clone, Eq, PartialEq, StrumDisplay, EnumIter, EnumCountMacro)]
pub enum SearchCounter {
    /// Legal moves generated at expanded nodes.
    MovesGenerated,
    /// Children actually searched, which is less than `MovesGenerated` after a cross.
    SiblingsExamined,
    NodesExpanded,
    Crosses,
    CaptureExtensions,
    CheckExtensions,
    PlyExtensions,
    /// Static evaluations below a node that was reached through an extension.
    ExtendedLeaves,
    CacheHits,
}

type Counters = [u64; SearchCounter::COUNT];

#[cfg(feature = "statistics")]
#[derive(Debug, Default, Clone)]
pub struct Statistics {
    per_depth: Vec<Counters>,
    nodes: u64,
}

#[cfg(not(feature = "statistics"))]
#[derive(Debug, Default, Clone)]
pub struct Statistics {
    nodes: u64,
    cache_hits: u64,
}

/// Functions that exist even if there are no statistics being collected, because they're cheap
impl Statistics {
    pub fn count_leaf(&mut self) {
        self.nodes += 1;
    }

    pub fn leaves(&self) -> u64 {
        self.nodes
    }
}

#[cfg(feature = "statistics")]
impl Statistics {
    pub fn increment(&mut self, counter: SearchCounter, depth: usize) {
        self.add(counter, depth, 1);
    }

    pub fn add(&mut self, counter: SearchCounter, depth: usize, amount: u64) {
        if self.per_depth.len() <= depth {
            self.per_depth.resize(depth + 1, Counters::default());
        }
        self.per_depth[depth][counter as usize] += amount;
    }

    pub fn total(&self, counter: SearchCounter) -> u64 {
        self.per_depth.iter().map(|row| row[counter as usize]).sum()
    }

    pub fn at_depth(&self, counter: SearchCounter, depth: usize) -> u64 {
        self.per_depth.get(depth).map_or(0, |row| row[counter as usize])
    }

    pub fn max_depth(&self) -> usize {
        self.per_depth.len()
    }
}

#[cfg(not(feature = "statistics"))]
impl Statistics {
    pub fn increment(&mut self, counter: SearchCounter, depth: usize) {
        self.add(counter, depth, 1);
    }

    pub fn add(&mut self, counter: SearchCounter, _depth: usize, amount: u64) {
        if counter == SearchCounter::CacheHits {
            self.cache_hits += amount;
        }
    }

    pub fn total(&self, counter: SearchCounter) -> u64 {
        match counter {
            SearchCounter::CacheHits => self.cache_hits,
            _ => 0,
        }
    }

    pub fn at_depth(&self, _counter: SearchCounter, _depth: usize) -> u64 {
        0
    }

    pub fn max_depth(&self) -> usize {
        0
    }
}

/// Human-readable overview of a finished search, written to the debug log.
pub struct Summary<'a>(pub &'a Statistics);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let stats = self.0;
        write!(f, "leaves {}", stats.leaves())?;
        for counter in SearchCounter::iter() {
            let total = stats.total(counter);
            if total > 0 {
                write!(f, ", {counter}: {total}")?;
            }
        }
        for depth in 0..stats.max_depth() {
            let expanded = stats.at_depth(SearchCounter::NodesExpanded, depth);
            let examined = stats.at_depth(SearchCounter::SiblingsExamined, depth);
            let generated = stats.at_depth(SearchCounter::MovesGenerated, depth);
            if expanded == 0 {
                continue;
            }
            write!(
                f,
                "\n  depth {depth}: nodes {expanded}, avg moves {0:.1}, examined {1:.1}%",
                generated as f64 / expanded as f64,
                examined as f64 / generated.max(1) as f64 * 100.0
            )?;
        }
        Ok(())
    }
}
