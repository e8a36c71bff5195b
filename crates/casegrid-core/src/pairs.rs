//! Pair universe for pairwise coverage.
//!
//! Every unordered pair of categories `(i, j)` with `i < j` contributes one
//! pair id per combination of their values. Ids are dense, so coverage is
//! tracked with a plain bitmap.

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::space::CategorySpace;

/// A single `(category_a, category_b, value_a, value_b)` requirement, by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairRef {
    pub first: usize,
    pub second: usize,
    pub first_value: usize,
    pub second_value: usize,
}

#[derive(Debug, Clone)]
struct PairBlock {
    first: usize,
    second: usize,
    offset: usize,
    second_len: usize,
}

/// Dense index over all category/value pairs of a space.
#[derive(Debug, Clone)]
pub struct PairUniverse {
    blocks: Vec<PairBlock>,
    block_of: Vec<Vec<usize>>,
    total: usize,
}

impl PairUniverse {
    pub fn new(space: &CategorySpace) -> Self {
        let sizes = space.sizes();
        let mut blocks = Vec::new();
        let mut block_of = vec![vec![usize::MAX; sizes.len()]; sizes.len()];
        let mut total = 0usize;

        for first in 0..sizes.len() {
            for second in (first + 1)..sizes.len() {
                block_of[first][second] = blocks.len();
                blocks.push(PairBlock {
                    first,
                    second,
                    offset: total,
                    second_len: sizes[second],
                });
                total += sizes[first] * sizes[second];
            }
        }

        Self {
            blocks,
            block_of,
            total,
        }
    }

    /// Total number of pairs that must be covered.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn id(&self, first: usize, first_value: usize, second: usize, second_value: usize) -> usize {
        let block = &self.blocks[self.block_of[first][second]];
        block.offset + first_value * block.second_len + second_value
    }

    /// Visit the pair ids covered by a complete row of value indices.
    pub fn for_each_pair(&self, indices: &[usize], mut visit: impl FnMut(usize)) {
        for first in 0..indices.len() {
            for second in (first + 1)..indices.len() {
                visit(self.id(first, indices[first], second, indices[second]));
            }
        }
    }

    /// Pair ids covered by a complete row of value indices (space order).
    pub fn pairs_of(&self, indices: &[usize]) -> Vec<usize> {
        let mut ids = Vec::with_capacity(self.blocks.len());
        self.for_each_pair(indices, |id| ids.push(id));
        ids
    }

    /// Number of category pairs, i.e. pairs contributed by one row.
    pub fn pairs_per_row(&self) -> usize {
        self.blocks.len()
    }

    /// Pair ids covered by a row where some categories could not be resolved.
    pub fn pairs_of_partial(&self, indices: &[Option<usize>]) -> Vec<usize> {
        let mut ids = Vec::new();
        for first in 0..indices.len() {
            let Some(first_value) = indices[first] else {
                continue;
            };
            for second in (first + 1)..indices.len() {
                if let Some(second_value) = indices[second] {
                    ids.push(self.id(first, first_value, second, second_value));
                }
            }
        }
        ids
    }

    /// Decode a pair id back into its category/value indices.
    pub fn describe(&self, id: usize) -> Option<PairRef> {
        if id >= self.total {
            return None;
        }
        let block_idx = self
            .blocks
            .partition_point(|block| block.offset <= id)
            .saturating_sub(1);
        let block = &self.blocks[block_idx];
        let local = id - block.offset;
        Some(PairRef {
            first: block.first,
            second: block.second,
            first_value: local / block.second_len,
            second_value: local % block.second_len,
        })
    }
}

/// Resolve an assignment into per-category value indices of `space`.
///
/// Categories missing from the assignment, or holding a value the space
/// does not permit, resolve to `None`.
pub fn value_indices(space: &CategorySpace, assignment: &Assignment) -> Vec<Option<usize>> {
    space
        .iter()
        .map(|category| {
            assignment
                .get(&category.name)
                .and_then(|value| category.value_index(value))
        })
        .collect()
}

/// Mutable coverage bitmap over a [`PairUniverse`].
#[derive(Debug, Clone)]
pub struct CoverageMap {
    covered: Vec<bool>,
    count: usize,
}

impl CoverageMap {
    pub fn new(universe: &PairUniverse) -> Self {
        Self {
            covered: vec![false; universe.len()],
            count: 0,
        }
    }

    /// Number of ids in `pairs` that are not covered yet.
    pub fn gain(&self, pairs: &[usize]) -> usize {
        pairs.iter().filter(|&&id| !self.covered[id]).count()
    }

    /// Mark ids as covered, returning how many were new.
    pub fn mark(&mut self, pairs: &[usize]) -> usize {
        let mut added = 0;
        for &id in pairs {
            if !self.covered[id] {
                self.covered[id] = true;
                added += 1;
            }
        }
        self.count += added;
        added
    }

    /// Uncovered pairs a complete row would add.
    pub fn row_gain(&self, universe: &PairUniverse, indices: &[usize]) -> usize {
        let mut gain = 0;
        universe.for_each_pair(indices, |id| {
            if !self.covered[id] {
                gain += 1;
            }
        });
        gain
    }

    /// Mark every pair of a complete row, returning how many were new.
    pub fn mark_row(&mut self, universe: &PairUniverse, indices: &[usize]) -> usize {
        let mut added = 0;
        let covered = &mut self.covered;
        universe.for_each_pair(indices, |id| {
            if !covered[id] {
                covered[id] = true;
                added += 1;
            }
        });
        self.count += added;
        added
    }

    pub fn covered(&self) -> usize {
        self.count
    }

    pub fn is_complete(&self) -> bool {
        self.count == self.covered.len()
    }

    /// Ids that are still uncovered, ascending.
    pub fn missing(&self) -> impl Iterator<Item = usize> + '_ {
        self.covered
            .iter()
            .enumerate()
            .filter_map(|(id, covered)| (!covered).then_some(id))
    }

    pub fn summary(&self) -> PairCoverage {
        PairCoverage {
            total_pairs: self.covered.len(),
            covered_pairs: self.count,
        }
    }
}

/// Coverage diagnostic for a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCoverage {
    pub total_pairs: usize,
    pub covered_pairs: usize,
}

impl PairCoverage {
    /// Covered fraction in `[0, 1]`; an empty universe counts as fully covered.
    pub fn fraction(&self) -> f64 {
        if self.total_pairs == 0 {
            1.0
        } else {
            self.covered_pairs as f64 / self.total_pairs as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.covered_pairs >= self.total_pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> CategorySpace {
        CategorySpace::new()
            .with_category("a", ["a1", "a2"])
            .with_category("b", ["b1", "b2", "b3"])
            .with_category("c", ["c1", "c2"])
    }

    #[test]
    fn universe_counts_every_value_pair() {
        let universe = PairUniverse::new(&space());
        // a×b + a×c + b×c
        assert_eq!(universe.len(), 6 + 4 + 6);
    }

    #[test]
    fn single_category_has_empty_universe() {
        let space = CategorySpace::new().with_category("a", ["1", "2"]);
        assert!(PairUniverse::new(&space).is_empty());
    }

    #[test]
    fn describe_inverts_pair_ids() {
        let universe = PairUniverse::new(&space());
        for id in universe.pairs_of(&[1, 2, 0]) {
            let pair = universe.describe(id).expect("valid id");
            let expected = [1, 2, 0];
            assert_eq!(pair.first_value, expected[pair.first]);
            assert_eq!(pair.second_value, expected[pair.second]);
        }
        assert!(universe.describe(universe.len()).is_none());
    }

    #[test]
    fn coverage_map_tracks_gain() {
        let universe = PairUniverse::new(&space());
        let mut map = CoverageMap::new(&universe);
        let row = universe.pairs_of(&[0, 0, 0]);
        assert_eq!(map.gain(&row), 3);
        assert_eq!(map.mark(&row), 3);
        assert_eq!(map.gain(&row), 0);
        assert_eq!(map.gain(&universe.pairs_of(&[0, 1, 0])), 2);
        assert_eq!(map.summary().covered_pairs, 3);
        assert_eq!(map.row_gain(&universe, &[1, 1, 1]), 3);
        assert_eq!(map.mark_row(&universe, &[0, 1, 0]), 2);
        assert_eq!(map.covered(), 5);
        assert_eq!(map.missing().count(), universe.len() - 5);
    }

    #[test]
    fn partial_rows_skip_unresolved_categories() {
        let universe = PairUniverse::new(&space());
        assert_eq!(universe.pairs_of_partial(&[Some(0), None, Some(1)]).len(), 1);
    }
}
