use casegrid_core::{Assignment, CategorySpace, CoverageMap, PairCoverage, PairUniverse};
use casegrid_plan::Strategy;
use tracing::debug;

use super::product::ProductIndices;
use super::{GeneratedSuite, Generator};

/// Greedy pairwise coverage.
///
/// Seeds the suite with the first value of every category, then repeatedly
/// picks the candidate of the full product that covers the most uncovered
/// value pairs. Ties go to the first candidate in product order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseGreedy;

impl PairwiseGreedy {
    /// Generate the suite together with its pair coverage diagnostic.
    pub fn generate_with_coverage(&self, space: &CategorySpace) -> (Vec<Assignment>, PairCoverage) {
        let sizes = space.sizes();
        let empty = PairCoverage {
            total_pairs: 0,
            covered_pairs: 0,
        };

        if sizes.is_empty() || sizes.contains(&0) {
            return (Vec::new(), empty);
        }

        if sizes.len() == 1 {
            let suite = (0..sizes[0])
                .map(|idx| Assignment::from_indices(space, &[idx]))
                .collect();
            return (suite, empty);
        }

        let universe = PairUniverse::new(space);
        let mut coverage = CoverageMap::new(&universe);

        let seed = vec![0; sizes.len()];
        coverage.mark_row(&universe, &seed);

        let mut pool: Vec<Vec<usize>> = ProductIndices::new(sizes)
            .filter(|row| *row != seed)
            .collect();
        let mut suite = vec![seed];

        // No row can cover more than one pair per category pair.
        let max_gain = universe.pairs_per_row();

        while !coverage.is_complete() && !pool.is_empty() {
            let mut best: Option<(usize, usize)> = None;
            for (position, row) in pool.iter().enumerate() {
                let gain = coverage.row_gain(&universe, row);
                if best.is_none_or(|(_, best_gain)| gain > best_gain) {
                    best = Some((position, gain));
                    if gain == max_gain {
                        break;
                    }
                }
            }

            match best {
                Some((position, gain)) if gain > 0 => {
                    let row = pool.remove(position);
                    coverage.mark_row(&universe, &row);
                    suite.push(row);
                }
                _ => break,
            }
        }

        if !coverage.is_complete() {
            fill_uncovered(&universe, &mut coverage, pool, &mut suite);
        }

        let summary = coverage.summary();
        debug!(
            rows = suite.len(),
            total_pairs = summary.total_pairs,
            covered_pairs = summary.covered_pairs,
            "pairwise suite built"
        );

        let suite = suite
            .iter()
            .map(|row| Assignment::from_indices(space, row))
            .collect();
        (suite, summary)
    }
}

/// Append, in pool order, every row that still adds an uncovered pair.
/// Stops as soon as coverage is complete.
fn fill_uncovered(
    universe: &PairUniverse,
    coverage: &mut CoverageMap,
    pool: Vec<Vec<usize>>,
    suite: &mut Vec<Vec<usize>>,
) {
    for row in pool {
        if coverage.is_complete() {
            break;
        }
        if coverage.mark_row(universe, &row) > 0 {
            suite.push(row);
        }
    }
}

impl Generator for PairwiseGreedy {
    fn strategy(&self) -> Strategy {
        Strategy::Pairwise
    }

    fn summary(&self) -> &'static str {
        "every value pair of every two categories, greedy minimal suite"
    }

    fn generate(&self, space: &CategorySpace) -> Vec<Assignment> {
        self.generate_with_coverage(space).0
    }

    fn generate_suite(&self, space: &CategorySpace) -> GeneratedSuite {
        let (assignments, coverage) = self.generate_with_coverage(space);
        GeneratedSuite {
            assignments,
            pair_coverage: Some(coverage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_binary_categories_need_every_row() {
        let space = CategorySpace::new()
            .with_category("a", ["a1", "a2"])
            .with_category("b", ["b1", "b2"]);
        let (suite, coverage) = PairwiseGreedy.generate_with_coverage(&space);
        assert_eq!(suite.len(), 4);
        assert!(coverage.is_complete());
        assert_eq!(coverage.total_pairs, 4);
    }

    #[test]
    fn three_binary_categories_fit_in_four_rows() {
        let space = CategorySpace::new()
            .with_category("a", ["0", "1"])
            .with_category("b", ["0", "1"])
            .with_category("c", ["0", "1"]);
        let (suite, coverage) = PairwiseGreedy.generate_with_coverage(&space);
        assert!(coverage.is_complete());
        assert_eq!(suite.len(), 4);
        // seed, then the first row that flips every pair
        assert_eq!(suite[0], Assignment::from_indices(&space, &[0, 0, 0]));
        assert_eq!(suite[1], Assignment::from_indices(&space, &[0, 1, 1]));
    }

    #[test]
    fn single_category_lists_values() {
        let space = CategorySpace::new().with_category("a", ["x", "y", "z"]);
        let (suite, coverage) = PairwiseGreedy.generate_with_coverage(&space);
        let values: Vec<_> = suite.iter().filter_map(|row| row.get("a")).collect();
        assert_eq!(values, vec!["x", "y", "z"]);
        assert_eq!(coverage.fraction(), 1.0);
    }

    #[test]
    fn fill_uncovered_appends_contributing_rows_until_complete() {
        let space = CategorySpace::new()
            .with_category("a", ["a1", "a2"])
            .with_category("b", ["b1", "b2"]);
        let universe = PairUniverse::new(&space);
        let mut coverage = CoverageMap::new(&universe);
        coverage.mark_row(&universe, &[0, 0]);
        let mut suite = vec![vec![0, 0]];

        let pool = vec![
            vec![0, 1],
            vec![0, 1],
            vec![1, 1],
            vec![1, 0],
            vec![0, 0],
        ];
        fill_uncovered(&universe, &mut coverage, pool, &mut suite);

        assert!(coverage.is_complete());
        assert_eq!(suite, vec![vec![0, 0], vec![0, 1], vec![1, 1], vec![1, 0]]);
    }

    #[test]
    fn fill_uncovered_leaves_partial_coverage_when_pool_runs_out() {
        let space = CategorySpace::new()
            .with_category("a", ["a1", "a2"])
            .with_category("b", ["b1", "b2"])
            .with_category("c", ["c1", "c2"]);
        let universe = PairUniverse::new(&space);
        let mut coverage = CoverageMap::new(&universe);
        let mut suite = Vec::new();

        fill_uncovered(&universe, &mut coverage, vec![vec![0, 0, 0], vec![0, 0, 0]], &mut suite);

        assert_eq!(suite, vec![vec![0, 0, 0]]);
        assert!(!coverage.is_complete());
        assert_eq!(coverage.covered(), universe.pairs_per_row());
    }

    #[test]
    fn single_valued_categories_yield_seed_only() {
        let space = CategorySpace::new()
            .with_category("a", ["x"])
            .with_category("b", ["y"]);
        let (suite, _) = PairwiseGreedy.generate_with_coverage(&space);
        assert_eq!(suite.len(), 1);
    }
}
