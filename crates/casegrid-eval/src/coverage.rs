use std::collections::BTreeMap;

use casegrid_core::{Assignment, CategorySpace, CoverageMap, PairUniverse, value_indices};

use crate::metrics::{
    CategoryCoverage, METRICS_VERSION, MissingPair, SuiteMetrics, ValueCount,
};

/// Options for suite evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluateOptions {
    /// Cap on the uncovered pairs listed in the metrics.
    pub max_missing_pairs: usize,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            max_missing_pairs: 20,
        }
    }
}

/// Measure pair and value coverage of `assignments` over `space`.
///
/// Cells that do not resolve against the space are ignored for coverage and
/// the row is counted as invalid. `statuses`, when given, are tallied into
/// `status_counts`.
pub fn collect_suite_metrics(
    space: &CategorySpace,
    assignments: &[Assignment],
    statuses: Option<&[String]>,
    options: &EvaluateOptions,
) -> SuiteMetrics {
    let universe = PairUniverse::new(space);
    let mut coverage = CoverageMap::new(&universe);
    let mut counts: Vec<Vec<u64>> = space
        .iter()
        .map(|category| vec![0; category.values.len()])
        .collect();
    let mut invalid_rows = 0;

    for assignment in assignments {
        let indices = value_indices(space, assignment);
        let complete = indices.iter().all(Option::is_some);
        if !complete || assignment.len() != space.len() {
            invalid_rows += 1;
        }

        for (category, index) in indices.iter().enumerate() {
            if let Some(index) = index {
                counts[category][*index] += 1;
            }
        }
        coverage.mark(&universe.pairs_of_partial(&indices));
    }

    let categories = space
        .iter()
        .zip(&counts)
        .map(|(category, counts)| {
            let occurrences: Vec<ValueCount> = category
                .values
                .iter()
                .zip(counts)
                .map(|(value, count)| ValueCount {
                    value: value.clone(),
                    count: *count,
                })
                .collect();
            let missing: Vec<String> = occurrences
                .iter()
                .filter(|entry| entry.count == 0)
                .map(|entry| entry.value.clone())
                .collect();
            CategoryCoverage {
                category: category.name.clone(),
                values_total: category.values.len(),
                values_covered: category.values.len() - missing.len(),
                occurrences,
                missing,
            }
        })
        .collect();

    let missing_pairs = coverage
        .missing()
        .take(options.max_missing_pairs)
        .filter_map(|id| universe.describe(id))
        .filter_map(|pair| {
            let first = space.categories.get(pair.first)?;
            let second = space.categories.get(pair.second)?;
            Some(MissingPair {
                category_a: first.name.clone(),
                value_a: first.values.get(pair.first_value)?.clone(),
                category_b: second.name.clone(),
                value_b: second.values.get(pair.second_value)?.clone(),
            })
        })
        .collect();

    let mut status_counts = BTreeMap::new();
    if let Some(statuses) = statuses {
        for status in statuses {
            *status_counts.entry(status.clone()).or_insert(0) += 1;
        }
    }

    let pair_coverage = coverage.summary();
    SuiteMetrics {
        metrics_version: METRICS_VERSION.to_string(),
        rows: assignments.len(),
        invalid_rows,
        pair_coverage,
        pair_coverage_pct: pair_coverage.fraction() * 100.0,
        categories,
        missing_pairs,
        status_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space() -> CategorySpace {
        CategorySpace::new()
            .with_category("a", ["a1", "a2"])
            .with_category("b", ["b1", "b2"])
    }

    #[test]
    fn partial_suite_reports_missing_values_and_pairs() {
        let rows = vec![Assignment::new().with("a", "a1").with("b", "b1")];
        let metrics = collect_suite_metrics(&space(), &rows, None, &EvaluateOptions::default());

        assert_eq!(metrics.pair_coverage.total_pairs, 4);
        assert_eq!(metrics.pair_coverage.covered_pairs, 1);
        assert_eq!(metrics.pair_coverage_pct, 25.0);
        assert_eq!(metrics.categories[0].missing, vec!["a2".to_string()]);
        assert!(!metrics.covers_every_value());
        assert_eq!(metrics.missing_pairs.len(), 3);
        assert_eq!(
            metrics.missing_pairs[0],
            MissingPair {
                category_a: "a".to_string(),
                value_a: "a1".to_string(),
                category_b: "b".to_string(),
                value_b: "b2".to_string(),
            }
        );
    }

    #[test]
    fn unknown_values_mark_rows_invalid() {
        let rows = vec![
            Assignment::new().with("a", "a3").with("b", "b1"),
            Assignment::new().with("a", "a1").with("b", "b1").with("c", "x"),
        ];
        let metrics = collect_suite_metrics(&space(), &rows, None, &EvaluateOptions::default());
        assert_eq!(metrics.invalid_rows, 2);
        assert_eq!(metrics.pair_coverage.covered_pairs, 1);
        assert_eq!(metrics.categories[1].occurrences[0].count, 2);
    }

    #[test]
    fn statuses_are_tallied() {
        let rows = vec![
            Assignment::new().with("a", "a1").with("b", "b1"),
            Assignment::new().with("a", "a2").with("b", "b2"),
        ];
        let statuses = vec!["ok".to_string(), "combined:b=b2".to_string()];
        let metrics =
            collect_suite_metrics(&space(), &rows, Some(&statuses), &EvaluateOptions::default());
        assert_eq!(metrics.status_counts.get("ok"), Some(&1));
        assert_eq!(metrics.status_counts.get("combined:b=b2"), Some(&1));
    }
}
