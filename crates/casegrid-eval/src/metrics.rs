use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use casegrid_core::PairCoverage;

/// Metrics contract version for suite evaluation.
pub const METRICS_VERSION: &str = "0.1";

/// Machine-readable metrics for a generated suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteMetrics {
    pub metrics_version: String,
    pub rows: usize,
    /// Rows holding a category the space lacks or a value it does not permit.
    pub invalid_rows: usize,
    pub pair_coverage: PairCoverage,
    pub pair_coverage_pct: f64,
    pub categories: Vec<CategoryCoverage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_pairs: Vec<MissingPair>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub status_counts: BTreeMap<String, u64>,
}

impl SuiteMetrics {
    /// Every category value appears at least once.
    pub fn covers_every_value(&self) -> bool {
        self.categories
            .iter()
            .all(|category| category.missing.is_empty())
    }
}

/// Value coverage of one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCoverage {
    pub category: String,
    pub values_total: usize,
    pub values_covered: usize,
    /// Occurrences per value, in space order.
    pub occurrences: Vec<ValueCount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// A value pair no row of the suite covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingPair {
    pub category_a: String,
    pub value_a: String,
    pub category_b: String,
    pub value_b: String,
}
