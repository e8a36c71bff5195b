use casegrid_core::{Assignment, CategorySpace};
use casegrid_plan::Strategy;

use super::product::ProductIndices;
use super::Generator;

/// Full Cartesian product, earlier categories varying slowest.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullCombination;

impl Generator for FullCombination {
    fn strategy(&self) -> Strategy {
        Strategy::All
    }

    fn summary(&self) -> &'static str {
        "every combination of every category value"
    }

    fn generate(&self, space: &CategorySpace) -> Vec<Assignment> {
        ProductIndices::new(space.sizes())
            .map(|row| Assignment::from_indices(space, &row))
            .collect()
    }
}
