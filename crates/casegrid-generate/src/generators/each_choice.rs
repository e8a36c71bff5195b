use casegrid_core::{Assignment, CategorySpace};
use casegrid_plan::Strategy;

use super::Generator;

/// One row per value of the largest category; smaller categories wrap
/// around with `row mod len`.
///
/// Every value of the largest category appears exactly once. Smaller
/// categories are cycled, so their coverage may be skewed when sizes do
/// not divide evenly.
#[derive(Debug, Clone, Copy, Default)]
pub struct EachChoiceCycle;

impl Generator for EachChoiceCycle {
    fn strategy(&self) -> Strategy {
        Strategy::EachChoice
    }

    fn summary(&self) -> &'static str {
        "every value at least once, cycling shorter categories"
    }

    fn generate(&self, space: &CategorySpace) -> Vec<Assignment> {
        let sizes = space.sizes();
        if sizes.is_empty() || sizes.contains(&0) {
            return Vec::new();
        }

        let rows = sizes.iter().copied().max().unwrap_or(0);
        (0..rows)
            .map(|row| {
                let indices: Vec<usize> = sizes.iter().map(|size| row % size).collect();
                Assignment::from_indices(space, &indices)
            })
            .collect()
    }
}
