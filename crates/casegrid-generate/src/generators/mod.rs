//! Suite generators, one per [`Strategy`].

mod each_choice;
mod full;
mod pairwise;
mod product;

use casegrid_core::{Assignment, CategorySpace, PairCoverage, validate_space};
use casegrid_plan::Strategy;

use crate::errors::GenerationError;

pub use each_choice::EachChoiceCycle;
pub use full::FullCombination;
pub use pairwise::PairwiseGreedy;
pub use product::ProductIndices;

/// Raw generator output before rules are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedSuite {
    pub assignments: Vec<Assignment>,
    /// Only set by generators that target pair coverage.
    pub pair_coverage: Option<PairCoverage>,
}

/// Deterministic, side-effect free suite generator.
pub trait Generator: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// One-line description shown by `casegrid strategies`.
    fn summary(&self) -> &'static str;

    fn generate(&self, space: &CategorySpace) -> Vec<Assignment>;

    fn id(&self) -> &'static str {
        self.strategy().id()
    }

    fn generate_suite(&self, space: &CategorySpace) -> GeneratedSuite {
        GeneratedSuite {
            assignments: self.generate(space),
            pair_coverage: None,
        }
    }
}

/// Registered generators in [`Strategy::ALL`] order.
pub struct GeneratorRegistry {
    generators: Vec<Box<dyn Generator>>,
}

impl GeneratorRegistry {
    pub fn new() -> Self {
        Self {
            generators: vec![
                Box::new(FullCombination),
                Box::new(EachChoiceCycle),
                Box::new(PairwiseGreedy),
            ],
        }
    }

    pub fn get(&self, strategy: Strategy) -> Option<&dyn Generator> {
        self.generators
            .iter()
            .find(|generator| generator.strategy() == strategy)
            .map(|generator| generator.as_ref())
    }

    /// Look up a generator by identifier or alias.
    pub fn resolve(&self, id: &str) -> Result<&dyn Generator, GenerationError> {
        let strategy: Strategy = id
            .parse()
            .map_err(|_| GenerationError::UnsupportedStrategy(id.to_string()))?;
        self.get(strategy)
            .ok_or_else(|| GenerationError::UnsupportedStrategy(id.to_string()))
    }

    pub fn generator_ids(&self) -> Vec<&'static str> {
        self.generators.iter().map(|generator| generator.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Generator> {
        self.generators.iter().map(|generator| generator.as_ref())
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate the raw suite for `strategy` over `space`.
///
/// Fails on an unknown strategy identifier or an invalid space. No rules
/// are applied and no size cap is enforced.
pub fn generate(strategy: &str, space: &CategorySpace) -> Result<Vec<Assignment>, GenerationError> {
    let registry = GeneratorRegistry::new();
    let generator = registry.resolve(strategy)?;
    validate_space(space)?;
    Ok(generator.generate(space))
}
