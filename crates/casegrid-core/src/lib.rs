//! Core contracts for casegrid.
//!
//! This crate defines the category space, assignments, the pair universe
//! used for pairwise coverage, and the validation shared by generators,
//! the rule engine and the CLI.

pub mod assignment;
pub mod error;
pub mod pairs;
pub mod space;
pub mod validation;

pub use assignment::Assignment;
pub use error::{Error, Result};
pub use pairs::{value_indices, CoverageMap, PairCoverage, PairRef, PairUniverse};
pub use space::{Category, CategoryKey, CategorySpace};
pub use validation::validate_space;
