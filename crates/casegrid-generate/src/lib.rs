//! Suite generation engine for casegrid.
//!
//! Generators expand a category space into raw assignments; the rule
//! pipeline then fans out, filters and deduplicates them.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod model;
pub mod output;
pub mod planner;
pub mod rules;

pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use generators::{GeneratedSuite, Generator, GeneratorRegistry, generate};
pub use model::{GenerateOptions, GenerationIssue, GenerationReport};
pub use planner::{RunTask, plan_run};
pub use rules::{
    PipelineStats, apply_rules, apply_rules_with_mode, apply_rules_with_stats, dedup,
    enforce_dependency, fan_out, filter_by_dependency, filter_excluded,
};
