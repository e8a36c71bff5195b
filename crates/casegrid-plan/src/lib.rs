//! Plan contracts for casegrid: rule sets, generation options, rule
//! resolution and plan validation.

pub mod errors;
pub mod model;
pub mod resolve;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use model::{
    CombineRule, DependencyMode, DependencyRule, ExcludeCondition, ExcludePair, ExcludeRule,
    PLAN_VERSION, Plan, PlanOptions, Rule, RuleKind, RuleSet, Strategy,
};
pub use resolve::{
    Condition, ResolvedCombine, ResolvedDependency, ResolvedExclude, ResolvedRules, RuleIssue,
    SetCondition,
};
pub use schema::plan_json_schema;
pub use validate::{ValidatedPlan, validate_plan, validate_plan_json, validate_plan_semantics};
