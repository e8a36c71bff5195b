use casegrid_core::validate_space;
use casegrid_plan::{DependencyMode, Plan, Strategy};

use crate::errors::GenerationError;
use crate::model::GenerateOptions;

/// Settings a single run will execute with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTask {
    pub strategy: Strategy,
    pub limit: Option<usize>,
    pub dependency_mode: DependencyMode,
    /// Full product size, `None` on overflow.
    pub combinations: Option<u64>,
}

/// Merge caller options over plan options and check the run is feasible.
///
/// Checks happen in a fixed order: strategy, space, limit, size cap.
pub fn plan_run(plan: &Plan, options: &GenerateOptions) -> Result<RunTask, GenerationError> {
    let strategy = match options.strategy.as_deref().or(plan.strategy()) {
        Some(id) => id
            .parse::<Strategy>()
            .map_err(|_| GenerationError::UnsupportedStrategy(id.to_string()))?,
        None => options.default_strategy,
    };

    validate_space(&plan.space)?;

    let limit = options.limit.or(plan.limit());
    if limit == Some(0) {
        return Err(GenerationError::InvalidPlan("limit must be positive".to_string()));
    }

    let dependency_mode = options
        .dependency_mode
        .or(plan.dependency_mode())
        .unwrap_or(options.default_dependency_mode);

    let combinations = plan.space.combination_count();
    if strategy != Strategy::EachChoice {
        let within_cap = combinations.is_some_and(|count| count <= options.max_combinations);
        if !within_cap {
            let size = combinations
                .map(|count| count.to_string())
                .unwrap_or_else(|| "more than u64::MAX".to_string());
            return Err(GenerationError::SpaceTooLarge(format!(
                "strategy '{strategy}' would enumerate {size} combinations (max {})",
                options.max_combinations
            )));
        }
    }

    Ok(RunTask {
        strategy,
        limit,
        dependency_mode,
        combinations,
    })
}

#[cfg(test)]
mod tests {
    use casegrid_core::CategorySpace;
    use casegrid_plan::PlanOptions;

    use super::*;

    fn plan() -> Plan {
        Plan::new(
            CategorySpace::new()
                .with_category("a", ["1", "2", "3"])
                .with_category("b", ["1", "2", "3"]),
        )
    }

    #[test]
    fn caller_options_override_plan_options() {
        let plan = plan().with_options(PlanOptions {
            strategy: Some("all".to_string()),
            limit: Some(3),
            dependency_mode: Some(DependencyMode::Enforce),
        });
        let options = GenerateOptions {
            strategy: Some("each".to_string()),
            limit: Some(5),
            ..GenerateOptions::default()
        };

        let task = plan_run(&plan, &options).expect("task");
        assert_eq!(task.strategy, Strategy::EachChoice);
        assert_eq!(task.limit, Some(5));
        assert_eq!(task.dependency_mode, DependencyMode::Enforce);
        assert_eq!(task.combinations, Some(9));
    }

    #[test]
    fn falls_back_to_default_strategy() {
        let task = plan_run(&plan(), &GenerateOptions::default()).expect("task");
        assert_eq!(task.strategy, Strategy::Pairwise);
        assert_eq!(task.dependency_mode, DependencyMode::Filter);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let options = GenerateOptions {
            limit: Some(0),
            ..GenerateOptions::default()
        };
        let err = plan_run(&plan(), &options).expect_err("zero limit");
        assert!(matches!(err, GenerationError::InvalidPlan(_)));
    }

    #[test]
    fn cap_applies_to_product_strategies_only() {
        let options = GenerateOptions {
            max_combinations: 8,
            ..GenerateOptions::default()
        };
        let err = plan_run(&plan(), &options).expect_err("over cap");
        assert!(matches!(err, GenerationError::SpaceTooLarge(_)));

        let options = GenerateOptions {
            strategy: Some("each-choice".to_string()),
            max_combinations: 8,
            ..GenerateOptions::default()
        };
        assert!(plan_run(&plan(), &options).is_ok());
    }
}
