use std::time::Instant;

use tracing::{info, warn};

use casegrid_core::Assignment;
use casegrid_plan::{Plan, ResolvedRules};

use crate::errors::GenerationError;
use crate::generators::GeneratorRegistry;
use crate::model::{GenerateOptions, GenerationIssue, GenerationReport};
use crate::planner::plan_run;
use crate::rules::apply_rules_with_stats;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub assignments: Vec<Assignment>,
    pub report: GenerationReport,
}

/// Entry point for generating a suite from a plan.
///
/// Runs are pure: nothing is written to disk, callers persist the result.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    options: GenerateOptions,
}

impl GenerationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn run(&self, plan: &Plan) -> Result<GenerationResult, GenerationError> {
        self.run_as(plan, uuid::Uuid::new_v4().to_string())
    }

    /// Run under a caller-chosen run id, e.g. the id of a run directory.
    pub fn run_as(&self, plan: &Plan, run_id: String) -> Result<GenerationResult, GenerationError> {
        match self.run_with_id(plan, run_id.clone()) {
            Ok(result) => Ok(result),
            Err(err) => {
                warn!(run_id = %run_id, error = %err, "generation failed");
                Err(err)
            }
        }
    }

    fn run_with_id(
        &self,
        plan: &Plan,
        run_id: String,
    ) -> Result<GenerationResult, GenerationError> {
        let start = Instant::now();
        let task = plan_run(plan, &self.options)?;

        let mut report = GenerationReport::new(run_id.clone(), task.strategy, task.dependency_mode);
        report.plan_name = plan.name.clone();
        report.categories = plan.space.len();
        report.combinations = task.combinations;
        report.limit = task.limit;
        report.rules_total = plan.rules.len();

        info!(
            run_id = %run_id,
            strategy = %task.strategy,
            categories = plan.space.len(),
            rules = plan.rules.len(),
            "generation started"
        );

        let resolved = ResolvedRules::resolve(&plan.space, &plan.rules);
        report.rules_active = resolved.active_count();
        for issue in &resolved.issues {
            warn!(
                rule_index = issue.rule_index,
                kind = %issue.kind,
                code = issue.code,
                "{}",
                issue.message
            );
            report.record_warning(
                GenerationIssue::warning(issue.code, format!("{} rule: {}", issue.kind, issue.message))
                    .for_rule(issue.rule_index),
            );
        }
        info!(
            run_id = %run_id,
            active = resolved.active_count(),
            combine = resolved.combine.len(),
            exclude = resolved.exclude.len(),
            dependency = resolved.dependency.len(),
            inert = resolved.issues.len(),
            "rules resolved"
        );

        let registry = GeneratorRegistry::new();
        let generator = registry
            .get(task.strategy)
            .ok_or_else(|| GenerationError::UnsupportedStrategy(task.strategy.to_string()))?;
        let suite = generator.generate_suite(&plan.space);
        report.raw_assignments = suite.assignments.len();

        if let Some(coverage) = suite.pair_coverage {
            if !coverage.is_complete() {
                warn!(
                    run_id = %run_id,
                    total_pairs = coverage.total_pairs,
                    covered_pairs = coverage.covered_pairs,
                    "pair coverage incomplete"
                );
                report.record_warning(GenerationIssue::warning(
                    "pair_coverage_incomplete",
                    format!(
                        "covered {} of {} value pairs",
                        coverage.covered_pairs, coverage.total_pairs
                    ),
                ));
            }
            report.pair_coverage = Some(coverage);
        }

        let (mut assignments, stats) =
            apply_rules_with_stats(&resolved, suite.assignments, task.dependency_mode);
        report.pipeline = stats;

        if let Some(limit) = task.limit {
            if assignments.len() > limit {
                assignments.truncate(limit);
                report.truncated = true;
            }
        }
        report.final_assignments = assignments.len();
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            raw = report.raw_assignments,
            after_rules = stats.output,
            assignments = report.final_assignments,
            truncated = report.truncated,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult {
            assignments,
            report,
        })
    }
}
