use casegrid_core::validate_space;
use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{PlanError, ValidationIssue, ValidationReport};
use crate::model::{PLAN_VERSION, Plan, PlanOptions, Strategy};
use crate::resolve::ResolvedRules;
use crate::schema::plan_json_schema;

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: Plan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error(
                "schema_violation",
                path,
                error.to_string(),
            ));
        }
    }

    Ok(report)
}

/// Validate a parsed plan: version, space invariants, options and rule
/// references.
///
/// Dangling rule references are warnings, never errors: such rules are
/// inert at generation time.
pub fn validate_plan_semantics(plan: &Plan) -> ValidationReport {
    let mut report = ValidationReport::default();

    if plan.plan_version != PLAN_VERSION {
        report.push(
            ValidationIssue::error(
                "plan_version_mismatch",
                "/plan_version",
                format!(
                    "plan_version '{}' is not supported (expected '{PLAN_VERSION}')",
                    plan.plan_version
                ),
            )
            .with_hint(format!("set plan_version to \"{PLAN_VERSION}\"")),
        );
    }

    if let Err(err) = validate_space(&plan.space) {
        report.push(ValidationIssue::error("invalid_space", "/space", err.to_string()));
    }

    if let Some(options) = &plan.options {
        validate_options(options, &mut report);
    }

    let resolved = ResolvedRules::resolve(&plan.space, &plan.rules);
    for issue in resolved.issues {
        report.push(ValidationIssue::warning(
            issue.code,
            format!("/rules/{}", issue.rule_index),
            format!("{} rule: {}", issue.kind, issue.message),
        ));
    }

    report
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(plan_json: &Value) -> Result<ValidatedPlan, ValidationReport> {
    let structural = serde_json::to_value(plan_json_schema())
        .map_err(PlanError::from)
        .and_then(|plan_schema| validate_plan_json(plan_json, &plan_schema));
    let structural = match structural {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: Plan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error("invalid_plan_json", "/", err.to_string()));
            return Err(report);
        }
    };

    let semantic = validate_plan_semantics(&plan);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: semantic.warnings,
    })
}

fn validate_options(options: &PlanOptions, report: &mut ValidationReport) {
    if let Some(strategy) = &options.strategy {
        if let Err(message) = strategy.parse::<Strategy>() {
            let known: Vec<&str> = Strategy::ALL.iter().map(|s| s.id()).collect();
            report.push(
                ValidationIssue::error("unknown_strategy", "/options/strategy", message)
                    .with_hint(format!("use one of: {}", known.join(", "))),
            );
        }
    }

    if options.limit == Some(0) {
        report.push(
            ValidationIssue::error("limit_zero", "/options/limit", "limit must be positive")
                .with_hint("remove the limit or set it to a positive integer"),
        );
    }
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
