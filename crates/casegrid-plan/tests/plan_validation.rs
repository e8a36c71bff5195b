use casegrid_plan::{
    CombineRule, DependencyRule, Plan, PlanOptions, RuleSet, plan_json_schema, validate_plan,
    validate_plan_json, validate_plan_semantics,
};
use casegrid_core::CategorySpace;
use std::fs;
use std::path::Path;

fn load_json(path: &Path) -> serde_json::Value {
    let contents =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("missing json at {}", path.display()));
    serde_json::from_str(&contents).expect("parse json")
}

fn shipping_plan_json() -> serde_json::Value {
    let plan_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../plans/examples/shipping.plan.json");
    load_json(&plan_path)
}

fn space() -> CategorySpace {
    CategorySpace::new()
        .with_category("os", ["linux", "windows"])
        .with_category("browser", ["firefox", "edge"])
}

#[test]
fn example_plan_validates_against_schema() {
    let plan_json = shipping_plan_json();
    let plan_schema_json = serde_json::to_value(plan_json_schema()).expect("serialize schema");

    let structural =
        validate_plan_json(&plan_json, &plan_schema_json).expect("validate plan json schema");
    assert!(structural.errors.is_empty(), "structural errors found");

    let validated = validate_plan(&plan_json).expect("plan validation should succeed");
    assert!(validated.warnings.is_empty(), "unexpected warnings");
    assert_eq!(validated.plan.rules.len(), 3);
    assert_eq!(validated.plan.strategy(), Some("pairwise"));
}

#[test]
fn structural_errors_carry_json_pointers() {
    let mut plan_json = shipping_plan_json();
    plan_json["rules"][1]
        .as_object_mut()
        .expect("rule object")
        .remove("then_value");

    let report = validate_plan(&plan_json).expect_err("missing field should fail");
    assert!(report.has_code("schema_violation"));
}

#[test]
fn dangling_rule_references_are_warnings() {
    let plan = Plan::new(space()).with_rules(
        RuleSet::new()
            .with(DependencyRule::new("arch", "arm", "os", "linux"))
            .with(CombineRule::new("os", "linux", "browser", ["chrome"])),
    );

    let report = validate_plan_semantics(&plan);
    assert!(report.is_ok());
    assert_eq!(report.warnings.len(), 3);
    assert_eq!(report.warnings[0].path, "/rules/0");
    assert_eq!(report.warnings[0].code, "rule_category_missing");
    assert!(report.has_code("combine_target_value_missing"));
    assert!(report.has_code("combine_targets_empty"));
}

#[test]
fn rejects_bad_options_and_space() {
    let plan = Plan::new(space().with_category("empty", Vec::<String>::new())).with_options(
        PlanOptions {
            strategy: Some("random".to_string()),
            limit: Some(0),
            dependency_mode: None,
        },
    );

    let report = validate_plan_semantics(&plan);
    assert!(!report.is_ok());
    assert!(report.has_code("invalid_space"));
    assert!(report.has_code("unknown_strategy"));
    assert!(report.has_code("limit_zero"));
}

#[test]
fn rejects_unknown_plan_version() {
    let mut plan = Plan::new(space());
    plan.plan_version = "9.9".to_string();
    let report = validate_plan_semantics(&plan);
    assert!(report.has_code("plan_version_mismatch"));
    assert!(report.errors[0].hint.is_some());
}
