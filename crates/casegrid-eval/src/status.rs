use casegrid_core::Assignment;
use casegrid_plan::ResolvedRules;

/// Status of a row with no combine rule behind it.
pub const STATUS_OK: &str = "ok";

/// Label a row with the first combine rule that could have produced it.
///
/// Returns `combined:<target>=<value>` when a combine rule's condition holds
/// and the row's target value is one of the rule's targets, else `ok`.
pub fn row_status(rules: &ResolvedRules<'_>, assignment: &Assignment) -> String {
    for rule in &rules.combine {
        if !rule.when.matches(assignment) {
            continue;
        }
        if let Some(value) = assignment.get(rule.target) {
            if rule.values.iter().any(|target| *target == value) {
                return format!("combined:{}={value}", rule.target);
            }
        }
    }
    STATUS_OK.to_string()
}

pub fn row_statuses(rules: &ResolvedRules<'_>, assignments: &[Assignment]) -> Vec<String> {
    assignments
        .iter()
        .map(|assignment| row_status(rules, assignment))
        .collect()
}
