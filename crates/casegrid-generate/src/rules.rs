//! Rule pipeline: combine fan-out, exclusion, dependency, dedup.
//!
//! Stage order is fixed. Every stage takes the rules already resolved
//! against the space, so dangling references have been turned into inert
//! rules before any assignment is touched.

use std::collections::HashSet;

use casegrid_core::{Assignment, CategorySpace};
use casegrid_plan::{DependencyMode, ResolvedRules, RuleSet};
use serde::{Deserialize, Serialize};

/// Assignment counts observed at each pipeline stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub input: usize,
    pub after_combine: usize,
    pub excluded: usize,
    pub dependency_dropped: usize,
    pub dependency_enforced: usize,
    pub duplicates_removed: usize,
    pub output: usize,
}

/// Replace every assignment matched by combine rules with one clone per
/// target value. Clones of several matching rules are concatenated in rule
/// order; unmatched assignments pass through unchanged.
pub fn fan_out(rules: &ResolvedRules<'_>, assignments: Vec<Assignment>) -> Vec<Assignment> {
    if rules.combine.is_empty() {
        return assignments;
    }

    let mut out = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let mut cloned = false;
        for rule in rules.combine.iter().filter(|rule| rule.when.matches(&assignment)) {
            for value in &rule.values {
                out.push(assignment.clone().with(rule.target, *value));
                cloned = true;
            }
        }
        if !cloned {
            out.push(assignment);
        }
    }
    out
}

/// Drop assignments holding any forbidden combination.
pub fn filter_excluded(rules: &ResolvedRules<'_>, assignments: Vec<Assignment>) -> Vec<Assignment> {
    if rules.exclude.is_empty() {
        return assignments;
    }
    assignments
        .into_iter()
        .filter(|assignment| !rules.exclude.iter().any(|rule| rule.matches(assignment)))
        .collect()
}

/// Drop assignments whose antecedent holds while the consequent does not.
pub fn filter_by_dependency(
    rules: &ResolvedRules<'_>,
    assignments: Vec<Assignment>,
) -> Vec<Assignment> {
    if rules.dependency.is_empty() {
        return assignments;
    }
    assignments
        .into_iter()
        .filter(|assignment| {
            !rules
                .dependency
                .iter()
                .any(|rule| rule.is_violated_by(assignment))
        })
        .collect()
}

/// Rewrite the consequent category wherever the antecedent holds, rules in
/// declaration order. Returns the rewritten suite and how many assignments
/// changed.
///
/// Rows are not re-checked here; [`apply_rules_with_stats`] drops rewritten
/// rows that violate an exclusion or another dependency.
pub fn enforce_dependency(
    rules: &ResolvedRules<'_>,
    assignments: Vec<Assignment>,
) -> (Vec<Assignment>, usize) {
    let mut changed = 0;
    let out = assignments
        .into_iter()
        .map(|mut assignment| {
            let mut touched = false;
            for rule in &rules.dependency {
                if rule.is_violated_by(&assignment) {
                    assignment.set(rule.then.category, rule.then.value);
                    touched = true;
                }
            }
            if touched {
                changed += 1;
            }
            assignment
        })
        .collect();
    (out, changed)
}

/// Keep the first occurrence of every content-identical assignment.
pub fn dedup(assignments: Vec<Assignment>) -> Vec<Assignment> {
    let mut seen = HashSet::with_capacity(assignments.len());
    assignments
        .into_iter()
        .filter(|assignment| seen.insert(assignment.clone()))
        .collect()
}

/// Run the full pipeline, filtering on dependencies.
pub fn apply_rules(
    space: &CategorySpace,
    assignments: Vec<Assignment>,
    rules: &RuleSet,
) -> Vec<Assignment> {
    apply_rules_with_mode(space, assignments, rules, DependencyMode::Filter)
}

pub fn apply_rules_with_mode(
    space: &CategorySpace,
    assignments: Vec<Assignment>,
    rules: &RuleSet,
    mode: DependencyMode,
) -> Vec<Assignment> {
    let resolved = ResolvedRules::resolve(space, rules);
    apply_rules_with_stats(&resolved, assignments, mode).0
}

/// Run the full pipeline over pre-resolved rules and report stage counts.
pub fn apply_rules_with_stats(
    rules: &ResolvedRules<'_>,
    assignments: Vec<Assignment>,
    mode: DependencyMode,
) -> (Vec<Assignment>, PipelineStats) {
    let mut stats = PipelineStats {
        input: assignments.len(),
        ..PipelineStats::default()
    };

    let combined = fan_out(rules, assignments);
    stats.after_combine = combined.len();

    let kept = filter_excluded(rules, combined);
    stats.excluded = stats.after_combine - kept.len();

    let before_dependency = kept.len();
    let kept = match mode {
        DependencyMode::Filter => {
            let kept = filter_by_dependency(rules, kept);
            stats.dependency_dropped = before_dependency - kept.len();
            kept
        }
        DependencyMode::Enforce => {
            let (rewritten, changed) = enforce_dependency(rules, kept);
            stats.dependency_enforced = changed;

            // A later rewrite can undo an earlier consequent or land on an
            // excluded combination; such rows are dropped.
            let consistent = filter_by_dependency(rules, rewritten);
            stats.dependency_dropped = before_dependency - consistent.len();
            let before_recheck = consistent.len();
            let kept = filter_excluded(rules, consistent);
            stats.excluded += before_recheck - kept.len();
            kept
        }
    };

    let before_dedup = kept.len();
    let unique = dedup(kept);
    stats.duplicates_removed = before_dedup - unique.len();
    stats.output = unique.len();

    (unique, stats)
}

#[cfg(test)]
mod tests {
    use casegrid_plan::{CombineRule, DependencyRule, ExcludeRule};

    use super::*;

    fn space() -> CategorySpace {
        CategorySpace::new()
            .with_category("os", ["linux", "windows"])
            .with_category("browser", ["firefox", "edge"])
    }

    fn row(os: &str, browser: &str) -> Assignment {
        Assignment::new().with("os", os).with("browser", browser)
    }

    #[test]
    fn empty_input_stays_empty() {
        let rules = RuleSet::new().with(ExcludeRule::pair("os", "linux", "browser", "edge"));
        assert!(apply_rules(&space(), Vec::new(), &rules).is_empty());
    }

    #[test]
    fn fan_out_concatenates_matching_rules() {
        let space = space();
        let rules = RuleSet::new()
            .with(CombineRule::new("os", "linux", "browser", ["firefox", "edge"]))
            .with(CombineRule::new("os", "linux", "browser", ["edge"]));
        let resolved = ResolvedRules::resolve(&space, &rules);

        let out = fan_out(&resolved, vec![row("linux", "firefox"), row("windows", "edge")]);
        assert_eq!(
            out,
            vec![
                row("linux", "firefox"),
                row("linux", "edge"),
                row("linux", "edge"),
                row("windows", "edge"),
            ]
        );
    }

    #[test]
    fn enforce_rewrites_consequent() {
        let space = space();
        let rules = RuleSet::new().with(DependencyRule::new("browser", "edge", "os", "windows"));
        let resolved = ResolvedRules::resolve(&space, &rules);

        let (out, changed) = enforce_dependency(&resolved, vec![row("linux", "edge")]);
        assert_eq!(out, vec![row("windows", "edge")]);
        assert_eq!(changed, 1);
    }

    #[test]
    fn enforce_never_rewrites_into_an_excluded_pair() {
        let space = space();
        let rules = RuleSet::new()
            .with(ExcludeRule::pair("os", "linux", "browser", "edge"))
            .with(DependencyRule::new("browser", "edge", "os", "linux"));
        let resolved = ResolvedRules::resolve(&space, &rules);

        let input = vec![row("windows", "edge"), row("windows", "firefox")];
        let (out, stats) = apply_rules_with_stats(&resolved, input, DependencyMode::Enforce);

        assert_eq!(out, vec![row("windows", "firefox")]);
        assert_eq!(stats.dependency_enforced, 1);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.output, 1);
    }

    #[test]
    fn enforce_drops_rows_a_later_rewrite_breaks() {
        let space = CategorySpace::new()
            .with_category("os", ["linux", "windows"])
            .with_category("browser", ["firefox", "edge"])
            .with_category("arch", ["x86", "arm"]);
        let rules = RuleSet::new()
            .with(DependencyRule::new("os", "windows", "browser", "edge"))
            .with(DependencyRule::new("arch", "arm", "os", "windows"));
        let resolved = ResolvedRules::resolve(&space, &rules);

        let broken = Assignment::new()
            .with("os", "linux")
            .with("browser", "firefox")
            .with("arch", "arm");
        let fine = Assignment::new()
            .with("os", "linux")
            .with("browser", "firefox")
            .with("arch", "x86");
        let (out, stats) =
            apply_rules_with_stats(&resolved, vec![broken, fine.clone()], DependencyMode::Enforce);

        assert_eq!(out, vec![fine]);
        assert_eq!(stats.dependency_enforced, 1);
        assert_eq!(stats.dependency_dropped, 1);
        for assignment in &out {
            assert!(resolved.dependency.iter().all(|rule| !rule.is_violated_by(assignment)));
        }
    }

    #[test]
    fn stats_count_each_stage() {
        let space = space();
        let rules = RuleSet::new()
            .with(CombineRule::new("os", "linux", "browser", ["firefox", "edge"]))
            .with(ExcludeRule::pair("os", "windows", "browser", "firefox"))
            .with(DependencyRule::new("browser", "edge", "os", "windows"));
        let resolved = ResolvedRules::resolve(&space, &rules);

        let input = vec![
            row("linux", "firefox"),
            row("linux", "edge"),
            row("windows", "firefox"),
            row("windows", "edge"),
        ];
        let (out, stats) = apply_rules_with_stats(&resolved, input, DependencyMode::Filter);

        assert_eq!(stats.input, 4);
        assert_eq!(stats.after_combine, 6);
        assert_eq!(stats.excluded, 1);
        assert_eq!(stats.dependency_dropped, 2);
        assert_eq!(stats.duplicates_removed, 1);
        assert_eq!(out, vec![row("linux", "firefox"), row("windows", "edge")]);
        assert_eq!(stats.output, 2);
    }
}
