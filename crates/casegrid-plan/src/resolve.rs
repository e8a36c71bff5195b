//! Resolution of rule references against a category space.
//!
//! Rules name categories and values. Before a run they are resolved once
//! into positional keys; references that no longer exist make the rule (or
//! the affected part of it) inert and are reported as [`RuleIssue`]s.

use casegrid_core::{Assignment, Category, CategoryKey, CategorySpace};

use crate::model::{
    CombineRule, DependencyRule, ExcludeCondition, ExcludePair, ExcludeRule, Rule, RuleKind,
    RuleSet,
};

/// `category = value` test against an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<'a> {
    pub key: CategoryKey,
    pub category: &'a str,
    pub value: &'a str,
}

impl Condition<'_> {
    pub fn matches(&self, assignment: &Assignment) -> bool {
        assignment.matches(self.category, self.value)
    }
}

/// Resolved combine rule with only permitted target values left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCombine<'a> {
    pub rule_index: usize,
    pub when: Condition<'a>,
    pub target_key: CategoryKey,
    pub target: &'a str,
    pub values: Vec<&'a str>,
}

/// Resolved `category ∈ values` test of a multi-category exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCondition<'a> {
    pub key: CategoryKey,
    pub category: &'a str,
    pub values: Vec<&'a str>,
}

/// Resolved exclusion: a single forbidden pair or a conjunction of sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedExclude<'a> {
    Pair {
        rule_index: usize,
        first: Condition<'a>,
        second: Condition<'a>,
    },
    Conditions {
        rule_index: usize,
        conditions: Vec<SetCondition<'a>>,
    },
}

impl ResolvedExclude<'_> {
    pub fn rule_index(&self) -> usize {
        match self {
            ResolvedExclude::Pair { rule_index, .. }
            | ResolvedExclude::Conditions { rule_index, .. } => *rule_index,
        }
    }

    /// True when the assignment holds the forbidden combination.
    pub fn matches(&self, assignment: &Assignment) -> bool {
        match self {
            ResolvedExclude::Pair { first, second, .. } => {
                first.matches(assignment) && second.matches(assignment)
            }
            ResolvedExclude::Conditions { conditions, .. } => conditions.iter().all(|condition| {
                assignment
                    .get(condition.category)
                    .is_some_and(|value| condition.values.iter().any(|allowed| *allowed == value))
            }),
        }
    }
}

/// Resolved dependency rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDependency<'a> {
    pub rule_index: usize,
    pub when: Condition<'a>,
    pub then: Condition<'a>,
}

impl ResolvedDependency<'_> {
    /// Antecedent holds but the consequent does not.
    pub fn is_violated_by(&self, assignment: &Assignment) -> bool {
        self.when.matches(assignment) && !self.then.matches(assignment)
    }
}

/// Diagnostic produced while resolving rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub rule_index: usize,
    pub kind: RuleKind,
    pub code: &'static str,
    pub message: String,
}

impl RuleIssue {
    fn new(rule_index: usize, kind: RuleKind, code: &'static str, message: String) -> Self {
        Self {
            rule_index,
            kind,
            code,
            message,
        }
    }
}

/// Rules resolved against one space, partitioned in pipeline stage order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRules<'a> {
    pub combine: Vec<ResolvedCombine<'a>>,
    pub exclude: Vec<ResolvedExclude<'a>>,
    pub dependency: Vec<ResolvedDependency<'a>>,
    pub issues: Vec<RuleIssue>,
}

impl<'a> ResolvedRules<'a> {
    /// Resolve every rule of `rules` against `space`.
    pub fn resolve(space: &'a CategorySpace, rules: &'a RuleSet) -> Self {
        let mut resolved = ResolvedRules::default();
        for (idx, rule) in rules.iter() {
            match rule {
                Rule::Combine(rule) => resolved.resolve_combine(space, idx, rule),
                Rule::Exclude(rule) => resolved.resolve_exclude(space, idx, rule),
                Rule::Dependency(rule) => resolved.resolve_dependency(space, idx, rule),
            }
        }
        resolved
    }

    /// No active rule survived resolution.
    pub fn is_empty(&self) -> bool {
        self.combine.is_empty() && self.exclude.is_empty() && self.dependency.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.combine.len() + self.exclude.len() + self.dependency.len()
    }

    fn issue(&mut self, rule_index: usize, kind: RuleKind, code: &'static str, message: String) {
        self.issues
            .push(RuleIssue::new(rule_index, kind, code, message));
    }

    fn category(
        &mut self,
        space: &'a CategorySpace,
        idx: usize,
        kind: RuleKind,
        name: &str,
    ) -> Option<(CategoryKey, &'a Category)> {
        let resolved = space
            .key_of(name)
            .and_then(|key| space.by_key(key).map(|category| (key, category)));
        if resolved.is_none() {
            self.issue(
                idx,
                kind,
                "rule_category_missing",
                format!("category '{name}' does not exist; rule is inert"),
            );
        }
        resolved
    }

    fn condition(
        &mut self,
        space: &'a CategorySpace,
        idx: usize,
        kind: RuleKind,
        category: &str,
        value: &'a str,
    ) -> Option<Condition<'a>> {
        let (key, category) = self.category(space, idx, kind, category)?;
        if !category.allows(value) {
            self.issue(
                idx,
                kind,
                "rule_value_missing",
                format!(
                    "value '{value}' is not permitted in category '{}'; rule is inert",
                    category.name
                ),
            );
            return None;
        }
        Some(Condition {
            key,
            category: category.name.as_str(),
            value,
        })
    }

    fn resolve_combine(&mut self, space: &'a CategorySpace, idx: usize, rule: &'a CombineRule) {
        let kind = RuleKind::Combine;
        if rule.target_values.is_empty() {
            self.issue(
                idx,
                kind,
                "combine_targets_empty",
                "combine rule has no target values; rule is a no-op".to_string(),
            );
            return;
        }

        let Some(when) = self.condition(space, idx, kind, &rule.if_category, &rule.if_value)
        else {
            return;
        };
        let Some((target_key, target)) = self.category(space, idx, kind, &rule.target_category)
        else {
            return;
        };

        let mut values = Vec::with_capacity(rule.target_values.len());
        for value in &rule.target_values {
            if target.allows(value) {
                values.push(value.as_str());
            } else {
                self.issue(
                    idx,
                    kind,
                    "combine_target_value_missing",
                    format!(
                        "target value '{value}' is not permitted in category '{}'; skipped",
                        target.name
                    ),
                );
            }
        }

        if values.is_empty() {
            self.issue(
                idx,
                kind,
                "combine_targets_empty",
                "no permitted target values remain; rule is a no-op".to_string(),
            );
            return;
        }

        self.combine.push(ResolvedCombine {
            rule_index: idx,
            when,
            target_key,
            target: target.name.as_str(),
            values,
        });
    }

    fn resolve_exclude(&mut self, space: &'a CategorySpace, idx: usize, rule: &'a ExcludeRule) {
        let kind = RuleKind::Exclude;
        if rule.pairs.is_empty() && rule.conditions.is_empty() {
            self.issue(
                idx,
                kind,
                "exclude_empty",
                "exclude rule has neither pairs nor conditions".to_string(),
            );
            return;
        }

        for pair in &rule.pairs {
            self.resolve_exclude_pair(space, idx, pair);
        }

        if !rule.conditions.is_empty() {
            self.resolve_exclude_conditions(space, idx, &rule.conditions);
        }
    }

    fn resolve_exclude_pair(&mut self, space: &'a CategorySpace, idx: usize, pair: &'a ExcludePair) {
        let kind = RuleKind::Exclude;
        let first = self.condition(space, idx, kind, &pair.category_a, &pair.value_a);
        let second = self.condition(space, idx, kind, &pair.category_b, &pair.value_b);
        if let (Some(first), Some(second)) = (first, second) {
            self.exclude.push(ResolvedExclude::Pair {
                rule_index: idx,
                first,
                second,
            });
        }
    }

    fn resolve_exclude_conditions(
        &mut self,
        space: &'a CategorySpace,
        idx: usize,
        conditions: &'a [ExcludeCondition],
    ) {
        let kind = RuleKind::Exclude;
        let mut resolved = Vec::with_capacity(conditions.len());
        for condition in conditions {
            let Some((key, category)) = self.category(space, idx, kind, &condition.category)
            else {
                return;
            };
            let values: Vec<&str> = condition
                .values
                .iter()
                .map(String::as_str)
                .filter(|value| category.allows(value))
                .collect();
            if values.is_empty() {
                self.issue(
                    idx,
                    kind,
                    "rule_value_missing",
                    format!(
                        "no listed value is permitted in category '{}'; rule is inert",
                        category.name
                    ),
                );
                return;
            }
            resolved.push(SetCondition {
                key,
                category: category.name.as_str(),
                values,
            });
        }

        self.exclude.push(ResolvedExclude::Conditions {
            rule_index: idx,
            conditions: resolved,
        });
    }

    fn resolve_dependency(
        &mut self,
        space: &'a CategorySpace,
        idx: usize,
        rule: &'a DependencyRule,
    ) {
        let kind = RuleKind::Dependency;
        let when = self.condition(space, idx, kind, &rule.if_category, &rule.if_value);
        let then = self.condition(space, idx, kind, &rule.then_category, &rule.then_value);
        let (Some(when), Some(then)) = (when, then) else {
            return;
        };

        if when.key == then.key && when.value != then.value {
            self.issue(
                idx,
                kind,
                "dependency_contradiction",
                format!(
                    "'{}' cannot be both '{}' and '{}'; every matching assignment is dropped",
                    when.category, when.value, then.value
                ),
            );
        }

        self.dependency.push(ResolvedDependency {
            rule_index: idx,
            when,
            then,
        });
    }
}
