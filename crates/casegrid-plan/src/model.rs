use std::fmt;
use std::str::FromStr;

use casegrid_core::CategorySpace;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Contract version for plan documents.
pub const PLAN_VERSION: &str = "0.1";

/// Generation strategy identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Full Cartesian product.
    All,
    /// Modular cycling over the longest category.
    EachChoice,
    /// Greedy pairwise coverage.
    Pairwise,
}

impl Strategy {
    /// Every strategy, in listing order.
    pub const ALL: [Strategy; 3] = [Strategy::All, Strategy::EachChoice, Strategy::Pairwise];

    pub fn id(self) -> &'static str {
        match self {
            Strategy::All => "all",
            Strategy::EachChoice => "each-choice",
            Strategy::Pairwise => "pairwise",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "all" => Ok(Strategy::All),
            "each-choice" | "each" => Ok(Strategy::EachChoice),
            "pairwise" | "orthogonal" => Ok(Strategy::Pairwise),
            _ => Err(format!("unknown strategy '{value}'")),
        }
    }
}

/// How dependency rules act on assignments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DependencyMode {
    /// Drop assignments whose antecedent matches but consequent does not.
    #[default]
    Filter,
    /// Overwrite the consequent whenever the antecedent matches.
    Enforce,
}

impl fmt::Display for DependencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyMode::Filter => f.write_str("filter"),
            DependencyMode::Enforce => f.write_str("enforce"),
        }
    }
}

impl FromStr for DependencyMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "filter" => Ok(DependencyMode::Filter),
            "enforce" => Ok(DependencyMode::Enforce),
            _ => Err(format!("unknown dependency mode '{value}'")),
        }
    }
}

/// Rule discriminant, in pipeline stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Combine,
    Exclude,
    Dependency,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Combine => f.write_str("combine"),
            RuleKind::Exclude => f.write_str("exclude"),
            RuleKind::Dependency => f.write_str("dependency"),
        }
    }
}

/// Business rule applied to raw assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Forbid value combinations.
    Exclude(ExcludeRule),
    /// Require a consequent value when an antecedent matches.
    Dependency(DependencyRule),
    /// Fan an assignment out over several target values.
    Combine(CombineRule),
}

impl Rule {
    pub fn kind(&self) -> RuleKind {
        match self {
            Rule::Exclude(_) => RuleKind::Exclude,
            Rule::Dependency(_) => RuleKind::Dependency,
            Rule::Combine(_) => RuleKind::Combine,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Rule::Exclude(rule) => rule.name.as_deref(),
            Rule::Dependency(rule) => rule.name.as_deref(),
            Rule::Combine(rule) => rule.name.as_deref(),
        }
    }
}

impl From<ExcludeRule> for Rule {
    fn from(rule: ExcludeRule) -> Self {
        Rule::Exclude(rule)
    }
}

impl From<DependencyRule> for Rule {
    fn from(rule: DependencyRule) -> Self {
        Rule::Dependency(rule)
    }
}

impl From<CombineRule> for Rule {
    fn from(rule: CombineRule) -> Self {
        Rule::Combine(rule)
    }
}

/// A forbidden `(category_a = value_a, category_b = value_b)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExcludePair {
    pub category_a: String,
    pub value_a: String,
    pub category_b: String,
    pub value_b: String,
}

/// Condition of a multi-category exclusion: the category holds one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExcludeCondition {
    pub category: String,
    pub values: Vec<String>,
}

/// Exclusion rule.
///
/// An assignment is dropped when it matches any pair, or when it satisfies
/// every entry of `conditions` at once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExcludeRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<ExcludePair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ExcludeCondition>,
}

impl ExcludeRule {
    /// Single forbidden pair.
    pub fn pair(
        category_a: impl Into<String>,
        value_a: impl Into<String>,
        category_b: impl Into<String>,
        value_b: impl Into<String>,
    ) -> Self {
        Self::default().and_pair(category_a, value_a, category_b, value_b)
    }

    pub fn and_pair(
        mut self,
        category_a: impl Into<String>,
        value_a: impl Into<String>,
        category_b: impl Into<String>,
        value_b: impl Into<String>,
    ) -> Self {
        self.pairs.push(ExcludePair {
            category_a: category_a.into(),
            value_a: value_a.into(),
            category_b: category_b.into(),
            value_b: value_b.into(),
        });
        self
    }

    pub fn and_condition<I, V>(mut self, category: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.conditions.push(ExcludeCondition {
            category: category.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// `if_category = if_value` implies `then_category = then_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub if_category: String,
    pub if_value: String,
    pub then_category: String,
    pub then_value: String,
}

impl DependencyRule {
    pub fn new(
        if_category: impl Into<String>,
        if_value: impl Into<String>,
        then_category: impl Into<String>,
        then_value: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            if_category: if_category.into(),
            if_value: if_value.into(),
            then_category: then_category.into(),
            then_value: then_value.into(),
        }
    }
}

/// When `if_category = if_value`, emit one clone per entry of `target_values`
/// with `target_category` overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CombineRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub if_category: String,
    pub if_value: String,
    pub target_category: String,
    #[serde(default)]
    pub target_values: Vec<String>,
}

impl CombineRule {
    pub fn new<I, V>(
        if_category: impl Into<String>,
        if_value: impl Into<String>,
        target_category: impl Into<String>,
        target_values: I,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: None,
            if_category: if_category.into(),
            if_value: if_value.into(),
            target_category: target_category.into(),
            target_values: target_values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered collection of rules. Order within a kind is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule: impl Into<Rule>) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: impl Into<Rule>) {
        self.rules.push(rule.into());
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules with their position in the set.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Rule)> {
        self.rules.iter().enumerate()
    }

    pub fn excludes(&self) -> impl Iterator<Item = &ExcludeRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Exclude(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &DependencyRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Dependency(rule) => Some(rule),
            _ => None,
        })
    }

    pub fn combines(&self) -> impl Iterator<Item = &CombineRule> {
        self.rules.iter().filter_map(|rule| match rule {
            Rule::Combine(rule) => Some(rule),
            _ => None,
        })
    }
}

impl FromIterator<Rule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = Rule>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

/// Optional plan-level generation options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlanOptions {
    /// Strategy identifier (`all`, `each-choice`, `pairwise`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Cap on the number of final assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Dependency rule semantics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_mode: Option<DependencyMode>,
}

/// Canonical plan definition for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Plan {
    /// Contract version for the plan format.
    pub plan_version: String,
    /// Human readable plan name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Categories and their permitted values.
    pub space: CategorySpace,
    /// Business rules applied after generation.
    #[serde(default)]
    pub rules: RuleSet,
    /// Optional generation options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PlanOptions>,
}

impl Plan {
    pub fn new(space: CategorySpace) -> Self {
        Self {
            plan_version: PLAN_VERSION.to_string(),
            name: None,
            space,
            rules: RuleSet::default(),
            options: None,
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn strategy(&self) -> Option<&str> {
        self.options
            .as_ref()
            .and_then(|options| options.strategy.as_deref())
    }

    pub fn limit(&self) -> Option<usize> {
        self.options.as_ref().and_then(|options| options.limit)
    }

    pub fn dependency_mode(&self) -> Option<DependencyMode> {
        self.options
            .as_ref()
            .and_then(|options| options.dependency_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_accepts_aliases() {
        assert_eq!("all".parse::<Strategy>(), Ok(Strategy::All));
        assert_eq!("each".parse::<Strategy>(), Ok(Strategy::EachChoice));
        assert_eq!("each-choice".parse::<Strategy>(), Ok(Strategy::EachChoice));
        assert_eq!("orthogonal".parse::<Strategy>(), Ok(Strategy::Pairwise));
        assert!("random".parse::<Strategy>().is_err());
        assert!(" all ".parse::<Strategy>().is_err());
        assert!("Pairwise".parse::<Strategy>().is_err());
        assert!("each_choice".parse::<Strategy>().is_err());
    }

    #[test]
    fn dependency_mode_matches_exactly() {
        assert_eq!("enforce".parse::<DependencyMode>(), Ok(DependencyMode::Enforce));
        assert!("Enforce".parse::<DependencyMode>().is_err());
    }

    #[test]
    fn rule_set_partitions_by_kind() {
        let rules = RuleSet::new()
            .with(CombineRule::new("a", "1", "b", ["x"]))
            .with(ExcludeRule::pair("a", "1", "b", "y"))
            .with(DependencyRule::new("a", "2", "b", "x"))
            .with(CombineRule::new("a", "2", "b", ["y"]));

        assert_eq!(rules.len(), 4);
        assert_eq!(rules.combines().count(), 2);
        assert_eq!(rules.excludes().count(), 1);
        assert_eq!(rules.dependencies().count(), 1);
        let kinds: Vec<RuleKind> = rules.iter().map(|(_, rule)| rule.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                RuleKind::Combine,
                RuleKind::Exclude,
                RuleKind::Dependency,
                RuleKind::Combine
            ]
        );
    }
}
