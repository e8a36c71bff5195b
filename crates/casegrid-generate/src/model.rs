use std::collections::BTreeMap;

use casegrid_core::PairCoverage;
use casegrid_plan::{DependencyMode, Strategy};
use serde::{Deserialize, Serialize};

use crate::rules::PipelineStats;

/// Options for the generation engine.
///
/// `strategy`, `limit` and `dependency_mode` override the plan's own
/// options when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Strategy identifier forced by the caller.
    pub strategy: Option<String>,
    /// Strategy used when neither the caller nor the plan picks one.
    pub default_strategy: Strategy,
    /// Cap on the number of final assignments.
    pub limit: Option<usize>,
    pub dependency_mode: Option<DependencyMode>,
    /// Dependency semantics used when neither the caller nor the plan picks.
    pub default_dependency_mode: DependencyMode,
    /// Largest full product `all` and `pairwise` may enumerate.
    pub max_combinations: u64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            strategy: None,
            default_strategy: Strategy::Pairwise,
            limit: None,
            dependency_mode: None,
            default_dependency_mode: DependencyMode::Filter,
            max_combinations: 250_000,
        }
    }
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_index: Option<usize>,
}

impl GenerationIssue {
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code: code.into(),
            message: message.into(),
            path: None,
            rule_index: None,
        }
    }

    pub fn for_rule(mut self, rule_index: usize) -> Self {
        self.path = Some(format!("/rules/{rule_index}"));
        self.rule_index = Some(rule_index);
        self
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub started_at: String,
    pub plan_name: Option<String>,
    pub strategy: Strategy,
    pub dependency_mode: DependencyMode,
    pub categories: usize,
    pub combinations: Option<u64>,
    pub rules_total: usize,
    pub rules_active: usize,
    pub raw_assignments: usize,
    pub pipeline: PipelineStats,
    pub limit: Option<usize>,
    pub truncated: bool,
    pub final_assignments: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_coverage: Option<PairCoverage>,
    pub duration_ms: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String, strategy: Strategy, dependency_mode: DependencyMode) -> Self {
        Self {
            run_id,
            started_at: chrono::Utc::now().to_rfc3339(),
            plan_name: None,
            strategy,
            dependency_mode,
            categories: 0,
            combinations: None,
            rules_total: 0,
            rules_active: 0,
            raw_assignments: 0,
            pipeline: PipelineStats::default(),
            limit: None,
            truncated: false,
            final_assignments: 0,
            pair_coverage: None,
            duration_ms: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }
}
