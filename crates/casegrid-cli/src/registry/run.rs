use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use casegrid_core::{Assignment, CategorySpace};
use casegrid_eval::SuiteMetrics;
use casegrid_generate::GenerationReport;
use casegrid_generate::output::csv::write_suite_csv;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub plan_path: PathBuf,
    pub plan_name: Option<String>,
    /// Effective settings and overrides, recorded verbatim.
    pub options: serde_json::Value,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig {
    pub run_id: String,
    pub started_at: String,
    pub cli_version: String,
    pub plan_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
    pub options: serde_json::Value,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
    pub suite_csv_path: PathBuf,
    pub suite_json_path: PathBuf,
    pub report_path: PathBuf,
    pub metrics_path: PathBuf,
    pub summary_path: PathBuf,
}

impl RunPaths {
    fn new(root: PathBuf) -> Self {
        Self {
            config_path: root.join("config.json"),
            logs_path: root.join("logs.ndjson"),
            suite_csv_path: root.join("suite.csv"),
            suite_json_path: root.join("suite.json"),
            report_path: root.join("generation_report.json"),
            metrics_path: root.join("metrics.json"),
            summary_path: root.join("report.md"),
            root,
        }
    }
}

/// Create `<run_dir>/<timestamp>__run_<id>/`, write `config.json` and
/// touch `logs.ndjson`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let paths = RunPaths::new(ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id)));

    create_dir_all(&paths.root)?;

    let config = RunConfig {
        run_id: ctx.run_id.clone(),
        started_at: ctx.started_at.to_rfc3339(),
        cli_version: env!("CARGO_PKG_VERSION").to_string(),
        plan_path: ctx.plan_path.display().to_string(),
        plan_name: ctx.plan_name.clone(),
        options: ctx.options.clone(),
        git: collect_git_info(),
    };

    write_json(&paths.config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.logs_path)?;

    Ok(paths)
}

/// Suite artifacts of a finished generation.
pub struct SuiteArtifacts<'a> {
    pub space: &'a CategorySpace,
    pub assignments: &'a [Assignment],
    pub statuses: &'a [String],
    pub report: &'a GenerationReport,
    pub metrics: &'a SuiteMetrics,
    pub summary: &'a str,
    pub delimiter: u8,
}

/// Write suite CSV/JSON, reports and metrics; copy the CSV to `out_path`
/// when given. Returns the CSV size in bytes.
pub fn write_suite_artifacts(
    paths: &RunPaths,
    artifacts: &SuiteArtifacts<'_>,
    out_path: Option<&Path>,
) -> RegistryResult<u64> {
    let bytes = write_suite_csv(
        &paths.suite_csv_path,
        artifacts.space,
        artifacts.assignments,
        artifacts.delimiter,
        Some(artifacts.statuses),
    )?;
    write_json(&paths.suite_json_path, &artifacts.assignments)?;
    write_json(&paths.report_path, artifacts.report)?;
    write_json(&paths.metrics_path, artifacts.metrics)?;
    std::fs::write(&paths.summary_path, artifacts.summary)?;

    if let Some(out_path) = out_path {
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        std::fs::copy(&paths.suite_csv_path, out_path)?;
    }

    Ok(bytes)
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RegistryResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}
