mod config;
mod registry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;
use uuid::Uuid;

use casegrid_eval::{
    EvalError, EvaluateOptions, collect_suite_metrics, load_suite_csv, render_report,
    row_statuses,
};
use casegrid_generate::{GenerateOptions, GenerationEngine, GenerationError, GeneratorRegistry};
use casegrid_plan::{
    DependencyMode, ResolvedRules, ValidatedPlan, ValidationReport,
    plan_json_schema, validate_plan,
};
use config::{ConfigError, Settings, load_plan_document, load_settings};
use registry::{
    RunContext, SuiteArtifacts, init_console_logging, init_run_logging, start_run,
    write_suite_artifacts,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plan is invalid: {0} error(s)")]
    InvalidPlan(usize),
}

#[derive(Parser, Debug)]
#[command(name = "casegrid", version, about = "Combinatorial test suite generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a suite from a plan and record it as a run.
    Generate(GenerateArgs),
    /// Validate a plan without generating.
    Validate(ValidateArgs),
    /// Evaluate coverage of an existing suite CSV against a plan.
    Evaluate(EvaluateArgs),
    /// List the available strategies.
    Strategies,
    /// Print the plan JSON Schema.
    Schema,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Plan document (.json or .toml).
    plan: PathBuf,
    /// Strategy override (all, each-choice, pairwise).
    #[arg(long)]
    strategy: Option<String>,
    /// Cap on the number of final assignments.
    #[arg(long)]
    limit: Option<usize>,
    /// Dependency rule semantics.
    #[arg(long, value_enum)]
    dependency_mode: Option<DependencyModeArg>,
    /// Output directory for runs.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Optional extra copy of suite.csv.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Settings file (defaults to ./casegrid.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Plan document (.json or .toml).
    plan: PathBuf,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Plan document (.json or .toml).
    plan: PathBuf,
    /// Suite CSV, as written by `generate`.
    suite: PathBuf,
    /// Print metrics as JSON instead of markdown.
    #[arg(long, default_value_t = false)]
    json: bool,
    /// Settings file (defaults to ./casegrid.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DependencyModeArg {
    Filter,
    Enforce,
}

impl From<DependencyModeArg> for DependencyMode {
    fn from(value: DependencyModeArg) -> Self {
        match value {
            DependencyModeArg::Filter => DependencyMode::Filter,
            DependencyModeArg::Enforce => DependencyMode::Enforce,
        }
    }
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Validate(args) => run_validate(args),
        Command::Evaluate(args) => run_evaluate(args),
        Command::Strategies => {
            let registry = GeneratorRegistry::new();
            for generator in registry.iter() {
                println!("{:<12} {}", generator.id(), generator.summary());
            }
            Ok(())
        }
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&plan_json_schema())?);
            Ok(())
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let settings = load_settings(args.config.as_deref())?;
    let delimiter = settings.delimiter()?;
    let validated = load_validated_plan(&args.plan)?;
    let plan = validated.plan;

    let options = build_options(&args, &settings);
    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: args.run_dir.clone().unwrap_or_else(|| settings.run_dir.clone()),
        plan_path: args.plan.clone(),
        plan_name: plan.name.clone(),
        options: serde_json::json!({
            "generate": &options,
            "csv_delimiter": settings.csv_delimiter.to_string(),
        }),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(event = "run_started", run_id = %run_id, plan = %args.plan.display());
    for warning in &validated.warnings {
        tracing::warn!(
            event = "plan_warning",
            code = %warning.code,
            path = %warning.path,
            "{}",
            warning.message
        );
    }

    let timer = Instant::now();
    let engine = GenerationEngine::new(options);
    let result = engine.run_as(&plan, run_id.clone())?;

    let resolved = ResolvedRules::resolve(&plan.space, &plan.rules);
    let statuses = row_statuses(&resolved, &result.assignments);
    let metrics = collect_suite_metrics(
        &plan.space,
        &result.assignments,
        Some(&statuses),
        &EvaluateOptions::default(),
    );
    let summary = render_report(&metrics, &run_id, result.report.strategy.id());

    let artifacts = SuiteArtifacts {
        space: &plan.space,
        assignments: &result.assignments,
        statuses: &statuses,
        report: &result.report,
        metrics: &metrics,
        summary: &summary,
        delimiter,
    };
    let bytes = write_suite_artifacts(&run_paths, &artifacts, args.out.as_deref())?;
    tracing::info!(
        event = "suite_written",
        path = %run_paths.suite_csv_path.display(),
        rows = result.assignments.len(),
        bytes
    );

    tracing::info!(
        event = "run_finished",
        status = "success",
        duration_ms = timer.elapsed().as_millis() as u64
    );

    println!("run_dir={}", run_paths.root.display());
    println!(
        "assignments={} pair_coverage={:.1}%",
        result.assignments.len(),
        metrics.pair_coverage_pct
    );
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let validated = load_validated_plan(&args.plan)?;
    for warning in &validated.warnings {
        tracing::warn!(event = "plan_warning", "{warning}");
    }
    println!(
        "plan ok: {} categories, {} rules, {} warning(s)",
        validated.plan.space.len(),
        validated.plan.rules.len(),
        validated.warnings.len()
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), CliError> {
    init_console_logging()?;
    let settings = load_settings(args.config.as_deref())?;
    let plan = load_validated_plan(&args.plan)?.plan;
    let suite = load_suite_csv(&args.suite, &plan.space, settings.delimiter()?)?;
    tracing::info!(
        event = "suite_loaded",
        path = %args.suite.display(),
        rows = suite.assignments.len()
    );

    let metrics = collect_suite_metrics(
        &plan.space,
        &suite.assignments,
        suite.statuses.as_deref(),
        &EvaluateOptions::default(),
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        println!("{}", render_report(&metrics, "-", "-"));
    }
    Ok(())
}

/// Merge CLI flags over settings; plan options sit between the two and are
/// applied by the engine.
fn build_options(args: &GenerateArgs, settings: &Settings) -> GenerateOptions {
    GenerateOptions {
        strategy: args.strategy.clone(),
        default_strategy: settings.default_strategy,
        limit: args.limit,
        dependency_mode: args.dependency_mode.map(DependencyMode::from),
        default_dependency_mode: settings.dependency_mode,
        max_combinations: settings.max_combinations,
    }
}

fn load_validated_plan(path: &Path) -> Result<ValidatedPlan, CliError> {
    let document = load_plan_document(path)?;
    match validate_plan(&document) {
        Ok(validated) => Ok(validated),
        Err(report) => {
            print_report(&report);
            Err(CliError::InvalidPlan(report.errors.len()))
        }
    }
}

fn print_report(report: &ValidationReport) {
    for issue in report.issues() {
        eprintln!("{issue}");
    }
}

#[cfg(test)]
mod tests {
    use casegrid_plan::Plan;

    use super::*;

    fn args(strategy: Option<&str>) -> GenerateArgs {
        GenerateArgs {
            plan: PathBuf::from("plan.json"),
            strategy: strategy.map(str::to_string),
            limit: None,
            dependency_mode: None,
            run_dir: None,
            out: None,
            config: None,
        }
    }

    fn plan_with_strategy(strategy: &str) -> Plan {
        let document = serde_json::json!({
            "plan_version": "0.1",
            "space": { "categories": [
                { "name": "a", "values": ["1", "2"] },
                { "name": "b", "values": ["1", "2"] }
            ] },
            "options": { "strategy": strategy, "dependency_mode": "enforce" }
        });
        validate_plan(&document).expect("valid plan").plan
    }

    #[test]
    fn cli_flag_beats_plan_and_settings() {
        let settings = Settings {
            default_strategy: casegrid_plan::Strategy::All,
            ..Settings::default()
        };
        let options = build_options(&args(Some("each")), &settings);
        let task = casegrid_generate::plan_run(&plan_with_strategy("all"), &options)
            .expect("plan run");
        assert_eq!(task.strategy, casegrid_plan::Strategy::EachChoice);
        assert_eq!(task.dependency_mode, DependencyMode::Enforce);
    }

    #[test]
    fn plan_options_beat_settings() {
        let settings = Settings {
            default_strategy: casegrid_plan::Strategy::All,
            dependency_mode: DependencyMode::Filter,
            ..Settings::default()
        };
        let options = build_options(&args(None), &settings);
        let task = casegrid_generate::plan_run(&plan_with_strategy("pairwise"), &options)
            .expect("plan run");
        assert_eq!(task.strategy, casegrid_plan::Strategy::Pairwise);
        assert_eq!(task.dependency_mode, DependencyMode::Enforce);
    }

    #[test]
    fn cli_parses_generate_flags() {
        let cli = Cli::try_parse_from([
            "casegrid",
            "generate",
            "plan.toml",
            "--strategy",
            "all",
            "--limit",
            "10",
            "--dependency-mode",
            "enforce",
        ])
        .expect("parse");
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.limit, Some(10));
        assert!(matches!(args.dependency_mode, Some(DependencyModeArg::Enforce)));
    }
}
