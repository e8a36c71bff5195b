use std::env;
use std::path::PathBuf;

use casegrid_generate::output::csv::write_suite_csv;
use casegrid_generate::{GenerateOptions, GenerationEngine};
use casegrid_plan::Plan;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut plan_path: Option<PathBuf> = None;
    let mut out_path: Option<PathBuf> = None;
    let mut options = GenerateOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--plan" => plan_path = args.next().map(PathBuf::from),
            "--out" => out_path = args.next().map(PathBuf::from),
            "--strategy" => options.strategy = args.next(),
            "--limit" => {
                let limit = args.next().ok_or("missing --limit value")?;
                options.limit = Some(limit.parse()?);
            }
            _ => {
                if plan_path.is_none() {
                    plan_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let plan_path = plan_path.ok_or("missing --plan path")?;
    let out_path = out_path.unwrap_or_else(|| PathBuf::from("suite.csv"));
    let plan_json = std::fs::read_to_string(&plan_path)?;
    let plan: Plan = serde_json::from_str(&plan_json)?;

    let engine = GenerationEngine::new(options);
    let result = engine.run(&plan)?;
    write_suite_csv(&out_path, &plan.space, &result.assignments, b';', None)?;

    println!(
        "assignments={} out={}",
        result.assignments.len(),
        out_path.display()
    );
    Ok(())
}
