use std::env;
use std::path::PathBuf;

use casegrid_eval::{EvaluateOptions, collect_suite_metrics, load_suite_csv, render_report};
use casegrid_plan::Plan;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut plan_path: Option<PathBuf> = None;
    let mut suite_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--plan" => plan_path = args.next().map(PathBuf::from),
            "--suite" => suite_path = args.next().map(PathBuf::from),
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
    let suite_path = suite_path.ok_or("missing --suite path")?;

    let plan_json = std::fs::read_to_string(&plan_path)?;
    let plan: Plan = serde_json::from_str(&plan_json)?;
    let suite = load_suite_csv(&suite_path, &plan.space, b';')?;

    let metrics = collect_suite_metrics(
        &plan.space,
        &suite.assignments,
        suite.statuses.as_deref(),
        &EvaluateOptions::default(),
    );
    println!("{}", render_report(&metrics, "-", "unknown"));
    Ok(())
}
