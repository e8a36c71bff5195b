use crate::metrics::SuiteMetrics;

/// Render a deterministic markdown report from suite metrics.
pub fn render_report(metrics: &SuiteMetrics, run_id: &str, strategy: &str) -> String {
    let mut lines = Vec::new();

    lines.push("# casegrid suite report".to_string());
    lines.push(String::new());
    lines.push("## Run summary".to_string());
    lines.push(format!("- run_id: {run_id}"));
    lines.push(format!("- strategy: {strategy}"));
    lines.push(format!("- rows: {}", metrics.rows));
    if metrics.invalid_rows > 0 {
        lines.push(format!("- invalid_rows: {}", metrics.invalid_rows));
    }
    lines.push(format!(
        "- pair_coverage: {}/{} ({:.1}%)",
        metrics.pair_coverage.covered_pairs,
        metrics.pair_coverage.total_pairs,
        metrics.pair_coverage_pct
    ));
    lines.push(String::new());

    lines.push("## Value coverage".to_string());
    lines.push("| category | values | covered | missing |".to_string());
    lines.push("| --- | --- | --- | --- |".to_string());
    for category in &metrics.categories {
        let missing = if category.missing.is_empty() {
            "-".to_string()
        } else {
            category.missing.join(", ")
        };
        lines.push(format!(
            "| {} | {} | {} | {} |",
            category.category, category.values_total, category.values_covered, missing
        ));
    }
    lines.push(String::new());

    if !metrics.status_counts.is_empty() {
        lines.push("## Row status".to_string());
        for (status, count) in &metrics.status_counts {
            lines.push(format!("- {status}: {count}"));
        }
        lines.push(String::new());
    }

    if !metrics.missing_pairs.is_empty() {
        lines.push("## Uncovered pairs".to_string());
        for pair in &metrics.missing_pairs {
            lines.push(format!(
                "- {}={} / {}={}",
                pair.category_a, pair.value_a, pair.category_b, pair.value_b
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.extend(recommendations(metrics));
    lines.join("\n")
}

fn recommendations(metrics: &SuiteMetrics) -> Vec<String> {
    let mut lines = Vec::new();
    if metrics.invalid_rows > 0 {
        lines.push("- regenerate the suite; some rows do not match the plan's space.".to_string());
    }
    if !metrics.covers_every_value() {
        lines.push(
            "- some values never appear; relax exclusions or raise the limit.".to_string(),
        );
    }
    if !metrics.pair_coverage.is_complete() {
        lines.push(
            "- pairs left uncovered are usually removed by rules; review them above.".to_string(),
        );
    }
    if lines.is_empty() {
        lines.push("- full pair coverage; compare row counts across strategies.".to_string());
    }
    lines
}
