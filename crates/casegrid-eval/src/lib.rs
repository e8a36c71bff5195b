//! Coverage metrics and row status for generated suites.

pub mod coverage;
pub mod errors;
pub mod load;
pub mod metrics;
pub mod report;
pub mod status;

pub use coverage::{EvaluateOptions, collect_suite_metrics};
pub use errors::EvalError;
pub use load::{LoadedSuite, load_suite_csv};
pub use metrics::{CategoryCoverage, METRICS_VERSION, MissingPair, SuiteMetrics, ValueCount};
pub use report::render_report;
pub use status::{STATUS_OK, row_status, row_statuses};
