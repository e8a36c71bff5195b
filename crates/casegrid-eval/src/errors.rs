use thiserror::Error;

/// Errors emitted while evaluating a suite.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid suite: {0}")]
    InvalidSuite(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
