use thiserror::Error;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unknown strategy '{0}'")]
    UnsupportedStrategy(String),
    #[error(transparent)]
    Core(#[from] casegrid_core::Error),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("space too large: {0}")]
    SpaceTooLarge(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
