use thiserror::Error;

/// Core error type shared across casegrid crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The category space violates its invariants.
    #[error("invalid space: {0}")]
    InvalidSpace(String),
}

/// Convenience alias for results returned by casegrid crates.
pub type Result<T> = std::result::Result<T, Error>;
