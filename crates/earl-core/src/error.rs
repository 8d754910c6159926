//! Error kinds shared by every pipeline stage.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, EarlError>;

/// Errors that can occur while ingesting, simulating, or pricing a series.
///
/// None of the stages recover locally; a failed call never yields a
/// partial result.
#[derive(Debug, Error)]
pub enum EarlError {
    /// Malformed, empty, unsorted, or duplicate-timestamp series, or an
    /// inconsistent policy.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The metrics source returned nothing for the requested window.
    #[error("no data: {0}")]
    NoData(String),

    /// The simulator reached a state its policy rules out.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl EarlError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
