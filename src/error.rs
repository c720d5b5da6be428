//! Fatal error types for the donor pipeline.
//!
//! Skippable row defects are not errors; see [`crate::sanitize::SkipReason`].

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// An input defect or I/O failure that aborts the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("line {line}: malformed row, expected {expected} fields but found {found}")]
    MalformedRow {
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("line {line}: transaction amount {value:?} is not an integer")]
    InvalidAmount { line: u64, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to flush output: {0}")]
    IntoInner(String),
}

impl<W> From<csv::IntoInnerError<W>> for PipelineError {
    fn from(err: csv::IntoInnerError<W>) -> Self {
        PipelineError::IntoInner(err.error().to_string())
    }
}
