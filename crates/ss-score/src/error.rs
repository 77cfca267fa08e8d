//! Scoring-subsystem error type.

use thiserror::Error;

/// Errors produced by `ss-score`.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at row {row}: {message}")]
    Parse { row: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type ScoreResult<T> = Result<T, ScoreError>;
