//! Graph-subsystem error type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by `ss-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An integrity invariant failed — edge references a missing node, the
    /// adjacency and edge-lookup files disagree, and so on.  Fatal for the
    /// process that hits it.
    #[error("graph corrupt: {0}")]
    Corrupt(String),

    /// A required artifact file is absent.
    #[error("missing artifact: {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("parse error at row {row} of {file}: {message}")]
    Parse {
        file: String,
        row: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
