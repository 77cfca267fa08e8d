//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `ss-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no walkable cell within {searched_deg}° of ({lat:.6}, {lon:.6})")]
    NoWalkableNearby {
        lat: f64,
        lon: f64,
        searched_deg: f64,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mask parse error: {0}")]
    Parse(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
