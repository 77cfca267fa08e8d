//! The request-facing error taxonomy.
//!
//! Every error carries a stable machine-readable kind (for API payloads and
//! metrics labels) plus a human message via `Display`.  Validation errors
//! are returned before any search runs; `GraphCorrupt` and `DataUnavailable`
//! are fatal for the process.

use thiserror::Error;

use ss_graph::GraphError;
use ss_search::SearchError;
use ss_spatial::SpatialError;

/// Everything a route request can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    /// NaN or out-of-range latitude/longitude.
    #[error("invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { lat: f64, lon: f64 },

    /// Inside the valid WGS-84 domain but outside the served city.
    #[error("({lat}, {lon}) is outside the service area")]
    OutsideServiceArea { lat: f64, lon: f64 },

    /// Walkability expansion failed at the start or end point.
    #[error("no walkable cell within {searched_deg}° of ({lat:.6}, {lon:.6})")]
    NoWalkableNearby {
        lat: f64,
        lon: f64,
        searched_deg: f64,
    },

    /// The search exhausted the open set — disconnected component or every
    /// branch pruned.
    #[error("no route found")]
    NoRouteFound,

    /// A detour-capped search failed even though the quickest route exists;
    /// the cap (not connectivity) is what could not be satisfied.
    #[error("no route within {percent}% of the quickest distance")]
    InfeasibleDetour { percent: u8 },

    /// Wall-clock budget exceeded; no partial result.
    #[error("search exceeded its {budget_ms} ms budget")]
    SearchTimeout { budget_ms: u64 },

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// Artifact integrity check failed.  Fatal.
    #[error("graph corrupt: {0}")]
    GraphCorrupt(String),

    /// A required artifact is missing from every configured data dir.  Fatal.
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    /// A bug in the engine itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Stable machine-readable discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidCoordinates { .. } => "invalid_coordinates",
            EngineError::OutsideServiceArea { .. } => "outside_service_area",
            EngineError::NoWalkableNearby { .. } => "no_walkable_nearby",
            EngineError::NoRouteFound => "no_route_found",
            EngineError::InfeasibleDetour { .. } => "infeasible_detour",
            EngineError::SearchTimeout { .. } => "search_timeout",
            EngineError::Cancelled => "cancelled",
            EngineError::GraphCorrupt(_) => "graph_corrupt",
            EngineError::DataUnavailable(_) => "data_unavailable",
            EngineError::Internal(_) => "internal",
        }
    }

    /// `true` for errors that should take the whole service down rather than
    /// fail one request.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::GraphCorrupt(_) | EngineError::DataUnavailable(_)
        )
    }
}

impl From<SpatialError> for EngineError {
    fn from(e: SpatialError) -> Self {
        match e {
            SpatialError::NoWalkableNearby {
                lat,
                lon,
                searched_deg,
            } => EngineError::NoWalkableNearby {
                lat,
                lon,
                searched_deg,
            },
            SpatialError::Io(e) => EngineError::DataUnavailable(e.to_string()),
            SpatialError::Parse(m) => EngineError::GraphCorrupt(m),
        }
    }
}

impl From<GraphError> for EngineError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::MissingArtifact { path } => {
                EngineError::DataUnavailable(path.display().to_string())
            }
            GraphError::Io(e) => EngineError::DataUnavailable(e.to_string()),
            other => EngineError::GraphCorrupt(other.to_string()),
        }
    }
}

/// Context-free mapping; detour-capped searches re-map `NoRoute` to
/// [`EngineError::InfeasibleDetour`] at the call site.
impl From<SearchError> for EngineError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::NoRoute { .. } => EngineError::NoRouteFound,
            SearchError::Timeout { budget_ms } => EngineError::SearchTimeout { budget_ms },
            SearchError::Cancelled => EngineError::Cancelled,
            SearchError::Internal(m) => EngineError::Internal(m),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
