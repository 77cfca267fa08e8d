//! Wire types of the request API.
//!
//! These are plain serde structs; the HTTP layer (out of scope here) maps
//! them 1:1 onto its JSON bodies.

use serde::{Deserialize, Serialize};

use ss_core::Coord;
use ss_search::RouteKind;

/// A route request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: Coord,
    pub end: Coord,
    pub route_kind: RouteKind,
    /// Attach the [`RouteDebug`] block to the response.
    #[serde(default)]
    pub include_debug: bool,
    /// Per-request overrides of engine defaults.
    #[serde(default)]
    pub options: Option<RouteOptions>,
}

/// Per-request option overrides.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Wall-clock search budget, milliseconds.
    pub timeout_ms: Option<u64>,
    /// Assumed walking speed, km/h.
    pub walking_speed_kmh: Option<f64>,
}

/// Aggregate metrics of a returned route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteMetrics {
    pub distance_m: f64,
    pub duration_s: f64,
    /// Length-weighted mean safety score, 1–100, higher = safer.
    pub safety_score: f64,
    /// Length increase over the quickest route, percent.
    pub distance_increase_pct: f64,
}

/// Diagnostics attached when `include_debug` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteDebug {
    pub corridor_width_m: f64,
    pub nodes_explored: usize,
    pub start_node_id: u32,
    pub end_node_id: u32,
    /// Metres between the requested start and the node actually routed from.
    pub start_snap_offset_m: f64,
    /// Metres between the requested end and the node actually routed to.
    pub end_snap_offset_m: f64,
}

/// A successful route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Downsampled ordered waypoints (first ≈ start, last ≈ end).
    pub waypoints: Vec<Coord>,
    /// Full route geometry.
    pub polyline: Vec<Coord>,
    pub metrics: RouteMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<RouteDebug>,
}
