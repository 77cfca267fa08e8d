//! Request orchestration.
//!
//! # Request lifecycle
//!
//! 1. Validate both coordinates (NaN/range, then the service bbox).
//! 2. Short-circuit requests under 100 m with a straight two-point route and
//!    a neutral safety score — no search runs.
//! 3. Snap each endpoint to the nearest walkable cell (≤ ~1 km), then to the
//!    nearest graph node.
//! 4. Price the Dijkstra baseline — it caps detour kinds and prices the
//!    `distance_increase_pct` metric for every kind.
//! 5. Run the blended A* with the kind's α, the elliptical corridor, and the
//!    kind's length cap; assemble waypoints and metrics.
//!
//! A detour-capped search that drains its open set while the baseline exists
//! reports `InfeasibleDetour` — the cap, not connectivity, failed.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use ss_core::geo::corridor_width_m;
use ss_core::{Coord, EngineConfig, NodeId};
use ss_graph::RoutingGraph;
use ss_search::{
    assemble_route, blended_astar, shortest_distance, CancelToken, RouteKind, SearchError,
    SearchParams,
};
use ss_spatial::WalkabilityMask;

use crate::request::{RouteDebug, RouteMetrics, RouteOptions, RouteRequest, RouteResponse};
use crate::{EngineError, EngineResult};

/// Requests under this direct distance skip the search entirely.
const SHORT_CIRCUIT_M: f64 = 100.0;

/// Neutral safety score for short-circuited routes (nothing was scored).
const NEUTRAL_SAFETY: f64 = 50.0;

/// The immutable data a running engine serves from.
#[derive(Debug)]
pub struct EngineData {
    pub graph: RoutingGraph,
    pub mask: WalkabilityMask,
}

/// The request-facing routing engine.  Cheap to clone; safe to share across
/// threads (all state is read-only after construction).
#[derive(Clone, Debug)]
pub struct RouteEngine {
    data: Arc<EngineData>,
    config: EngineConfig,
}

impl RouteEngine {
    pub fn new(data: Arc<EngineData>, config: EngineConfig) -> Self {
        Self { data, config }
    }

    /// Convenience constructor for tests and offline tools.
    pub fn from_parts(graph: RoutingGraph, mask: WalkabilityMask, config: EngineConfig) -> Self {
        Self::new(Arc::new(EngineData { graph, mask }), config)
    }

    pub fn graph(&self) -> &RoutingGraph {
        &self.data.graph
    }

    /// Answer a route request.
    pub fn route(&self, request: &RouteRequest) -> EngineResult<RouteResponse> {
        self.route_cancellable(request, None)
    }

    /// Like [`route`](Self::route) with a cooperative cancellation token.
    pub fn route_cancellable(
        &self,
        request: &RouteRequest,
        cancel: Option<CancelToken>,
    ) -> EngineResult<RouteResponse> {
        let (start, end) = (request.start, request.end);
        self.validate(start)?;
        self.validate(end)?;

        let direct_m = start.distance_m(end);
        if direct_m < SHORT_CIRCUIT_M {
            return Ok(self.short_circuit(request, direct_m));
        }

        // ── Snap to walkable cells, then to graph nodes ──────────────────
        let graph = &self.data.graph;
        if graph.is_empty() {
            return Err(EngineError::DataUnavailable("routing graph is empty".into()));
        }

        let walk_start = self
            .data
            .mask
            .nearest_walkable(start.lat, start.lon, self.config.snap_max_deg)?;
        let walk_end = self
            .data
            .mask
            .nearest_walkable(end.lat, end.lon, self.config.snap_max_deg)?;

        let start_node = graph
            .snap_to_node(walk_start)
            .ok_or_else(|| EngineError::DataUnavailable("routing graph is empty".into()))?;
        let end_node = graph
            .snap_to_node(walk_end)
            .ok_or_else(|| EngineError::DataUnavailable("routing graph is empty".into()))?;

        // ── Baseline ──────────────────────────────────────────────────────
        let baseline = shortest_distance(graph, start_node, end_node)?;
        let quickest_m = baseline.distance_m;

        // ── Blended search ────────────────────────────────────────────────
        let kind = request.route_kind;
        let alpha = self.config.alpha_override.unwrap_or(kind.alpha());
        let node_direct_m = graph
            .node(start_node)
            .coord
            .distance_m(graph.node(end_node).coord);
        let corridor_m = corridor_width_m(
            node_direct_m,
            self.config.corridor_fraction,
            self.config.corridor_min_m,
        );

        let params = SearchParams {
            alpha,
            max_distance_m: kind.cap_fraction().map(|f| f * quickest_m),
            corridor_m,
            timeout: self.timeout(request.options.as_ref()),
            check_interval: self.config.iteration_check_interval,
            cancel,
        };

        let outcome = blended_astar(graph, start_node, end_node, &params).map_err(|e| {
            match (&e, kind.detour_percent()) {
                (SearchError::NoRoute { .. }, Some(percent)) => {
                    EngineError::InfeasibleDetour { percent }
                }
                _ => EngineError::from(e),
            }
        })?;
        debug!(
            "{kind} route {start_node}→{end_node}: {:.0} m over {} nodes ({} explored)",
            outcome.distance_m,
            outcome.nodes.len(),
            outcome.nodes_explored
        );

        // ── Assemble ──────────────────────────────────────────────────────
        let quickest_for_metric = if kind == RouteKind::Quickest {
            outcome.distance_m
        } else {
            quickest_m
        };
        let summary = assemble_route(
            graph,
            &outcome.nodes,
            quickest_for_metric,
            self.walking_speed_ms(request.options.as_ref()),
        )?;

        let debug = request.include_debug.then(|| RouteDebug {
            corridor_width_m: corridor_m,
            nodes_explored: outcome.nodes_explored,
            start_node_id: start_node.0,
            end_node_id: end_node.0,
            start_snap_offset_m: start.distance_m(graph.node(start_node).coord),
            end_snap_offset_m: end.distance_m(graph.node(end_node).coord),
        });

        Ok(RouteResponse {
            waypoints: summary.waypoints,
            polyline: summary.polyline,
            metrics: RouteMetrics {
                distance_m: summary.distance_m,
                duration_s: summary.duration_s,
                safety_score: summary.safety_score,
                distance_increase_pct: summary.distance_increase_pct,
            },
            debug,
        })
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn validate(&self, c: Coord) -> EngineResult<()> {
        if !c.in_valid_range() {
            return Err(EngineError::InvalidCoordinates {
                lat: c.lat,
                lon: c.lon,
            });
        }
        if !self.config.service_area.contains(c) {
            return Err(EngineError::OutsideServiceArea {
                lat: c.lat,
                lon: c.lon,
            });
        }
        Ok(())
    }

    /// Straight two-point route for sub-100 m requests; no search, neutral
    /// safety.
    fn short_circuit(&self, request: &RouteRequest, direct_m: f64) -> RouteResponse {
        let speed = self.walking_speed_ms(request.options.as_ref());
        let points = vec![request.start, request.end];
        let debug = request.include_debug.then(|| RouteDebug {
            corridor_width_m: 0.0,
            nodes_explored: 0,
            start_node_id: NodeId::INVALID.0,
            end_node_id: NodeId::INVALID.0,
            start_snap_offset_m: 0.0,
            end_snap_offset_m: 0.0,
        });

        RouteResponse {
            waypoints: points.clone(),
            polyline: points,
            metrics: RouteMetrics {
                distance_m: direct_m,
                duration_s: if speed > 0.0 { direct_m / speed } else { 0.0 },
                safety_score: NEUTRAL_SAFETY,
                distance_increase_pct: 0.0,
            },
            debug,
        }
    }

    fn timeout(&self, options: Option<&RouteOptions>) -> Duration {
        let ms = options
            .and_then(|o| o.timeout_ms)
            .unwrap_or(self.config.search_timeout_ms);
        Duration::from_millis(ms)
    }

    fn walking_speed_ms(&self, options: Option<&RouteOptions>) -> f64 {
        options
            .and_then(|o| o.walking_speed_kmh)
            .unwrap_or(self.config.walking_speed_kmh)
            / 3.6
    }
}
