//! Route assembly — node path to waypoints, geometry, and metrics.

use ss_core::{Coord, NodeId};
use ss_graph::RoutingGraph;

use crate::{SearchError, SearchResult};

/// Waypoint-density target: paths longer than this are downsampled.
const MAX_WAYPOINTS: usize = 25;

/// The assembled deliverable of one search.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    /// Downsampled ordered waypoints (first = start, last = end).
    pub waypoints: Vec<Coord>,
    /// Full route geometry, every polyline vertex.
    pub polyline: Vec<Coord>,
    /// Total length, metres.
    pub distance_m: f64,
    /// Walking duration, seconds.
    pub duration_s: f64,
    /// Length-weighted mean edge safety score, 1–100 (100 for a zero-length
    /// route — nothing unsafe was traversed).
    pub safety_score: f64,
    /// Length increase over the quickest route, percent (0 for the quickest
    /// route itself).
    pub distance_increase_pct: f64,
}

/// Stitch the edge polylines along `path`, aggregate the metrics, and
/// downsample waypoints.
///
/// `quickest_distance_m` prices `distance_increase_pct`; pass the route's
/// own distance for quickest searches.  `walking_speed_ms` converts length
/// to duration.
pub fn assemble_route(
    graph: &RoutingGraph,
    path: &[NodeId],
    quickest_distance_m: f64,
    walking_speed_ms: f64,
) -> SearchResult<RouteSummary> {
    if path.is_empty() {
        return Err(SearchError::Internal("empty node path".into()));
    }

    // Degenerate single-node route: zero length, perfectly safe.
    if path.len() == 1 {
        let at = graph.node(path[0]).coord;
        return Ok(RouteSummary {
            waypoints: vec![at],
            polyline: vec![at],
            distance_m: 0.0,
            duration_s: 0.0,
            safety_score: 100.0,
            distance_increase_pct: 0.0,
        });
    }

    // ── Stitch geometry and accumulate metrics ────────────────────────────
    let mut polyline: Vec<Coord> = Vec::with_capacity(path.len());
    let mut distance_m = 0.0;
    let mut weighted_safety = 0.0;

    for (i, pair) in path.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        let edge_id = graph.edge_between(a, b).ok_or_else(|| {
            SearchError::Internal(format!("path step {a}→{b} has no edge"))
        })?;
        let edge = graph.edge(edge_id);

        // Edge polylines are stored source → target; reverse when the path
        // traverses the edge the other way.
        let forward = edge.source == a;
        let points = edge.polyline.iter();
        let points: Box<dyn Iterator<Item = &Coord>> = if forward {
            Box::new(points)
        } else {
            Box::new(points.rev())
        };
        // The first point of each edge after the first duplicates the joint.
        polyline.extend(points.skip(usize::from(i > 0)).copied());

        distance_m += edge.length_m;
        weighted_safety += edge.length_m * edge.safety_score as f64;
    }

    let safety_score = if distance_m > 0.0 {
        weighted_safety / distance_m
    } else {
        100.0
    };
    let duration_s = if walking_speed_ms > 0.0 {
        distance_m / walking_speed_ms
    } else {
        0.0
    };
    let distance_increase_pct = if quickest_distance_m > 0.0 {
        ((distance_m - quickest_distance_m) / quickest_distance_m * 100.0).max(0.0)
    } else {
        0.0
    };

    Ok(RouteSummary {
        waypoints: downsample(&polyline),
        polyline,
        distance_m,
        duration_s,
        safety_score,
        distance_increase_pct,
    })
}

/// Sample every ⌈n / 25⌉-th point, always preserving the final point.
fn downsample(polyline: &[Coord]) -> Vec<Coord> {
    let n = polyline.len();
    if n <= MAX_WAYPOINTS {
        return polyline.to_vec();
    }

    let step = n.div_ceil(MAX_WAYPOINTS);
    let mut out: Vec<Coord> = polyline.iter().step_by(step).copied().collect();
    if out.last() != polyline.last() {
        out.push(polyline[n - 1]);
    }
    out
}
