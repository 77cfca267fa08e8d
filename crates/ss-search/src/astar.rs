//! Blended A* over the safety/distance weight vectors.
//!
//! # Cost model
//!
//! Per-edge cost is `α · length_m + (1 − α) · w_safety`, with `w_safety`
//! pre-computed in metre-equivalent units (0 for the safest edge, 100 for
//! the most dangerous).  Cumulative walked distance (`g_dist`) is tracked
//! separately from cumulative cost (`g_cost`) so detour caps bound real
//! metres regardless of α.
//!
//! # Heuristic
//!
//! `h(n) = dist(n, end) · min(α + 0.1, 1.0)`.  At α = 1 the clamp keeps the
//! heuristic admissible (A* then matches Dijkstra exactly); at α = 0 the
//! 0.1 factor is a small distance nudge that breaks ties toward the goal
//! without dominating safety costs.  With a length cap set, a node whose
//! walked distance plus straight-line remainder already exceeds the cap is
//! infeasible and is not pushed at all.
//!
//! # Pruning
//!
//! - **Corridor**: neighbours outside the elliptical corridor around the
//!   start/end foci are skipped.
//! - **Detour**: relaxations that would push `g_dist` past the cap are
//!   skipped.
//! - **Closed set**: nodes are final once popped; duplicates in the heap
//!   (push-duplicates instead of decrease-key) are skipped lazily.
//!
//! The wall clock and the cancellation token are polled every
//! `check_interval` pops.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use log::debug;

use ss_core::geo::within_ellipse;
use ss_core::NodeId;
use ss_graph::RoutingGraph;

use crate::cancel::CancelToken;
use crate::dijkstra::reconstruct;
use crate::{SearchError, SearchResult};

// ── Parameters & outcome ──────────────────────────────────────────────────────

/// Everything a blended search needs besides the graph and endpoints.
#[derive(Clone, Debug)]
pub struct SearchParams {
    /// Safety/distance blend: 1 = distance only, 0 = safety only.
    pub alpha: f64,

    /// Hard cap on walked distance, metres.  `None` for `quickest`.
    pub max_distance_m: Option<f64>,

    /// Elliptical corridor width around the start/end foci, metres.
    pub corridor_m: f64,

    /// Wall-clock budget.
    pub timeout: Duration,

    /// Pops between timeout / cancellation polls.
    pub check_interval: u32,

    /// Optional cooperative cancellation flag.
    pub cancel: Option<CancelToken>,
}

/// A successful blended search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Node sequence from start to end inclusive.
    pub nodes: Vec<NodeId>,
    /// Total blended cost (diagnostic only — metres when α = 1).
    pub cost: f64,
    /// Total walked distance in metres.
    pub distance_m: f64,
    /// Nodes expanded before the goal was popped.
    pub nodes_explored: usize,
}

// ── Heap entry ────────────────────────────────────────────────────────────────

/// Min-heap entry ordered by (f, g_dist, node) — the spec'd total order that
/// makes exploration reproducible across runs and threads.
#[derive(Copy, Clone, PartialEq)]
struct Frontier {
    f: f64,
    g_dist: f64,
    node: NodeId,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    /// Reversed for `BinaryHeap`: lowest f first, then lowest walked
    /// distance, then lowest node id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g_dist.total_cmp(&self.g_dist))
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Run a blended A* from `start` to `end`.
pub fn blended_astar(
    graph: &RoutingGraph,
    start: NodeId,
    end: NodeId,
    params: &SearchParams,
) -> SearchResult<SearchOutcome> {
    if start == end {
        return Ok(SearchOutcome {
            nodes: vec![start],
            cost: 0.0,
            distance_m: 0.0,
            nodes_explored: 0,
        });
    }

    let started = Instant::now();
    let start_coord = graph.node(start).coord;
    let end_coord = graph.node(end).coord;
    let h_scale = (params.alpha + 0.1).min(1.0);

    let n = graph.node_count();
    let mut g_cost = vec![f64::INFINITY; n];
    let mut g_dist = vec![f64::INFINITY; n];
    let mut parent = vec![NodeId::INVALID; n];
    let mut closed = vec![false; n];

    g_cost[start.index()] = 0.0;
    g_dist[start.index()] = 0.0;

    let mut open = BinaryHeap::with_capacity(n.min(4_096));
    open.push(Frontier {
        f: start_coord.distance_m(end_coord) * h_scale,
        g_dist: 0.0,
        node: start,
    });

    let mut explored = 0usize;
    let mut pops = 0u32;

    while let Some(Frontier { node, .. }) = open.pop() {
        pops += 1;
        if pops % params.check_interval.max(1) == 0 {
            if let Some(token) = &params.cancel {
                if token.is_cancelled() {
                    return Err(SearchError::Cancelled);
                }
            }
            if started.elapsed() > params.timeout {
                return Err(SearchError::Timeout {
                    budget_ms: params.timeout.as_millis() as u64,
                });
            }
        }

        if closed[node.index()] {
            continue; // lazy-deleted duplicate
        }
        closed[node.index()] = true;
        explored += 1;

        if node == end {
            debug!(
                "goal popped after {explored} expansions in {:?}",
                started.elapsed()
            );
            return Ok(SearchOutcome {
                nodes: reconstruct(&parent, start, end)?,
                cost: g_cost[end.index()],
                distance_m: g_dist[end.index()],
                nodes_explored: explored,
            });
        }

        let node_cost = g_cost[node.index()];
        let node_dist = g_dist[node.index()];

        for &neighbor in graph.neighbors(node) {
            if closed[neighbor.index()] {
                continue;
            }

            let nbr_coord = graph.node(neighbor).coord;
            if neighbor != end
                && !within_ellipse(nbr_coord, start_coord, end_coord, params.corridor_m)
            {
                continue; // corridor prune
            }

            let edge_id = graph
                .edge_between(node, neighbor)
                .expect("adjacency mirrors edge_lookup");
            let edge = graph.edge(edge_id);

            let new_dist = node_dist + edge.length_m;
            if let Some(cap) = params.max_distance_m {
                // Detour prune: walked distance, plus the best-case remainder,
                // must stay within the cap.
                if new_dist > cap || new_dist + nbr_coord.distance_m(end_coord) > cap {
                    continue;
                }
            }

            let new_cost = node_cost + edge.blended_cost(params.alpha);
            if new_cost < g_cost[neighbor.index()] {
                g_cost[neighbor.index()] = new_cost;
                g_dist[neighbor.index()] = new_dist;
                parent[neighbor.index()] = node;
                open.push(Frontier {
                    f: new_cost + nbr_coord.distance_m(end_coord) * h_scale,
                    g_dist: new_dist,
                    node: neighbor,
                });
            }
        }
    }

    Err(SearchError::NoRoute {
        from: start,
        to: end,
    })
}
