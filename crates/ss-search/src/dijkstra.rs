//! Distance-only shortest path.
//!
//! Used directly for `quickest` routes and as the baseline that prices every
//! other kind's detour cap and `distance_increase_pct` metric.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ss_core::NodeId;
use ss_graph::RoutingGraph;

use crate::{SearchError, SearchResult};

/// Result of a shortest-distance query.
#[derive(Debug, Clone)]
pub struct ShortestPath {
    /// Node sequence from start to end inclusive.
    pub nodes: Vec<NodeId>,
    /// Total length in metres.
    pub distance_m: f64,
}

/// Min-heap entry over f64 cost with deterministic node-id tie-breaking.
#[derive(Copy, Clone, PartialEq)]
struct QueueEntry {
    cost: f64,
    node: NodeId,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    /// Reversed so `BinaryHeap` (a max-heap) pops the smallest cost first;
    /// ties break on the smaller node id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Standard Dijkstra over edge lengths.
///
/// `start == end` returns the trivial single-node path.  Stale heap entries
/// (superseded by a cheaper relaxation) are skipped on pop.
pub fn shortest_distance(
    graph: &RoutingGraph,
    start: NodeId,
    end: NodeId,
) -> SearchResult<ShortestPath> {
    if start == end {
        return Ok(ShortestPath {
            nodes: vec![start],
            distance_m: 0.0,
        });
    }

    let n = graph.node_count();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![NodeId::INVALID; n];
    dist[start.index()] = 0.0;

    let mut heap = BinaryHeap::with_capacity(n.min(4_096));
    heap.push(QueueEntry {
        cost: 0.0,
        node: start,
    });

    while let Some(QueueEntry { cost, node }) = heap.pop() {
        if node == end {
            let nodes = reconstruct(&prev, start, end)?;
            return Ok(ShortestPath {
                nodes,
                distance_m: cost,
            });
        }
        if cost > dist[node.index()] {
            continue; // stale entry
        }

        for &neighbor in graph.neighbors(node) {
            let edge = graph
                .edge_between(node, neighbor)
                .expect("adjacency mirrors edge_lookup");
            let new_cost = cost + graph.edge(edge).length_m;

            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = node;
                heap.push(QueueEntry {
                    cost: new_cost,
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

/// Follow parent pointers back to `start`.  A repeated node means the parent
/// chain is cyclic — an internal invariant failure, surfaced rather than
/// looped on.
pub(crate) fn reconstruct(
    prev: &[NodeId],
    start: NodeId,
    end: NodeId,
) -> SearchResult<Vec<NodeId>> {
    let mut visited = vec![false; prev.len()];
    let mut nodes = vec![end];
    let mut cur = end;

    while cur != start {
        if visited[cur.index()] {
            return Err(SearchError::Internal(format!(
                "cycle through {cur} during path reconstruction"
            )));
        }
        visited[cur.index()] = true;

        cur = prev[cur.index()];
        if cur == NodeId::INVALID {
            return Err(SearchError::Internal(
                "parent chain broke before reaching the start".into(),
            ));
        }
        nodes.push(cur);
    }

    nodes.reverse();
    Ok(nodes)
}
