//! The immutable routing graph.
//!
//! # Data layout
//!
//! Nodes and edges live in dense `Vec`s indexed by `NodeId` / `EdgeId`,
//! assigned in sorted-key order by [`RoutingGraph::assemble`] so identical
//! inputs always produce identical indices.  Adjacency is a per-node sorted
//! neighbour list; `edge_lookup` maps **both** directions of a node pair to
//! the edge index.  An R-tree over node positions answers nearest-node
//! snapping for request endpoints.
//!
//! The graph is built once (offline or at startup) and never mutated;
//! searches share it by reference.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use ss_core::geo::Coord;
use ss_core::quantize::NodeKey;
use ss_core::{EdgeId, NodeId};

use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree snap index: a 2-D `[lat, lon]` point with the
/// associated `NodeId`.
#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Sufficient for
    /// nearest-node queries within a city (error < 0.1 % at ≤ 60° lat).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Node & edge ───────────────────────────────────────────────────────────────

/// A graph vertex: the quantized key is its canonical identity, the coord is
/// the cell centre every holder of the key agrees on.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub key: NodeKey,
    pub coord: Coord,
}

/// An undirected edge.  `source < target` by key; the polyline is ordered
/// source → target.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub length_m: f64,
    /// Normalized safety score of the parent segment, 1–100, higher = safer.
    pub safety_score: u8,
    /// Pre-computed safety cost in metre-equivalent units:
    /// `(1 − (score−1)/99) · 100` — safest edge → 0, most dangerous → 100.
    pub w_safety: f64,
    pub polyline: Vec<Coord>,
}

impl GraphEdge {
    /// Distance weight — the edge length in metres.
    #[inline]
    pub fn w_distance(&self) -> f64 {
        self.length_m
    }

    /// Blended traversal cost for safety/distance mix `alpha`
    /// (1 = distance only, 0 = safety only).
    #[inline]
    pub fn blended_cost(&self, alpha: f64) -> f64 {
        alpha * self.w_distance() + (1.0 - alpha) * self.w_safety
    }
}

/// Raw material for [`RoutingGraph::assemble`]: one undirected edge between
/// two node keys.  Direction and duplicates are normalized during assembly.
#[derive(Clone, Debug)]
pub struct EdgeSpec {
    pub a: NodeKey,
    pub b: NodeKey,
    pub safety_score: u8,
    pub polyline: Vec<Coord>,
}

// ── RoutingGraph ──────────────────────────────────────────────────────────────

/// The shared, immutable routing structure.
#[derive(Debug)]
pub struct RoutingGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    adjacency: Vec<Vec<NodeId>>,
    edge_lookup: FxHashMap<(NodeId, NodeId), EdgeId>,
    key_index: FxHashMap<NodeKey, NodeId>,
    snap_index: RTree<NodeEntry>,
}

impl RoutingGraph {
    /// Build a graph from node keys and edge specs.
    ///
    /// Input order is irrelevant: nodes are interned in sorted-key order and
    /// edges in sorted canonical-pair order, duplicates collapse (first spec
    /// wins), and edge direction is normalized to `source < target`.
    ///
    /// Errors with [`GraphError::Corrupt`] if an edge references a key not in
    /// the node list, a polyline has fewer than two points or does not start
    /// and end on its endpoints, or a safety score is outside 1–100.
    pub fn assemble(node_keys: Vec<NodeKey>, edge_specs: Vec<EdgeSpec>) -> GraphResult<Self> {
        // ── Intern nodes in sorted-key order ─────────────────────────────
        let mut keys = node_keys;
        keys.sort_unstable();
        keys.dedup();

        let nodes: Vec<GraphNode> = keys
            .iter()
            .map(|&key| GraphNode { key, coord: key.to_coord() })
            .collect();

        let key_index: FxHashMap<NodeKey, NodeId> = keys
            .iter()
            .enumerate()
            .map(|(i, &k)| (k, NodeId(i as u32)))
            .collect();

        // ── Canonicalize, sort, and dedup edges ──────────────────────────
        let mut specs = edge_specs;
        for spec in &mut specs {
            if spec.a > spec.b {
                std::mem::swap(&mut spec.a, &mut spec.b);
                spec.polyline.reverse();
            }
        }
        specs.sort_by(|x, y| (x.a, x.b).cmp(&(y.a, y.b)));
        specs.dedup_by(|x, first| (x.a, x.b) == (first.a, first.b));

        let mut edges = Vec::with_capacity(specs.len());
        for spec in specs {
            edges.push(Self::freeze_edge(&key_index, spec)?);
        }

        // ── Derived indexes ──────────────────────────────────────────────
        let mut adjacency: Vec<Vec<NodeId>> = vec![Vec::new(); nodes.len()];
        let mut edge_lookup = FxHashMap::default();
        for (i, e) in edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            adjacency[e.source.index()].push(e.target);
            adjacency[e.target.index()].push(e.source);
            edge_lookup.insert((e.source, e.target), id);
            edge_lookup.insert((e.target, e.source), id);
        }
        for list in &mut adjacency {
            list.sort_unstable();
        }

        let entries: Vec<NodeEntry> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry {
                point: [n.coord.lat, n.coord.lon],
                id: NodeId(i as u32),
            })
            .collect();
        let snap_index = RTree::bulk_load(entries);

        let graph = Self {
            nodes,
            edges,
            adjacency,
            edge_lookup,
            key_index,
            snap_index,
        };
        graph.validate()?;
        Ok(graph)
    }

    fn freeze_edge(
        key_index: &FxHashMap<NodeKey, NodeId>,
        spec: EdgeSpec,
    ) -> GraphResult<GraphEdge> {
        let source = *key_index.get(&spec.a).ok_or_else(|| {
            GraphError::Corrupt(format!("edge references unknown node {}", spec.a))
        })?;
        let target = *key_index.get(&spec.b).ok_or_else(|| {
            GraphError::Corrupt(format!("edge references unknown node {}", spec.b))
        })?;

        if spec.polyline.len() < 2 {
            return Err(GraphError::Corrupt(format!(
                "edge {}–{} polyline has {} point(s)",
                spec.a,
                spec.b,
                spec.polyline.len()
            )));
        }
        let first = NodeKey::from_coord(spec.polyline[0]);
        let last = NodeKey::from_coord(spec.polyline[spec.polyline.len() - 1]);
        if first != spec.a || last != spec.b {
            return Err(GraphError::Corrupt(format!(
                "edge {}–{} polyline endpoints {first}…{last} do not match",
                spec.a, spec.b
            )));
        }
        if !(1..=100).contains(&spec.safety_score) {
            return Err(GraphError::Corrupt(format!(
                "edge {}–{} safety score {} outside 1–100",
                spec.a, spec.b, spec.safety_score
            )));
        }

        let length_m: f64 = spec
            .polyline
            .windows(2)
            .map(|w| w[0].distance_m(w[1]))
            .sum();
        let w_safety = (1.0 - (spec.safety_score as f64 - 1.0) / 99.0) * 100.0;

        Ok(GraphEdge {
            source,
            target,
            length_m,
            safety_score: spec.safety_score,
            w_safety,
            polyline: spec.polyline,
        })
    }

    // ── Dimensions & accessors ────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &GraphEdge {
        &self.edges[id.index()]
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Sorted neighbour list of `node`.
    #[inline]
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        &self.adjacency[node.index()]
    }

    /// The edge connecting `a` and `b`, in either direction.
    #[inline]
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.edge_lookup.get(&(a, b)).copied()
    }

    /// Interned index of a canonical node key.
    pub fn node_by_key(&self, key: NodeKey) -> Option<NodeId> {
        self.key_index.get(&key).copied()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest graph node to `pos`; `None` only for an empty graph.
    pub fn snap_to_node(&self, pos: Coord) -> Option<NodeId> {
        self.snap_index
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    // ── Integrity ─────────────────────────────────────────────────────────

    /// Check the structural invariants: every edge endpoint exists, the
    /// adjacency mirrors the edge set exactly (symmetrically), and
    /// `edge_lookup` is bidirectional and consistent.
    pub fn validate(&self) -> GraphResult<()> {
        let n = self.nodes.len();

        for (i, e) in self.edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            if e.source.index() >= n || e.target.index() >= n {
                return Err(GraphError::Corrupt(format!(
                    "edge {id} references a node outside the graph"
                )));
            }
            if e.source == e.target {
                return Err(GraphError::Corrupt(format!("edge {id} is a self-loop")));
            }
            match (
                self.edge_lookup.get(&(e.source, e.target)),
                self.edge_lookup.get(&(e.target, e.source)),
            ) {
                (Some(&f), Some(&r)) if f == id && r == id => {}
                _ => {
                    return Err(GraphError::Corrupt(format!(
                        "edge_lookup disagrees with edge {id}"
                    )));
                }
            }
            if !self.adjacency[e.source.index()].contains(&e.target)
                || !self.adjacency[e.target.index()].contains(&e.source)
            {
                return Err(GraphError::Corrupt(format!(
                    "adjacency does not mirror edge {id}"
                )));
            }
        }

        // No phantom adjacency entries without a backing edge.
        let degree_sum: usize = self.adjacency.iter().map(Vec::len).sum();
        if degree_sum != 2 * self.edges.len() {
            return Err(GraphError::Corrupt(format!(
                "adjacency lists {degree_sum} half-edges for {} edges",
                self.edges.len()
            )));
        }
        if self.edge_lookup.len() != 2 * self.edges.len() {
            return Err(GraphError::Corrupt(format!(
                "edge_lookup has {} entries for {} edges",
                self.edge_lookup.len(),
                self.edges.len()
            )));
        }

        Ok(())
    }

    /// Sizes of the connected components, largest first.
    pub fn component_sizes(&self) -> Vec<usize> {
        let n = self.nodes.len();
        let mut seen = vec![false; n];
        let mut sizes = Vec::new();
        let mut stack = Vec::new();

        for start in 0..n {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            stack.push(NodeId(start as u32));
            let mut size = 0usize;
            while let Some(node) = stack.pop() {
                size += 1;
                for &next in self.neighbors(node) {
                    if !seen[next.index()] {
                        seen[next.index()] = true;
                        stack.push(next);
                    }
                }
            }
            sizes.push(size);
        }

        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }
}
