//! Offline graph construction.
//!
//! # Passes
//!
//! 1. **Filter** — drop non-routable road types and segments with no
//!    walkable endpoint (OR semantics: one walkable endpoint keeps the
//!    segment, tolerating slight misalignment between the street corpus and
//!    the walkability extract).
//! 2. **Dense vertices** — every consecutive polyline vertex pair becomes an
//!    undirected edge; vertices collapse by quantized key, so geometrically
//!    coincident endpoints from different segments share a node.
//! 3. **Implicit intersections** — edges are bucketed on a 0.0005° grid;
//!    crossing pairs that do not share an endpoint are split through a new
//!    node at the crossing (or the midpoint of a near-parallel overlap,
//!    1 m tolerance).  New edges are re-bucketed and the sweep repeats until
//!    no crossings remain.
//! 4. **Freeze** — [`RoutingGraph::assemble`] interns sorted keys, computes
//!    lengths and weight vectors, and validates.
//!
//! Edges inherit the overall safety score of their parent segment.  A
//! missing score (0 in a legacy artifact) falls back to the scale midpoint
//! of 50; occurrences are counted and logged.

use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use ss_core::geo::{self, Coord};
use ss_core::quantize::NodeKey;
use ss_score::ScoredSegment;
use ss_spatial::grid::{SpatialGrid, INTERSECTION_CELL_DEG};
use ss_spatial::WalkabilityMask;

use crate::graph::{EdgeSpec, RoutingGraph};
use crate::GraphResult;

/// Near-parallel / overlap tolerance for the intersection pass, metres.
const SPLIT_TOL_M: f64 = 1.0;

/// Upper bound on intersection sweeps.  Real street data converges in two or
/// three; the cap only guards against pathological synthetic input.
const MAX_SPLIT_SWEEPS: usize = 32;

/// Fallback safety score when a parent segment carries none.
const FALLBACK_SAFETY: u8 = 50;

/// Canonical working edge: a key pair with `pair.0 < pair.1`.
type KeyPair = (NodeKey, NodeKey);

/// Builds a [`RoutingGraph`] from scored segments and the walkability mask.
pub struct GraphBuilder {
    split_tol_m: f64,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            split_tol_m: SPLIT_TOL_M,
        }
    }

    pub fn build(
        &self,
        scored: &[ScoredSegment],
        mask: &WalkabilityMask,
    ) -> GraphResult<RoutingGraph> {
        let mut edges: FxHashMap<KeyPair, u8> = FxHashMap::default();
        let mut dropped_type = 0usize;
        let mut dropped_walk = 0usize;
        let mut missing_score = 0usize;

        // ── Filter + dense-vertex pass ────────────────────────────────────
        for s in scored {
            if !s.segment.road_type.is_routable() {
                dropped_type += 1;
                continue;
            }
            let first = s.segment.polyline[0];
            let last = s.segment.polyline[s.segment.polyline.len() - 1];
            if !mask.is_walkable(first.lat, first.lon) && !mask.is_walkable(last.lat, last.lon) {
                dropped_walk += 1;
                continue;
            }

            let score = if s.safety_overall == 0 {
                missing_score += 1;
                FALLBACK_SAFETY
            } else {
                s.safety_overall
            };

            for w in s.segment.polyline.windows(2) {
                let a = NodeKey::from_coord(w[0]);
                let b = NodeKey::from_coord(w[1]);
                if a == b {
                    continue; // vertices collapsed by quantization
                }
                edges.entry(NodeKey::canonical_pair(a, b)).or_insert(score);
            }
        }

        if missing_score > 0 {
            warn!("{missing_score} segments had no safety score; using fallback {FALLBACK_SAFETY}");
        }
        info!(
            "dense-vertex pass: {} edges from {} segments ({dropped_type} non-routable, \
             {dropped_walk} non-walkable dropped)",
            edges.len(),
            scored.len()
        );

        // ── Implicit-intersection splitting ───────────────────────────────
        let splits = self.split_intersections(&mut edges);
        info!("intersection pass: {splits} splits, {} edges after", edges.len());

        // ── Freeze ────────────────────────────────────────────────────────
        let mut node_keys: Vec<NodeKey> = Vec::with_capacity(edges.len());
        let mut specs: Vec<EdgeSpec> = Vec::with_capacity(edges.len());
        for (&(a, b), &safety_score) in &edges {
            node_keys.push(a);
            node_keys.push(b);
            specs.push(EdgeSpec {
                a,
                b,
                safety_score,
                polyline: vec![a.to_coord(), b.to_coord()],
            });
        }

        let graph = RoutingGraph::assemble(node_keys, specs)?;

        let components = graph.component_sizes();
        if components.len() > 1 {
            let largest = components[0];
            warn!(
                "graph is disconnected: {} components, largest holds {largest}/{} nodes",
                components.len(),
                graph.node_count()
            );
        }
        info!(
            "graph frozen: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }

    /// Split geometrically crossing edge pairs through shared nodes until a
    /// sweep finds none.  Returns the number of splits applied.
    fn split_intersections(&self, edges: &mut FxHashMap<KeyPair, u8>) -> usize {
        let mut total_splits = 0usize;

        for sweep in 0..MAX_SPLIT_SWEEPS {
            let crossings = self.find_crossings(edges);
            if crossings.is_empty() {
                return total_splits;
            }

            for (pair, at) in crossings {
                // The pair may have been removed by an earlier event in this
                // sweep; `find_crossings` already excludes intra-sweep
                // conflicts, so a plain lookup suffices.
                let Some(safety) = edges.remove(&pair) else { continue };
                edges
                    .entry(NodeKey::canonical_pair(pair.0, at))
                    .or_insert(safety);
                edges
                    .entry(NodeKey::canonical_pair(at, pair.1))
                    .or_insert(safety);
                total_splits += 1;
            }

            if sweep + 1 == MAX_SPLIT_SWEEPS {
                warn!("intersection pass did not converge in {MAX_SPLIT_SWEEPS} sweeps");
            }
        }
        total_splits
    }

    /// One sweep: bucket all edges, test bucket-local pairs, and return the
    /// per-edge split events.  Each edge appears in at most one event per
    /// sweep (later conflicts wait for the next sweep).
    fn find_crossings(&self, edges: &FxHashMap<KeyPair, u8>) -> Vec<(KeyPair, NodeKey)> {
        let mut grid: SpatialGrid<KeyPair> = SpatialGrid::new(INTERSECTION_CELL_DEG);
        for &pair in edges.keys() {
            grid.insert_bbox(pair.0.to_coord(), pair.1.to_coord(), pair);
        }

        let mut claimed: FxHashSet<KeyPair> = FxHashSet::default();
        let mut events: Vec<(KeyPair, NodeKey)> = Vec::new();

        for bucket in grid.buckets() {
            for i in 0..bucket.len() {
                for j in (i + 1)..bucket.len() {
                    let (e1, e2) = (bucket[i], bucket[j]);
                    if shares_endpoint(e1, e2) || claimed.contains(&e1) || claimed.contains(&e2) {
                        continue;
                    }

                    let Some(p) = geo::segment_intersection(
                        e1.0.to_coord(),
                        e1.1.to_coord(),
                        e2.0.to_coord(),
                        e2.1.to_coord(),
                        self.split_tol_m,
                    ) else {
                        continue;
                    };

                    // A touch at an existing endpoint of both edges would
                    // already be a shared node after interning; only strictly
                    // interior crossings split.
                    let at = NodeKey::from_coord(p);
                    if splits_edge(e1, at) {
                        claimed.insert(e1);
                        events.push((e1, at));
                    }
                    if splits_edge(e2, at) {
                        claimed.insert(e2);
                        events.push((e2, at));
                    }
                }
            }
        }
        events
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn shares_endpoint(a: KeyPair, b: KeyPair) -> bool {
    a.0 == b.0 || a.0 == b.1 || a.1 == b.0 || a.1 == b.1
}

/// `at` splits `edge` iff it lies strictly between the endpoints.
#[inline]
fn splits_edge(edge: KeyPair, at: NodeKey) -> bool {
    at != edge.0 && at != edge.1
}

/// Exposed for fixture construction in downstream tests: straight edge specs
/// between coordinate pairs, one per consecutive pair.
pub fn straight_edge_spec(a: Coord, b: Coord, safety_score: u8) -> EdgeSpec {
    let (ka, kb) = (NodeKey::from_coord(a), NodeKey::from_coord(b));
    let (ka, kb) = NodeKey::canonical_pair(ka, kb);
    EdgeSpec {
        a: ka,
        b: kb,
        safety_score,
        polyline: vec![ka.to_coord(), kb.to_coord()],
    }
}
