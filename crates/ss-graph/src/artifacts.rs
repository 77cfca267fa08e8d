//! Deterministic artifact serialization.
//!
//! The offline build emits four CSV files that together form a
//! [`RoutingGraph`]:
//!
//! | File                | Row                                               |
//! |---------------------|---------------------------------------------------|
//! | `graph.nodes`       | `lat_udeg,lon_udeg`                               |
//! | `graph.edges`       | source key, target key, safety score, polyline    |
//! | `graph.adjacency`   | node key, neighbour key (one row per direction)   |
//! | `graph.edge_lookup` | directed key pair → row index into `graph.edges`  |
//!
//! Writers emit rows in canonical sorted order, so identical graphs produce
//! byte-identical files.  Readers tolerate any row order: nodes and edges
//! are re-interned through [`RoutingGraph::assemble`], then the adjacency
//! and edge-lookup files are cross-checked against the derived indexes —
//! any disagreement is [`GraphError::Corrupt`].
//!
//! Edge lengths are not persisted; they are recomputed from the quantized
//! polylines at load, which both keeps the files smaller and guarantees the
//! length/haversine invariant cannot drift.

use std::path::{Path, PathBuf};

use log::info;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use ss_core::NodeId;
use ss_core::quantize::NodeKey;
use ss_score::segment::{decode_polyline, encode_polyline};

use crate::graph::{EdgeSpec, RoutingGraph};
use crate::{GraphError, GraphResult};

/// File names of the four graph artifacts.
pub const NODES_FILE: &str = "graph.nodes";
pub const EDGES_FILE: &str = "graph.edges";
pub const ADJACENCY_FILE: &str = "graph.adjacency";
pub const EDGE_LOOKUP_FILE: &str = "graph.edge_lookup";

/// Companion artifacts consumed at startup alongside the graph files.
pub const MASK_FILE: &str = "walkable-mask";
pub const SCORED_FILE: &str = "scored-segments";

// ── Row types ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRow {
    lat_udeg: i64,
    lon_udeg: i64,
}

#[derive(Deserialize)]
struct EdgeRow {
    src_lat_udeg: i64,
    src_lon_udeg: i64,
    tgt_lat_udeg: i64,
    tgt_lon_udeg: i64,
    safety_score: u8,
    polyline: String,
}

#[derive(Deserialize)]
struct AdjacencyRow {
    lat_udeg: i64,
    lon_udeg: i64,
    nbr_lat_udeg: i64,
    nbr_lon_udeg: i64,
}

#[derive(Deserialize)]
struct LookupRow {
    from_lat_udeg: i64,
    from_lon_udeg: i64,
    to_lat_udeg: i64,
    to_lon_udeg: i64,
    edge_row: usize,
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write the four graph artifacts into `dir`.
///
/// Node and edge rows follow the graph's interned order, which
/// [`RoutingGraph::assemble`] already fixed to sorted-key order — the output
/// is a pure function of the graph's content.
pub fn save_graph(dir: &Path, graph: &RoutingGraph) -> GraphResult<()> {
    std::fs::create_dir_all(dir)?;

    // graph.nodes
    let mut w = csv::Writer::from_path(dir.join(NODES_FILE))?;
    w.write_record(["lat_udeg", "lon_udeg"])?;
    for n in graph.nodes() {
        w.write_record(&[n.key.lat_udeg.to_string(), n.key.lon_udeg.to_string()])?;
    }
    w.flush()?;

    // graph.edges
    let mut w = csv::Writer::from_path(dir.join(EDGES_FILE))?;
    w.write_record([
        "src_lat_udeg",
        "src_lon_udeg",
        "tgt_lat_udeg",
        "tgt_lon_udeg",
        "safety_score",
        "polyline",
    ])?;
    for e in graph.edges() {
        let (src, tgt) = (graph.node(e.source).key, graph.node(e.target).key);
        w.write_record(&[
            src.lat_udeg.to_string(),
            src.lon_udeg.to_string(),
            tgt.lat_udeg.to_string(),
            tgt.lon_udeg.to_string(),
            e.safety_score.to_string(),
            encode_polyline(&e.polyline),
        ])?;
    }
    w.flush()?;

    // graph.adjacency — node order then sorted neighbour order.
    let mut w = csv::Writer::from_path(dir.join(ADJACENCY_FILE))?;
    w.write_record(["lat_udeg", "lon_udeg", "nbr_lat_udeg", "nbr_lon_udeg"])?;
    for (i, n) in graph.nodes().iter().enumerate() {
        for &nbr in graph.neighbors(NodeId(i as u32)) {
            let nk = graph.node(nbr).key;
            w.write_record(&[
                n.key.lat_udeg.to_string(),
                n.key.lon_udeg.to_string(),
                nk.lat_udeg.to_string(),
                nk.lon_udeg.to_string(),
            ])?;
        }
    }
    w.flush()?;

    // graph.edge_lookup — both directions of every edge, sorted by the
    // directed key pair.
    let mut w = csv::Writer::from_path(dir.join(EDGE_LOOKUP_FILE))?;
    w.write_record([
        "from_lat_udeg",
        "from_lon_udeg",
        "to_lat_udeg",
        "to_lon_udeg",
        "edge_row",
    ])?;
    let mut rows: Vec<(NodeKey, NodeKey, usize)> = Vec::with_capacity(2 * graph.edge_count());
    for (i, e) in graph.edges().iter().enumerate() {
        let (src, tgt) = (graph.node(e.source).key, graph.node(e.target).key);
        rows.push((src, tgt, i));
        rows.push((tgt, src, i));
    }
    rows.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    for (from, to, edge_row) in rows {
        w.write_record(&[
            from.lat_udeg.to_string(),
            from.lon_udeg.to_string(),
            to.lat_udeg.to_string(),
            to.lon_udeg.to_string(),
            edge_row.to_string(),
        ])?;
    }
    w.flush()?;

    info!(
        "wrote graph artifacts to {}: {} nodes, {} edges",
        dir.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Load and cross-validate a [`RoutingGraph`] from the artifacts in `dir`.
pub fn load_graph(dir: &Path) -> GraphResult<RoutingGraph> {
    let node_keys = read_nodes(&existing(dir, NODES_FILE)?)?;
    let edge_rows = read_edges(&existing(dir, EDGES_FILE)?)?;

    let specs: Vec<EdgeSpec> = edge_rows.iter().map(|(_, spec)| spec.clone()).collect();
    let graph = RoutingGraph::assemble(node_keys, specs)?;

    cross_check_adjacency(&existing(dir, ADJACENCY_FILE)?, &graph)?;
    cross_check_lookup(&existing(dir, EDGE_LOOKUP_FILE)?, &graph, &edge_rows)?;

    info!(
        "loaded graph from {}: {} nodes, {} edges",
        dir.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

fn existing(dir: &Path, name: &str) -> GraphResult<PathBuf> {
    let path = dir.join(name);
    if !path.is_file() {
        return Err(GraphError::MissingArtifact { path });
    }
    Ok(path)
}

fn read_nodes(path: &Path) -> GraphResult<Vec<NodeKey>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<NodeRow>().enumerate() {
        let row = row.map_err(|e| parse_err(NODES_FILE, i, e))?;
        out.push(NodeKey {
            lat_udeg: row.lat_udeg,
            lon_udeg: row.lon_udeg,
        });
    }
    Ok(out)
}

/// Edge rows in file order, each with its canonical key pair — the lookup
/// file's `edge_row` column references this order.
fn read_edges(path: &Path) -> GraphResult<Vec<((NodeKey, NodeKey), EdgeSpec)>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for (i, row) in reader.deserialize::<EdgeRow>().enumerate() {
        let row = row.map_err(|e| parse_err(EDGES_FILE, i, e))?;
        let a = NodeKey {
            lat_udeg: row.src_lat_udeg,
            lon_udeg: row.src_lon_udeg,
        };
        let b = NodeKey {
            lat_udeg: row.tgt_lat_udeg,
            lon_udeg: row.tgt_lon_udeg,
        };
        let polyline = decode_polyline(&row.polyline).map_err(|message| GraphError::Parse {
            file: EDGES_FILE.to_string(),
            row: i + 1,
            message,
        })?;
        out.push((
            NodeKey::canonical_pair(a, b),
            EdgeSpec {
                a,
                b,
                safety_score: row.safety_score,
                polyline,
            },
        ));
    }
    Ok(out)
}

fn cross_check_adjacency(path: &Path, graph: &RoutingGraph) -> GraphResult<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut seen: FxHashSet<(NodeKey, NodeKey)> = FxHashSet::default();

    for (i, row) in reader.deserialize::<AdjacencyRow>().enumerate() {
        let row = row.map_err(|e| parse_err(ADJACENCY_FILE, i, e))?;
        let node = NodeKey {
            lat_udeg: row.lat_udeg,
            lon_udeg: row.lon_udeg,
        };
        let nbr = NodeKey {
            lat_udeg: row.nbr_lat_udeg,
            lon_udeg: row.nbr_lon_udeg,
        };

        let (Some(a), Some(b)) = (graph.node_by_key(node), graph.node_by_key(nbr)) else {
            return Err(GraphError::Corrupt(format!(
                "adjacency row {node}→{nbr} references an unknown node"
            )));
        };
        if !graph.neighbors(a).contains(&b) {
            return Err(GraphError::Corrupt(format!(
                "adjacency row {node}→{nbr} has no backing edge"
            )));
        }
        if !seen.insert((node, nbr)) {
            return Err(GraphError::Corrupt(format!(
                "duplicate adjacency row {node}→{nbr}"
            )));
        }
    }

    if seen.len() != 2 * graph.edge_count() {
        return Err(GraphError::Corrupt(format!(
            "adjacency file lists {} half-edges; graph has {}",
            seen.len(),
            2 * graph.edge_count()
        )));
    }
    Ok(())
}

fn cross_check_lookup(
    path: &Path,
    graph: &RoutingGraph,
    edge_rows: &[((NodeKey, NodeKey), EdgeSpec)],
) -> GraphResult<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = 0usize;

    for (i, row) in reader.deserialize::<LookupRow>().enumerate() {
        let row = row.map_err(|e| parse_err(EDGE_LOOKUP_FILE, i, e))?;
        let from = NodeKey {
            lat_udeg: row.from_lat_udeg,
            lon_udeg: row.from_lon_udeg,
        };
        let to = NodeKey {
            lat_udeg: row.to_lat_udeg,
            lon_udeg: row.to_lon_udeg,
        };

        let Some(&(pair, _)) = edge_rows.get(row.edge_row) else {
            return Err(GraphError::Corrupt(format!(
                "edge_lookup row {from}→{to} references edge row {} of {}",
                row.edge_row,
                edge_rows.len()
            )));
        };
        if NodeKey::canonical_pair(from, to) != pair {
            return Err(GraphError::Corrupt(format!(
                "edge_lookup row {from}→{to} disagrees with edge row {}",
                row.edge_row
            )));
        }

        let (Some(a), Some(b)) = (graph.node_by_key(from), graph.node_by_key(to)) else {
            return Err(GraphError::Corrupt(format!(
                "edge_lookup row {from}→{to} references an unknown node"
            )));
        };
        if graph.edge_between(a, b).is_none() {
            return Err(GraphError::Corrupt(format!(
                "edge_lookup row {from}→{to} has no backing edge"
            )));
        }
        rows += 1;
    }

    if rows != 2 * graph.edge_count() {
        return Err(GraphError::Corrupt(format!(
            "edge_lookup file has {rows} rows; expected {}",
            2 * graph.edge_count()
        )));
    }
    Ok(())
}

fn parse_err(file: &str, idx: usize, e: csv::Error) -> GraphError {
    GraphError::Parse {
        file: file.to_string(),
        row: idx + 1,
        message: e.to_string(),
    }
}
