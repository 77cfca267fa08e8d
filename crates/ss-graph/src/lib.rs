//! `ss-graph` — the routing graph and its offline builder.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`graph`]     | `RoutingGraph` (dense arrays + R-tree snap), `validate`  |
//! | [`builder`]   | `GraphBuilder` — filter, dense-vertex pass, implicit-intersection splitting |
//! | [`artifacts`] | deterministic CSV serialization of the four graph files  |
//! | [`error`]     | `GraphError`, `GraphResult<T>`                           |
//!
//! # Identity model
//!
//! On disk, nodes are identified by their quantized coordinate key
//! ([`ss_core::NodeKey`], 1e-6°) and edges by the canonical (min, max) key
//! pair.  In memory both are interned into dense `u32` indices
//! ([`ss_core::NodeId`], [`ss_core::EdgeId`]) assigned in sorted-key order,
//! so the same artifacts always load into the same indices and search
//! scratch state can live in flat `Vec`s.

pub mod artifacts;
pub mod builder;
pub mod error;
pub mod graph;

#[cfg(test)]
mod tests;

pub use builder::GraphBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{EdgeSpec, GraphEdge, GraphNode, RoutingGraph};
