//! `ss-core` — foundational types for the `streetsafe` routing engine.
//!
//! This crate is a dependency of every other `ss-*` crate.  It intentionally
//! has no `ss-*` dependencies and no required external ones (only optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `EdgeId`, `SegmentId`                          |
//! | [`geo`]      | `Coord`, haversine, bearing, corridor ellipse, segment intersection |
//! | [`quantize`] | `NodeKey` (1e-6°), `MaskKey` (1e-4°) fixed-point keys    |
//! | [`bounds`]   | `ServiceArea` bounding box (Washington DC preset)        |
//! | [`config`]   | `EngineConfig` — every runtime knob with its default     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.         |

pub mod bounds;
pub mod config;
pub mod geo;
pub mod ids;
pub mod quantize;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use bounds::ServiceArea;
pub use config::EngineConfig;
pub use geo::Coord;
pub use ids::{EdgeId, NodeId, SegmentId};
pub use quantize::{MaskKey, NodeKey};
