//! `ss-score` — per-segment safety scoring from historical crime density.
//!
//! The offline half of the pipeline: consumes typed crime incidents and
//! street centerlines, produces `scored-segments` (safety 1–100 per segment,
//! higher = safer) for the graph builder.
//!
//! # Crate layout
//!
//! | Module           | Contents                                              |
//! |------------------|-------------------------------------------------------|
//! | [`incident`]     | `CrimeIncident`, `OffenseKind` weight table, CSV loader |
//! | [`segment`]      | `StreetSegment`, `RoadType`, `ScoredSegment`, polyline codec, CSV I/O |
//! | [`distribution`] | log/IQR normalization to the 1–100 scale              |
//! | [`scorer`]       | weighted distance-decay accumulation                  |
//! | [`error`]        | `ScoreError`, `ScoreResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Rayon fan-out over incidents during accumulation.        |

pub mod distribution;
pub mod error;
pub mod incident;
pub mod scorer;
pub mod segment;

#[cfg(test)]
mod tests;

pub use distribution::ScoreDistribution;
pub use error::{ScoreError, ScoreResult};
pub use incident::{CrimeIncident, OffenseKind, TimeOfDay};
pub use scorer::{SafetyScorer, ScorerConfig};
pub use segment::{Quadrant, RoadType, ScoredSegment, StreetSegment};
