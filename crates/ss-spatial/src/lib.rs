//! `ss-spatial` — proximity indexing and walkability.
//!
//! # Crate layout
//!
//! | Module    | Contents                                                     |
//! |-----------|--------------------------------------------------------------|
//! | [`grid`]  | `SpatialGrid<T>` — uniform lat/lon cell index                |
//! | [`mask`]  | `WalkabilityMask` — walkable-cell set with nearest-cell search |
//! | [`error`] | `SpatialError`, `SpatialResult<T>`                           |

pub mod error;
pub mod grid;
pub mod mask;


pub use error::{SpatialError, SpatialResult};
pub use grid::SpatialGrid;
pub use mask::WalkabilityMask;
