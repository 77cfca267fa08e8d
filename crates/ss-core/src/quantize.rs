//! Fixed-point coordinate keys.
//!
//! Coordinates are quantized **exactly once, at ingest** (spec'd at 1e-6°
//! for node identity, 1e-4° for walkability cells); all equality, hashing,
//! ordering, and serialization flow through the integer keys.  Floats are
//! never compared for equality anywhere else in the workspace.

use crate::geo::Coord;

/// Canonical identity of a graph node: `(lat, lon)` in integer microdegrees.
///
/// 1e-6° is ~0.11 m at DC latitudes — geometrically coincident vertices from
/// different input segments collapse to the same key.  Keys order
/// lexicographically `(lat, lon)`, which fixes the canonical direction of an
/// undirected edge.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeKey {
    pub lat_udeg: i64,
    pub lon_udeg: i64,
}

impl NodeKey {
    #[inline]
    pub fn from_coord(c: Coord) -> Self {
        Self {
            lat_udeg: (c.lat * 1e6).round() as i64,
            lon_udeg: (c.lon * 1e6).round() as i64,
        }
    }

    /// Centre of the quantization cell — the coordinate every holder of this
    /// key agrees on.
    #[inline]
    pub fn to_coord(self) -> Coord {
        Coord::new(self.lat_udeg as f64 / 1e6, self.lon_udeg as f64 / 1e6)
    }

    /// Canonical ordering of an undirected node pair: `(min, max)`.
    #[inline]
    pub fn canonical_pair(a: NodeKey, b: NodeKey) -> (NodeKey, NodeKey) {
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl std::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.lat_udeg, self.lon_udeg)
    }
}

/// Walkability-mask cell: `(lat, lon)` in integer 1e-4° steps (~11 m).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskKey {
    pub lat_ddeg: i32,
    pub lon_ddeg: i32,
}

impl MaskKey {
    #[inline]
    pub fn from_lat_lon(lat: f64, lon: f64) -> Self {
        Self {
            lat_ddeg: (lat * 1e4).round() as i32,
            lon_ddeg: (lon * 1e4).round() as i32,
        }
    }

    /// Cell centre.
    #[inline]
    pub fn to_coord(self) -> Coord {
        Coord::new(self.lat_ddeg as f64 / 1e4, self.lon_ddeg as f64 / 1e4)
    }

    /// The key `d_lat` / `d_lon` cells away.
    #[inline]
    pub fn offset(self, d_lat: i32, d_lon: i32) -> Self {
        Self {
            lat_ddeg: self.lat_ddeg + d_lat,
            lon_ddeg: self.lon_ddeg + d_lon,
        }
    }
}

impl std::fmt::Display for MaskKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.lat_ddeg, self.lon_ddeg)
    }
}
