//! Service-area bounding box.

use crate::geo::Coord;

/// Axis-aligned lat/lon bounding box of the served city.
///
/// Requests outside it are rejected before any search runs.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceArea {
    pub north: f64,
    pub south: f64,
    pub east:  f64,
    pub west:  f64,
}

impl ServiceArea {
    /// Washington DC.
    pub const DC: ServiceArea = ServiceArea {
        north: 38.995,
        south: 38.791,
        east:  -76.909,
        west:  -77.119,
    };

    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.lat <= self.north && c.lat >= self.south && c.lon <= self.east && c.lon >= self.west
    }
}

impl Default for ServiceArea {
    fn default() -> Self {
        Self::DC
    }
}
