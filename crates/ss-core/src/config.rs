//! Engine configuration.
//!
//! A plain struct with documented defaults.  The CLI deserializes it from a
//! JSON file; tests construct it literally.  Everything an operator can tune
//! lives here — there are no other knobs scattered through the workspace.

use std::path::PathBuf;

use crate::bounds::ServiceArea;

/// Runtime configuration for the routing engine.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Assumed pedestrian speed, km/h.  Converts route distance to duration.
    pub walking_speed_kmh: f64,

    /// Corridor half-width as a fraction of the direct start→end distance.
    pub corridor_fraction: f64,

    /// Lower bound on the corridor width, metres — keeps short routes from
    /// collapsing the search area to a sliver.
    pub corridor_min_m: f64,

    /// Wall-clock budget for a single search, milliseconds.
    pub search_timeout_ms: u64,

    /// How many A* iterations between cancellation / timeout checks.
    pub iteration_check_interval: u32,

    /// Maximum walkability-snap radius, degrees (~0.01° ≈ 1 km).
    pub snap_max_deg: f64,

    /// Directories scanned for graph/mask artifacts; first existing wins.
    pub data_dirs: Vec<PathBuf>,

    /// Override the route kind's preset safety/distance blend α.
    /// `None` uses the presets (quickest 1.0, balanced 0.5, safest 0.0).
    pub alpha_override: Option<f64>,

    /// Served bounding box.  Defaults to Washington DC.
    pub service_area: ServiceArea,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            walking_speed_kmh: 5.0,
            corridor_fraction: 0.30,
            corridor_min_m: 200.0,
            search_timeout_ms: 25_000,
            iteration_check_interval: 500,
            snap_max_deg: 0.01,
            data_dirs: vec![PathBuf::from("data"), PathBuf::from("/var/lib/streetsafe")],
            alpha_override: None,
            service_area: ServiceArea::DC,
        }
    }
}

impl EngineConfig {
    /// Walking speed in metres per second.
    #[inline]
    pub fn walking_speed_ms(&self) -> f64 {
        self.walking_speed_kmh / 3.6
    }
}
