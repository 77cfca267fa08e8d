//! Walkability mask — which 1e-4° cells of the city a pedestrian can stand in.
//!
//! Built offline from a walkable-tag extract of the street corpus and
//! persisted as a sorted two-column CSV.  Street data and GPS fixes are
//! misaligned by a few metres routinely, so the point predicate tolerates a
//! ±10-cell (~±110 m) neighbourhood around the queried cell.
//!
//! # CSV format
//!
//! ```csv
//! lat_ddeg,lon_ddeg
//! 388930,-770502
//! 388977,-770365
//! ```
//!
//! Keys are integer 1e-4° steps; rows are written in sorted order so that
//! identical masks serialize byte-identically.

use std::io::{Read, Write};
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::Deserialize;

use ss_core::geo::Coord;
use ss_core::quantize::MaskKey;

use crate::{SpatialError, SpatialResult};

/// Half-width (in cells) of the neighbourhood scanned by [`WalkabilityMask::is_walkable`].
const PROBE_HALF_CELLS: i32 = 10;

/// Degrees per mask cell.
const CELL_DEG: f64 = 1e-4;

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct MaskRecord {
    lat_ddeg: i32,
    lon_ddeg: i32,
}

// ── WalkabilityMask ───────────────────────────────────────────────────────────

/// Read-only set of walkable cells.
///
/// Constructed once offline, then shared by reference across searches.
#[derive(Debug)]
pub struct WalkabilityMask {
    cells: FxHashSet<MaskKey>,
}

impl WalkabilityMask {
    pub fn new() -> Self {
        Self {
            cells: FxHashSet::default(),
        }
    }

    pub fn from_keys(keys: impl IntoIterator<Item = MaskKey>) -> Self {
        Self {
            cells: keys.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Mark the cell containing `(lat, lon)` walkable.
    pub fn insert(&mut self, lat: f64, lon: f64) {
        self.cells.insert(MaskKey::from_lat_lon(lat, lon));
    }

    #[inline]
    pub fn contains_key(&self, key: MaskKey) -> bool {
        self.cells.contains(&key)
    }

    /// `true` iff `(lat, lon)` or any cell within ±10 cells (~±110 m) of it
    /// is walkable.
    ///
    /// The exact cell is probed first; the 21×21 neighbourhood scan only
    /// runs on a miss.
    pub fn is_walkable(&self, lat: f64, lon: f64) -> bool {
        let key = MaskKey::from_lat_lon(lat, lon);
        if self.cells.contains(&key) {
            return true;
        }
        for d_lat in -PROBE_HALF_CELLS..=PROBE_HALF_CELLS {
            for d_lon in -PROBE_HALF_CELLS..=PROBE_HALF_CELLS {
                if self.cells.contains(&key.offset(d_lat, d_lon)) {
                    return true;
                }
            }
        }
        false
    }

    /// Centre of the nearest walkable cell within `max_deg` of `(lat, lon)`.
    ///
    /// Expands square rings outward one cell (0.0001°) at a time.  Within the
    /// first ring containing any hit, the cell whose centre is closest to the
    /// query wins; remaining ties break on the key itself, so the result is
    /// deterministic.
    pub fn nearest_walkable(&self, lat: f64, lon: f64, max_deg: f64) -> SpatialResult<Coord> {
        let origin = Coord::new(lat, lon);
        let key = MaskKey::from_lat_lon(lat, lon);
        let max_ring = (max_deg / CELL_DEG).floor() as i32;

        for ring in 0..=max_ring {
            let mut best: Option<(f64, MaskKey)> = None;
            for (d_lat, d_lon) in ring_offsets(ring) {
                let probe = key.offset(d_lat, d_lon);
                if !self.cells.contains(&probe) {
                    continue;
                }
                let d = origin.distance_m(probe.to_coord());
                let better = match best {
                    None => true,
                    Some((bd, bk)) => d < bd || (d == bd && probe < bk),
                };
                if better {
                    best = Some((d, probe));
                }
            }
            if let Some((_, found)) = best {
                return Ok(found.to_coord());
            }
        }

        Err(SpatialError::NoWalkableNearby {
            lat,
            lon,
            searched_deg: max_deg,
        })
    }

    // ── Serialization ─────────────────────────────────────────────────────

    /// Load a mask from its CSV artifact.
    pub fn load_csv(path: &Path) -> SpatialResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Like [`load_csv`](Self::load_csv) but from any `Read` source.
    pub fn from_reader<R: Read>(reader: R) -> SpatialResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut cells = FxHashSet::default();
        for row in csv_reader.deserialize::<MaskRecord>() {
            let row = row.map_err(|e| SpatialError::Parse(e.to_string()))?;
            cells.insert(MaskKey {
                lat_ddeg: row.lat_ddeg,
                lon_ddeg: row.lon_ddeg,
            });
        }
        Ok(Self { cells })
    }

    /// Write the mask as sorted CSV — identical masks produce byte-identical
    /// files.
    pub fn save_csv(&self, path: &Path) -> SpatialResult<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> SpatialResult<()> {
        let mut w = csv::Writer::from_writer(writer);
        w.write_record(["lat_ddeg", "lon_ddeg"])
            .map_err(|e| SpatialError::Parse(e.to_string()))?;

        let mut keys: Vec<MaskKey> = self.cells.iter().copied().collect();
        keys.sort_unstable();
        for k in keys {
            w.write_record(&[k.lat_ddeg.to_string(), k.lon_ddeg.to_string()])
                .map_err(|e| SpatialError::Parse(e.to_string()))?;
        }
        w.flush()?;
        Ok(())
    }
}

impl Default for WalkabilityMask {
    fn default() -> Self {
        Self::new()
    }
}

/// Offsets of the square ring at Chebyshev radius `ring` (row-major order;
/// ring 0 is the single centre cell).
fn ring_offsets(ring: i32) -> Vec<(i32, i32)> {
    if ring == 0 {
        return vec![(0, 0)];
    }
    let mut out = Vec::with_capacity((8 * ring) as usize);
    for d_lat in -ring..=ring {
        for d_lon in -ring..=ring {
            if d_lat.abs().max(d_lon.abs()) == ring {
                out.push((d_lat, d_lon));
            }
        }
    }
    out
}
