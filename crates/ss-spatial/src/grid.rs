//! Uniform lat/lon cell grid for O(1)-average proximity queries.
//!
//! # Contract
//!
//! `query_radius` returns **candidates** — every entry stored in a cell that
//! overlaps a bounding box around the query point.  Callers filter by exact
//! distance.  There are no false negatives for query radii up to the cell
//! size; false positives are expected and cheap to reject.
//!
//! Two cell sizes are used in this workspace: 0.002° (~200 m) for segment
//! centres during crime scoring, and 0.0005° for edge buckets during
//! implicit-intersection detection.

use rustc_hash::{FxHashMap, FxHashSet};

use ss_core::geo::{meters_per_deg_lon, Coord, METERS_PER_DEG_LAT};

/// Cell size (degrees) for indexing segment centres.
pub const SEGMENT_CELL_DEG: f64 = 0.002;

/// Finer cell size (degrees) for edge intersection buckets.
pub const INTERSECTION_CELL_DEG: f64 = 0.0005;

/// A uniform grid over lat/lon keyed by quantized cell id.
///
/// `T` is a small copyable ID (e.g. `SegmentId`, `EdgeId`); an entry may
/// occupy multiple cells when inserted by bounding box.
pub struct SpatialGrid<T> {
    cell_deg: f64,
    cells: FxHashMap<(i32, i32), Vec<T>>,
}

impl<T: Copy + Eq + std::hash::Hash> SpatialGrid<T> {
    pub fn new(cell_deg: f64) -> Self {
        debug_assert!(cell_deg > 0.0);
        Self {
            cell_deg,
            cells: FxHashMap::default(),
        }
    }

    #[inline]
    fn cell_of(&self, c: Coord) -> (i32, i32) {
        (
            (c.lat / self.cell_deg).floor() as i32,
            (c.lon / self.cell_deg).floor() as i32,
        )
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Insert an entry at a single point.
    pub fn insert(&mut self, at: Coord, id: T) {
        self.cells.entry(self.cell_of(at)).or_default().push(id);
    }

    /// Insert an entry into every cell overlapped by the bounding box of
    /// `a`..`b` (corners in either order).
    pub fn insert_bbox(&mut self, a: Coord, b: Coord, id: T) {
        let (lat_lo, lat_hi) = min_max(a.lat, b.lat);
        let (lon_lo, lon_hi) = min_max(a.lon, b.lon);

        let (r0, c0) = self.cell_of(Coord::new(lat_lo, lon_lo));
        let (r1, c1) = self.cell_of(Coord::new(lat_hi, lon_hi));

        for r in r0..=r1 {
            for c in c0..=c1 {
                self.cells.entry((r, c)).or_default().push(id);
            }
        }
    }

    /// Candidate entries within `radius_m` of `center` — deduplicated, in
    /// unspecified order.  Callers must filter by exact distance.
    pub fn query_radius(&self, center: Coord, radius_m: f64) -> Vec<T> {
        let d_lat = radius_m / METERS_PER_DEG_LAT;
        let d_lon = radius_m / meters_per_deg_lon(center.lat);

        let (r0, c0) = self.cell_of(Coord::new(center.lat - d_lat, center.lon - d_lon));
        let (r1, c1) = self.cell_of(Coord::new(center.lat + d_lat, center.lon + d_lon));

        let mut seen: FxHashSet<T> = FxHashSet::default();
        let mut out = Vec::new();
        for r in r0..=r1 {
            for c in c0..=c1 {
                if let Some(ids) = self.cells.get(&(r, c)) {
                    for &id in ids {
                        if seen.insert(id) {
                            out.push(id);
                        }
                    }
                }
            }
        }
        out
    }

    /// Iterate over the entry lists of all non-empty cells.
    ///
    /// Used by the graph builder to enumerate intersection-candidate pairs
    /// bucket by bucket.  Entries inserted by bounding box appear once per
    /// overlapped cell.
    pub fn buckets(&self) -> impl Iterator<Item = &[T]> {
        self.cells.values().map(Vec::as_slice)
    }
}

#[inline]
fn min_max(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
