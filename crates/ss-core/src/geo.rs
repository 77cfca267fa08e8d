//! Geographic coordinate type and spatial math.
//!
//! `Coord` uses `f64` latitude/longitude: node identity is quantized at
//! 1e-6° (~0.11 m) and edge lengths must reproduce haversine distances to
//! the centimetre, which single precision cannot guarantee at DC longitudes.
//!
//! # Local planar frame
//!
//! Projection and intersection math runs in a local equirectangular frame:
//! metres east/north of an anchor point, with longitude scaled by
//! `cos(anchor.lat)`.  At city scale (< 20 km) the planar error is well
//! under the 1 m tolerances used by the graph builder.

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

/// Mean Earth radius, metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of latitude (and of longitude at the equator).
pub const METERS_PER_DEG_LAT: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

const DEG_TO_M: f64 = METERS_PER_DEG_LAT;

/// Metres per degree of longitude at the given latitude.
#[inline]
pub fn meters_per_deg_lon(lat: f64) -> f64 {
    METERS_PER_DEG_LAT * lat.to_radians().cos()
}

impl Coord {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` iff both components are finite (rejects NaN and ±∞).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// `true` iff the coordinate lies in the valid WGS-84 domain.
    #[inline]
    pub fn in_valid_range(self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Zero iff the coordinates are equal; monotone in angular separation.
    pub fn distance_m(self, other: Coord) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial great-circle bearing from `self` to `other`, degrees in [0, 360).
    pub fn bearing_deg(self, other: Coord) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

        (y.atan2(x).to_degrees() + 360.0) % 360.0
    }

    /// Great-circle destination point `distance_m` metres from `self` along
    /// `bearing_deg`.  Used by fixture generators and snapping diagnostics.
    pub fn destination(self, bearing_deg: f64, distance_m: f64) -> Coord {
        let ang = distance_m / EARTH_RADIUS_M;
        let brg = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * ang.cos() + lat1.cos() * ang.sin() * brg.cos()).asin();
        let lon2 = lon1
            + (brg.sin() * ang.sin() * lat1.cos()).atan2(ang.cos() - lat1.sin() * lat2.sin());

        Coord::new(lat2.to_degrees(), lon2.to_degrees())
    }

}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Corridor ellipse ──────────────────────────────────────────────────────────

/// Width of the elliptical search corridor for a route of direct length
/// `direct_m`: `max(fraction · direct_m, min_m)`.
#[inline]
pub fn corridor_width_m(direct_m: f64, fraction: f64, min_m: f64) -> f64 {
    (fraction * direct_m).max(min_m)
}

/// `true` iff `p` lies inside the ellipse with foci `f1`, `f2` widened by
/// `corridor_m`: `d(p,f1) + d(p,f2) ≤ d(f1,f2) + corridor_m`.
pub fn within_ellipse(p: Coord, f1: Coord, f2: Coord, corridor_m: f64) -> bool {
    p.distance_m(f1) + p.distance_m(f2) <= f1.distance_m(f2) + corridor_m
}

// ── Local planar frame ────────────────────────────────────────────────────────

/// `coord` in metres east/north of `anchor` (equirectangular).
#[inline]
fn to_local_m(anchor: Coord, coord: Coord) -> (f64, f64) {
    let x = (coord.lon - anchor.lon) * DEG_TO_M * anchor.lat.to_radians().cos();
    let y = (coord.lat - anchor.lat) * DEG_TO_M;
    (x, y)
}

/// Inverse of [`to_local_m`].
#[inline]
fn from_local_m(anchor: Coord, x: f64, y: f64) -> Coord {
    let lat = anchor.lat + y / DEG_TO_M;
    let lon = anchor.lon + x / (DEG_TO_M * anchor.lat.to_radians().cos());
    Coord::new(lat, lon)
}

// ── Point-to-segment projection ───────────────────────────────────────────────

/// Orthogonal projection of `p` onto segment `[a, b]`, clamped to the
/// segment.  The degenerate case `a == b` returns `a`.
pub fn nearest_point_on_segment(p: Coord, a: Coord, b: Coord) -> Coord {
    let (bx, by) = to_local_m(a, b);
    let seg_len2 = bx * bx + by * by;
    if seg_len2 == 0.0 {
        return a;
    }

    let (px, py) = to_local_m(a, p);
    let t = ((px * bx + py * by) / seg_len2).clamp(0.0, 1.0);
    from_local_m(a, t * bx, t * by)
}

/// Distance in metres from `p` to the nearest point of segment `[a, b]`.
pub fn point_segment_distance_m(p: Coord, a: Coord, b: Coord) -> f64 {
    p.distance_m(nearest_point_on_segment(p, a, b))
}

// ── Segment intersection ──────────────────────────────────────────────────────

/// Intersection of straight segments `[a1, a2]` and `[b1, b2]`.
///
/// - Proper or touching crossings return the crossing point.
/// - Near-parallel pairs (cross product below the `tol_m` perpendicular
///   threshold) count as overlapping when they are collinear within `tol_m`
///   and their projections onto the shared line overlap; the midpoint of the
///   overlap region is returned.
/// - Disjoint pairs return `None`.
///
/// Callers are responsible for excluding pairs that share an endpoint; this
/// function is pure geometry and will happily report an endpoint touch.
pub fn segment_intersection(
    a1: Coord,
    a2: Coord,
    b1: Coord,
    b2: Coord,
    tol_m: f64,
) -> Option<Coord> {
    // Anchor the planar frame at a1; every point becomes metres east/north.
    let r = to_local_m(a1, a2);
    let s0 = to_local_m(a1, b1);
    let s1 = to_local_m(a1, b2);
    let s = (s1.0 - s0.0, s1.1 - s0.1);

    let rxs = r.0 * s.1 - r.1 * s.0;
    let r_len = (r.0 * r.0 + r.1 * r.1).sqrt();
    let s_len = (s.0 * s.0 + s.1 * s.1).sqrt();
    if r_len == 0.0 || s_len == 0.0 {
        return None; // degenerate input segment
    }

    // Near-parallel: the angle between the segments deviates by less than
    // tol_m across the longer of the two.
    let sin_theta = (rxs / (r_len * s_len)).abs();
    if sin_theta < tol_m / r_len.max(s_len) {
        return collinear_overlap(a1, r, r_len, s0, s1, tol_m);
    }

    // General position: solve a1 + t·r = b1 + u·s.
    let qp = s0;
    let t = (qp.0 * s.1 - qp.1 * s.0) / rxs;
    let u = (qp.0 * r.1 - qp.1 * r.0) / rxs;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(from_local_m(a1, t * r.0, t * r.1))
    } else {
        None
    }
}

/// Overlap midpoint for the near-parallel branch of [`segment_intersection`].
fn collinear_overlap(
    anchor: Coord,
    r: (f64, f64),
    r_len: f64,
    s0: (f64, f64),
    s1: (f64, f64),
    tol_m: f64,
) -> Option<Coord> {
    // Both endpoints of the other segment must sit within tol_m of our line.
    let perp = |p: (f64, f64)| (p.0 * r.1 - p.1 * r.0).abs() / r_len;
    if perp(s0) > tol_m || perp(s1) > tol_m {
        return None;
    }

    // Project onto r, as fractions of r's length.
    let along = |p: (f64, f64)| (p.0 * r.0 + p.1 * r.1) / (r_len * r_len);
    let (mut t0, mut t1) = (along(s0), along(s1));
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }

    let lo = t0.max(0.0);
    let hi = t1.min(1.0);
    if lo > hi {
        return None; // collinear but disjoint
    }

    let mid = 0.5 * (lo + hi);
    Some(from_local_m(anchor, mid * r.0, mid * r.1))
}
