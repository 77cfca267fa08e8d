//! Weighted distance-decay accumulation of incidents onto segments.
//!
//! # Pipeline
//!
//! 1. Drop non-routable segments (alleys, driveways, service/private ways).
//! 2. Index the survivors' centres in a 0.002° [`SpatialGrid`].
//! 3. For each incident, weight by offense severity and recency, query the
//!    grid for segments within 200 m, and add `w · exp(−d / 40)` to each
//!    candidate's overall bucket plus its day or night bucket.
//! 4. Normalize each bucket with its own [`ScoreDistribution`].
//!
//! Accumulation is additive over an unordered incident set, so scores are
//! invariant under incident processing order (exactly so in the serial
//! build; the `parallel` feature may perturb the last ulp of the f64 sums).

use log::info;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ss_spatial::grid::{SpatialGrid, SEGMENT_CELL_DEG};

use ss_core::{Coord, SegmentId};

use crate::distribution::ScoreDistribution;
use crate::incident::CrimeIncident;
use crate::segment::{ScoredSegment, StreetSegment};

// ── ScorerConfig ──────────────────────────────────────────────────────────────

/// Tunables of the scoring stage.
#[derive(Clone, Debug)]
pub struct ScorerConfig {
    /// Incidents farther than this from a segment centre contribute nothing.
    pub base_radius_m: f64,

    /// First year of the incident feed; older incidents floor at half weight.
    pub year_min: u16,

    /// Current (most recent) feed year; incidents from it get full weight.
    pub year_current: u16,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            base_radius_m: 200.0,
            year_min: 2019,
            year_current: 2025,
        }
    }
}

impl ScorerConfig {
    /// Exponential decay denominator: one fifth of the base radius.
    #[inline]
    pub fn decay_denom_m(&self) -> f64 {
        self.base_radius_m / 5.0
    }

    /// Recency multiplier in [0.5, 1.0].
    pub fn temporal_weight(&self, year: u16) -> f64 {
        let span = (self.year_current - self.year_min).max(1) as f64;
        let t = (year as f64 - self.year_min as f64) / span;
        t.clamp(0.5, 1.0)
    }
}

// ── Accumulator ───────────────────────────────────────────────────────────────

/// Per-segment weighted sums, indexed in lockstep with the filtered segment
/// list.
struct Buckets {
    overall: Vec<f64>,
    day: Vec<f64>,
    night: Vec<f64>,
}

impl Buckets {
    fn zeroed(n: usize) -> Self {
        Self {
            overall: vec![0.0; n],
            day: vec![0.0; n],
            night: vec![0.0; n],
        }
    }

    #[cfg(feature = "parallel")]
    fn merge(mut self, other: Buckets) -> Buckets {
        for i in 0..self.overall.len() {
            self.overall[i] += other.overall[i];
            self.day[i] += other.day[i];
            self.night[i] += other.night[i];
        }
        self
    }
}

// ── SafetyScorer ──────────────────────────────────────────────────────────────

/// The offline crime-to-segment scoring stage.
pub struct SafetyScorer {
    config: ScorerConfig,
}

impl SafetyScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Score `segments` against `incidents`.
    ///
    /// Non-routable segments are dropped, not scored.  The returned list
    /// preserves the input order of the survivors.
    pub fn score(
        &self,
        segments: Vec<StreetSegment>,
        incidents: &[CrimeIncident],
    ) -> Vec<ScoredSegment> {
        let total_in = segments.len();
        let segments: Vec<StreetSegment> = segments
            .into_iter()
            .filter(|s| s.road_type.is_routable())
            .collect();
        info!(
            "scoring {} routable segments ({} dropped) against {} incidents",
            segments.len(),
            total_in - segments.len(),
            incidents.len()
        );

        let centers: Vec<Coord> = segments.iter().map(StreetSegment::center).collect();

        let mut grid: SpatialGrid<SegmentId> = SpatialGrid::new(SEGMENT_CELL_DEG);
        for (i, &c) in centers.iter().enumerate() {
            // Grid payload is the *index* into the filtered list, not the
            // input segment id.
            grid.insert(c, SegmentId(i as u32));
        }

        let buckets = self.accumulate(&grid, &centers, incidents, segments.len());

        // One distribution per bucket; each is frozen before any segment is
        // normalized.
        let dist_overall = ScoreDistribution::from_raw_scores(buckets.overall.iter().copied());
        let dist_day = ScoreDistribution::from_raw_scores(buckets.day.iter().copied());
        let dist_night = ScoreDistribution::from_raw_scores(buckets.night.iter().copied());
        info!(
            "normalization fences (overall): [{:.3}, {:.3}] over {} non-zero segments",
            dist_overall.lower_bound, dist_overall.upper_bound, dist_overall.count
        );

        segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| ScoredSegment {
                segment,
                safety_overall: dist_overall.normalize(buckets.overall[i]),
                safety_day: dist_day.normalize(buckets.day[i]),
                safety_night: dist_night.normalize(buckets.night[i]),
            })
            .collect()
    }

    /// Contribution of one incident to one segment centre at distance `d_m`,
    /// or `None` beyond the base radius.
    fn contribution(&self, incident: &CrimeIncident, d_m: f64) -> Option<f64> {
        if d_m > self.config.base_radius_m {
            return None;
        }
        let w = incident.offense.base_weight() * self.config.temporal_weight(incident.year);
        Some(w * (-d_m / self.config.decay_denom_m()).exp())
    }

    #[cfg(not(feature = "parallel"))]
    fn accumulate(
        &self,
        grid: &SpatialGrid<SegmentId>,
        centers: &[Coord],
        incidents: &[CrimeIncident],
        n: usize,
    ) -> Buckets {
        let mut buckets = Buckets::zeroed(n);
        for incident in incidents {
            self.apply(grid, centers, incident, &mut buckets);
        }
        buckets
    }

    #[cfg(feature = "parallel")]
    fn accumulate(
        &self,
        grid: &SpatialGrid<SegmentId>,
        centers: &[Coord],
        incidents: &[CrimeIncident],
        n: usize,
    ) -> Buckets {
        incidents
            .par_iter()
            .fold(
                || Buckets::zeroed(n),
                |mut buckets, incident| {
                    self.apply(grid, centers, incident, &mut buckets);
                    buckets
                },
            )
            .reduce(|| Buckets::zeroed(n), Buckets::merge)
    }

    fn apply(
        &self,
        grid: &SpatialGrid<SegmentId>,
        centers: &[Coord],
        incident: &CrimeIncident,
        buckets: &mut Buckets,
    ) {
        use crate::incident::TimeOfDay;

        let at = incident.coord();
        for idx in grid.query_radius(at, self.config.base_radius_m) {
            let i = idx.index();
            let d = at.distance_m(centers[i]);
            if let Some(c) = self.contribution(incident, d) {
                buckets.overall[i] += c;
                match incident.time_of_day {
                    TimeOfDay::Day => buckets.day[i] += c,
                    TimeOfDay::Night => buckets.night[i] += c,
                }
            }
        }
    }
}
