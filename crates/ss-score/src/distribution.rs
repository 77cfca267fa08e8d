//! Log/IQR normalization of raw crime-weight accumulations.
//!
//! Raw per-segment sums span several orders of magnitude and carry heavy
//! outliers (nightlife corridors).  Normalization therefore works on
//! `ln(raw + 1)` and clips with Tukey fences before the linear map:
//!
//! 1. Collect `L = ln(raw + 1)` over segments with `raw > 0` only.
//! 2. `lower = Q1 − 1.5·IQR`, `upper = Q3 + 1.5·IQR`.
//! 3. `raw == 0` → score **100** (no recorded crime pressure at all).
//!    Otherwise clamp `L` into `[lower, upper]` and map linearly to
//!    **99** (at `lower`) … **1** (at `upper`), rounded to an integer.
//!
//! Higher = safer, always.

/// Quartile summary of the non-zero log-score population, frozen once per
/// scoring run and reused for every segment (and for both day/night buckets
/// via their own instances).
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreDistribution {
    /// Number of non-zero raw scores observed.
    pub count: usize,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ScoreDistribution {
    /// Build from raw accumulated weights (zeros are skipped).
    pub fn from_raw_scores<I: IntoIterator<Item = f64>>(raw: I) -> Self {
        let mut logs: Vec<f64> = raw
            .into_iter()
            .filter(|&r| r > 0.0)
            .map(|r| (r + 1.0).ln())
            .collect();
        logs.sort_unstable_by(f64::total_cmp);

        if logs.is_empty() {
            return Self {
                count: 0,
                q1: 0.0,
                q3: 0.0,
                iqr: 0.0,
                lower_bound: 0.0,
                upper_bound: 0.0,
            };
        }

        let q1 = percentile(&logs, 0.25);
        let q3 = percentile(&logs, 0.75);
        let iqr = q3 - q1;
        Self {
            count: logs.len(),
            q1,
            q3,
            iqr,
            lower_bound: q1 - 1.5 * iqr,
            upper_bound: q3 + 1.5 * iqr,
        }
    }

    /// Map a raw accumulated weight to the 1–100 safety scale.
    pub fn normalize(&self, raw: f64) -> u8 {
        if raw <= 0.0 {
            return 100;
        }
        // Degenerate populations (empty, or a single repeated value) have no
        // spread to map across; everything sits at the midpoint.
        let span = self.upper_bound - self.lower_bound;
        if self.count == 0 || span <= 0.0 {
            return 50;
        }

        let l = (raw + 1.0).ln().clamp(self.lower_bound, self.upper_bound);
        let t = (l - self.lower_bound) / span; // 0 at lower, 1 at upper
        let score = 99.0 - t * 98.0;
        (score.round() as u8).clamp(1, 99)
    }
}

/// Linear-interpolated percentile of an ascending-sorted slice, `p ∈ [0, 1]`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
