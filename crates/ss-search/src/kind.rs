//! Route preference presets.
//!
//! | Kind        | α    | Length cap                      |
//! |-------------|------|---------------------------------|
//! | `quickest`  | 1.0  | none                            |
//! | `balanced`  | 0.5  | 1.30 × quickest                 |
//! | `safest`    | 0.0  | 1.30 × quickest                 |
//! | `detour{P}` | 0.0  | (1 + P/100) × quickest          |
//!
//! α blends the per-edge cost: 1 = distance only, 0 = safety only.  Detour
//! percents are limited to {5, 10, 15, 20, 25, 30}.  `balanced` and
//! `safest` carry the implicit 30 % cap so a safety-greedy search cannot
//! wander arbitrarily far.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Allowed detour percentages.
pub const DETOUR_STEPS: [u8; 6] = [5, 10, 15, 20, 25, 30];

/// A client's route preference.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RouteKind {
    Quickest,
    Balanced,
    Safest,
    /// Safest route within the given percentage above the quickest distance.
    Detour(u8),
}

impl RouteKind {
    /// Safety/distance blend factor.
    pub fn alpha(self) -> f64 {
        match self {
            RouteKind::Quickest => 1.0,
            RouteKind::Balanced => 0.5,
            RouteKind::Safest | RouteKind::Detour(_) => 0.0,
        }
    }

    /// Length cap as a fraction of the quickest distance, if any.
    pub fn cap_fraction(self) -> Option<f64> {
        match self {
            RouteKind::Quickest => None,
            RouteKind::Balanced | RouteKind::Safest => Some(1.30),
            RouteKind::Detour(p) => Some(1.0 + p as f64 / 100.0),
        }
    }

    /// The explicit detour percentage, for `detour{P}` kinds only.
    pub fn detour_percent(self) -> Option<u8> {
        match self {
            RouteKind::Detour(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKind::Quickest => write!(f, "quickest"),
            RouteKind::Balanced => write!(f, "balanced"),
            RouteKind::Safest => write!(f, "safest"),
            RouteKind::Detour(p) => write!(f, "detour{p}"),
        }
    }
}

impl FromStr for RouteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "quickest" => Ok(RouteKind::Quickest),
            "balanced" => Ok(RouteKind::Balanced),
            "safest" => Ok(RouteKind::Safest),
            other => {
                let Some(digits) = other.strip_prefix("detour") else {
                    return Err(format!("unknown route kind {other:?}"));
                };
                let p: u8 = digits
                    .parse()
                    .map_err(|_| format!("invalid detour percent {digits:?}"))?;
                if !DETOUR_STEPS.contains(&p) {
                    return Err(format!(
                        "detour percent {p} not in {DETOUR_STEPS:?}"
                    ));
                }
                Ok(RouteKind::Detour(p))
            }
        }
    }
}

impl TryFrom<String> for RouteKind {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RouteKind> for String {
    fn from(k: RouteKind) -> String {
        k.to_string()
    }
}
