//! Crime incident model and CSV loader.
//!
//! # CSV format
//!
//! One row per incident, as exported from the city's open-data portal after
//! typing:
//!
//! ```csv
//! lat,lon,offense,year,shift
//! 38.9012,-77.0323,ROBBERY,2024,NIGHT
//! 38.8990,-77.0401,THEFT/OTHER,2023,DAY
//! ```
//!
//! **`shift`** maps to [`TimeOfDay`]: `DAY` → day; `EVENING` and `MIDNIGHT`
//! → night (plus the literal `NIGHT`).

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ss_core::Coord;

use crate::{ScoreError, ScoreResult};

// ── OffenseKind ───────────────────────────────────────────────────────────────

/// Offense categories carried by the incident feed.
///
/// Each kind has a fixed base weight reflecting its severity for a
/// pedestrian; violent offenses dominate property offenses.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum OffenseKind {
    Homicide,
    SexAbuse,
    AssaultDangerousWeapon,
    Robbery,
    Burglary,
    Arson,
    MotorVehicleTheft,
    TheftFromAuto,
    TheftOther,
}

impl OffenseKind {
    /// Severity weight.  Homicide highest; thefts lowest.
    pub fn base_weight(self) -> f64 {
        match self {
            OffenseKind::Homicide               => 10.0,
            OffenseKind::SexAbuse               => 9.0,
            OffenseKind::AssaultDangerousWeapon => 8.0,
            OffenseKind::Robbery                => 7.0,
            OffenseKind::Burglary               => 5.0,
            OffenseKind::Arson                  => 4.0,
            OffenseKind::MotorVehicleTheft      => 3.0,
            OffenseKind::TheftFromAuto          => 2.0,
            OffenseKind::TheftOther             => 2.0,
        }
    }

    /// Parse the open-data offense label.
    pub fn parse(s: &str) -> Option<OffenseKind> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HOMICIDE"                    => Some(OffenseKind::Homicide),
            "SEX ABUSE"                   => Some(OffenseKind::SexAbuse),
            "ASSAULT W/DANGEROUS WEAPON"  => Some(OffenseKind::AssaultDangerousWeapon),
            "ROBBERY"                     => Some(OffenseKind::Robbery),
            "BURGLARY"                    => Some(OffenseKind::Burglary),
            "ARSON"                       => Some(OffenseKind::Arson),
            "MOTOR VEHICLE THEFT"         => Some(OffenseKind::MotorVehicleTheft),
            "THEFT F/AUTO"                => Some(OffenseKind::TheftFromAuto),
            "THEFT/OTHER"                 => Some(OffenseKind::TheftOther),
            _ => None,
        }
    }
}

// ── TimeOfDay ─────────────────────────────────────────────────────────────────

/// Day/night bucket of an incident.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    /// Parse the open-data `shift` field.
    pub fn parse(s: &str) -> Option<TimeOfDay> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAY" => Some(TimeOfDay::Day),
            "EVENING" | "MIDNIGHT" | "NIGHT" => Some(TimeOfDay::Night),
            _ => None,
        }
    }
}

// ── CrimeIncident ─────────────────────────────────────────────────────────────

/// A single typed crime incident.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CrimeIncident {
    pub lat: f64,
    pub lon: f64,
    pub offense: OffenseKind,
    pub year: u16,
    pub time_of_day: TimeOfDay,
}

impl CrimeIncident {
    #[inline]
    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lon)
    }
}

// ── CSV loader ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct IncidentRecord {
    lat: f64,
    lon: f64,
    offense: String,
    year: u16,
    shift: String,
}

/// Load incidents from a CSV file.
pub fn load_incidents_csv(path: &Path) -> ScoreResult<Vec<CrimeIncident>> {
    let file = std::fs::File::open(path)?;
    load_incidents_reader(file)
}

/// Like [`load_incidents_csv`] but accepts any `Read` source.
///
/// Rows with an unknown offense label, unknown shift, or non-finite
/// coordinates are rejected with the 1-based data row number.
pub fn load_incidents_reader<R: Read>(reader: R) -> ScoreResult<Vec<CrimeIncident>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();

    for (i, result) in csv_reader.deserialize::<IncidentRecord>().enumerate() {
        let row = i + 1;
        let rec = result.map_err(|e| ScoreError::Parse {
            row,
            message: e.to_string(),
        })?;

        if !Coord::new(rec.lat, rec.lon).in_valid_range() {
            return Err(ScoreError::Parse {
                row,
                message: format!("coordinates ({}, {}) out of range", rec.lat, rec.lon),
            });
        }
        let offense = OffenseKind::parse(&rec.offense).ok_or_else(|| ScoreError::Parse {
            row,
            message: format!("unknown offense {:?}", rec.offense),
        })?;
        let time_of_day = TimeOfDay::parse(&rec.shift).ok_or_else(|| ScoreError::Parse {
            row,
            message: format!("unknown shift {:?}", rec.shift),
        })?;

        out.push(CrimeIncident {
            lat: rec.lat,
            lon: rec.lon,
            offense,
            year: rec.year,
            time_of_day,
        });
    }

    Ok(out)
}
