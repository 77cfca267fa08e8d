//! Street segment model, polyline codec, and CSV I/O.
//!
//! # Polyline encoding
//!
//! Polylines serialize as integer microdegrees, points separated by `;`:
//!
//! ```text
//! 38897700 -77036500;38898100 -77036200
//! ```
//!
//! Coordinates are quantized once at ingest; the codec round-trips exactly,
//! which is what makes the `scored-segments` artifact byte-stable.
//!
//! # CSV formats
//!
//! Input segments (`segments.csv`):
//!
//! ```csv
//! id,street_name,road_type,quadrant,polyline
//! 0,17TH ST,street,NW,38897700 -77038800;38899900 -77038800
//! ```
//!
//! Scored artifact (`scored-segments`): the same columns plus
//! `safety_overall,safety_day,safety_night`, rows sorted by id.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use ss_core::quantize::NodeKey;
use ss_core::{Coord, SegmentId};

use crate::{ScoreError, ScoreResult};

// ── RoadType ──────────────────────────────────────────────────────────────────

/// Centerline classification from the street corpus.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadType {
    Street,
    Avenue,
    Path,
    Alley,
    Driveway,
    Service,
    Private,
}

impl RoadType {
    /// `true` for types a pedestrian route may use.  Alleys, driveways,
    /// service ways, and private roads are stripped before scoring.
    #[inline]
    pub fn is_routable(self) -> bool {
        matches!(self, RoadType::Street | RoadType::Avenue | RoadType::Path)
    }

    pub fn parse(s: &str) -> Option<RoadType> {
        match s.trim().to_ascii_lowercase().as_str() {
            "street"   => Some(RoadType::Street),
            "avenue"   => Some(RoadType::Avenue),
            "path"     => Some(RoadType::Path),
            "alley"    => Some(RoadType::Alley),
            "driveway" => Some(RoadType::Driveway),
            "service"  => Some(RoadType::Service),
            "private"  => Some(RoadType::Private),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadType::Street   => "street",
            RoadType::Avenue   => "avenue",
            RoadType::Path     => "path",
            RoadType::Alley    => "alley",
            RoadType::Driveway => "driveway",
            RoadType::Service  => "service",
            RoadType::Private  => "private",
        }
    }
}

// ── Quadrant ──────────────────────────────────────────────────────────────────

/// DC address quadrant.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Quadrant {
    NW,
    NE,
    SW,
    SE,
}

impl Quadrant {
    pub fn parse(s: &str) -> Option<Quadrant> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NW" => Some(Quadrant::NW),
            "NE" => Some(Quadrant::NE),
            "SW" => Some(Quadrant::SW),
            "SE" => Some(Quadrant::SE),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::NW => "NW",
            Quadrant::NE => "NE",
            Quadrant::SW => "SW",
            Quadrant::SE => "SE",
        }
    }
}

// ── StreetSegment ─────────────────────────────────────────────────────────────

/// An input street centerline.  Immutable after ingest.
#[derive(Clone, Debug, PartialEq)]
pub struct StreetSegment {
    pub id: SegmentId,
    pub polyline: Vec<Coord>,
    pub street_name: String,
    pub road_type: RoadType,
    pub quadrant: Quadrant,
}

impl StreetSegment {
    /// Vertex centroid — the point indexed by the scoring grid.
    pub fn center(&self) -> Coord {
        let n = self.polyline.len() as f64;
        let (lat, lon) = self
            .polyline
            .iter()
            .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
        Coord::new(lat / n, lon / n)
    }

    /// Total polyline length in metres.
    pub fn length_m(&self) -> f64 {
        self.polyline
            .windows(2)
            .map(|w| w[0].distance_m(w[1]))
            .sum()
    }
}

// ── ScoredSegment ─────────────────────────────────────────────────────────────

/// A street segment with normalized safety scores.  Higher = safer.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredSegment {
    pub segment: StreetSegment,
    pub safety_overall: u8,
    pub safety_day: u8,
    pub safety_night: u8,
}

// ── Polyline codec ────────────────────────────────────────────────────────────

/// Encode a polyline as `lat_udeg lon_udeg;…` (integer microdegrees).
pub fn encode_polyline(points: &[Coord]) -> String {
    points
        .iter()
        .map(|p| {
            let k = NodeKey::from_coord(*p);
            format!("{} {}", k.lat_udeg, k.lon_udeg)
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Decode a polyline encoded by [`encode_polyline`].
pub fn decode_polyline(s: &str) -> Result<Vec<Coord>, String> {
    let mut out = Vec::new();
    for pair in s.split(';') {
        let mut it = pair.split_whitespace();
        let lat_udeg: i64 = it
            .next()
            .ok_or_else(|| format!("empty polyline point in {s:?}"))?
            .parse()
            .map_err(|e| format!("bad latitude in {pair:?}: {e}"))?;
        let lon_udeg: i64 = it
            .next()
            .ok_or_else(|| format!("missing longitude in {pair:?}"))?
            .parse()
            .map_err(|e| format!("bad longitude in {pair:?}: {e}"))?;
        out.push(NodeKey { lat_udeg, lon_udeg }.to_coord());
    }
    if out.len() < 2 {
        return Err(format!("polyline has {} point(s); need at least 2", out.len()));
    }
    Ok(out)
}

// ── CSV I/O ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SegmentRecord {
    id: u32,
    street_name: String,
    road_type: String,
    quadrant: String,
    polyline: String,
}

#[derive(Deserialize)]
struct ScoredRecord {
    id: u32,
    street_name: String,
    road_type: String,
    quadrant: String,
    safety_overall: u8,
    safety_day: u8,
    safety_night: u8,
    polyline: String,
}

/// Load raw input segments from CSV.
pub fn load_segments_csv(path: &Path) -> ScoreResult<Vec<StreetSegment>> {
    let file = std::fs::File::open(path)?;
    load_segments_reader(file)
}

pub fn load_segments_reader<R: Read>(reader: R) -> ScoreResult<Vec<StreetSegment>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (i, result) in csv_reader.deserialize::<SegmentRecord>().enumerate() {
        let row = i + 1;
        let rec = result.map_err(|e| ScoreError::Parse {
            row,
            message: e.to_string(),
        })?;
        out.push(parse_segment(row, rec)?);
    }
    Ok(out)
}

fn parse_segment(row: usize, rec: SegmentRecord) -> ScoreResult<StreetSegment> {
    let road_type = RoadType::parse(&rec.road_type).ok_or_else(|| ScoreError::Parse {
        row,
        message: format!("unknown road type {:?}", rec.road_type),
    })?;
    let quadrant = Quadrant::parse(&rec.quadrant).ok_or_else(|| ScoreError::Parse {
        row,
        message: format!("unknown quadrant {:?}", rec.quadrant),
    })?;
    let polyline = decode_polyline(&rec.polyline)
        .map_err(|message| ScoreError::Parse { row, message })?;

    Ok(StreetSegment {
        id: SegmentId(rec.id),
        polyline,
        street_name: rec.street_name,
        road_type,
        quadrant,
    })
}

/// Load the `scored-segments` artifact.
pub fn load_scored_csv(path: &Path) -> ScoreResult<Vec<ScoredSegment>> {
    let file = std::fs::File::open(path)?;
    load_scored_reader(file)
}

pub fn load_scored_reader<R: Read>(reader: R) -> ScoreResult<Vec<ScoredSegment>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut out = Vec::new();
    for (i, result) in csv_reader.deserialize::<ScoredRecord>().enumerate() {
        let row = i + 1;
        let rec = result.map_err(|e| ScoreError::Parse {
            row,
            message: e.to_string(),
        })?;
        let segment = parse_segment(
            row,
            SegmentRecord {
                id: rec.id,
                street_name: rec.street_name,
                road_type: rec.road_type,
                quadrant: rec.quadrant,
                polyline: rec.polyline,
            },
        )?;
        out.push(ScoredSegment {
            segment,
            safety_overall: rec.safety_overall,
            safety_day: rec.safety_day,
            safety_night: rec.safety_night,
        });
    }
    Ok(out)
}

/// Write the `scored-segments` artifact — rows sorted by segment id so
/// identical inputs produce byte-identical files.
pub fn save_scored_csv(path: &Path, scored: &[ScoredSegment]) -> ScoreResult<()> {
    let file = std::fs::File::create(path)?;
    save_scored_writer(file, scored)
}

pub fn save_scored_writer<W: Write>(writer: W, scored: &[ScoredSegment]) -> ScoreResult<()> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record([
        "id",
        "street_name",
        "road_type",
        "quadrant",
        "safety_overall",
        "safety_day",
        "safety_night",
        "polyline",
    ])?;

    let mut rows: Vec<&ScoredSegment> = scored.iter().collect();
    rows.sort_unstable_by_key(|s| s.segment.id);

    for s in rows {
        w.write_record(&[
            s.segment.id.0.to_string(),
            s.segment.street_name.clone(),
            s.segment.road_type.as_str().to_string(),
            s.segment.quadrant.as_str().to_string(),
            s.safety_overall.to_string(),
            s.safety_day.to_string(),
            s.safety_night.to_string(),
            encode_polyline(&s.segment.polyline),
        ])?;
    }
    w.flush()?;
    Ok(())
}
