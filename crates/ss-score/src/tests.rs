//! Unit tests for ss-score.
//!
//! Fixtures are tiny hand-placed street grids around the Federal Triangle so
//! distances are realistic without loading any data files.

#[cfg(test)]
mod helpers {
    use ss_core::{Coord, SegmentId};

    use crate::incident::{CrimeIncident, OffenseKind, TimeOfDay};
    use crate::segment::{Quadrant, RoadType, StreetSegment};

    /// Straight two-point segment centred on `(lat, lon)`, running ~200 m
    /// north-south.  Vertices are snapped to the 1e-6° ingest lattice, as
    /// the real extractor does.
    pub fn seg(id: u32, lat: f64, lon: f64, road_type: RoadType) -> StreetSegment {
        let snap = |la: f64, lo: f64| {
            ss_core::quantize::NodeKey::from_coord(Coord::new(la, lo)).to_coord()
        };
        StreetSegment {
            id: SegmentId(id),
            polyline: vec![snap(lat - 0.0009, lon), snap(lat + 0.0009, lon)],
            street_name: format!("TEST ST {id}"),
            road_type,
            quadrant: Quadrant::NW,
        }
    }

    pub fn incident(lat: f64, lon: f64, offense: OffenseKind, year: u16) -> CrimeIncident {
        CrimeIncident {
            lat,
            lon,
            offense,
            year,
            time_of_day: TimeOfDay::Night,
        }
    }
}

#[cfg(test)]
mod offense {
    use crate::incident::{OffenseKind, TimeOfDay};

    #[test]
    fn homicide_is_heaviest() {
        let all = [
            OffenseKind::SexAbuse,
            OffenseKind::AssaultDangerousWeapon,
            OffenseKind::Robbery,
            OffenseKind::Burglary,
            OffenseKind::Arson,
            OffenseKind::MotorVehicleTheft,
            OffenseKind::TheftFromAuto,
            OffenseKind::TheftOther,
        ];
        for kind in all {
            assert!(OffenseKind::Homicide.base_weight() > kind.base_weight());
        }
    }

    #[test]
    fn parse_open_data_labels() {
        assert_eq!(OffenseKind::parse("HOMICIDE"), Some(OffenseKind::Homicide));
        assert_eq!(
            OffenseKind::parse("assault w/dangerous weapon"),
            Some(OffenseKind::AssaultDangerousWeapon)
        );
        assert_eq!(OffenseKind::parse("THEFT F/AUTO"), Some(OffenseKind::TheftFromAuto));
        assert_eq!(OffenseKind::parse("JAYWALKING"), None);
    }

    #[test]
    fn shift_buckets() {
        assert_eq!(TimeOfDay::parse("DAY"), Some(TimeOfDay::Day));
        assert_eq!(TimeOfDay::parse("EVENING"), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::parse("MIDNIGHT"), Some(TimeOfDay::Night));
        assert_eq!(TimeOfDay::parse("noonish"), None);
    }
}

#[cfg(test)]
mod temporal {
    use crate::scorer::ScorerConfig;

    #[test]
    fn recent_years_full_weight() {
        let c = ScorerConfig::default();
        assert_eq!(c.temporal_weight(c.year_current), 1.0);
    }

    #[test]
    fn oldest_year_floors_at_half() {
        let c = ScorerConfig::default();
        assert_eq!(c.temporal_weight(c.year_min), 0.5);
        // Even older data never drops below the floor.
        assert_eq!(c.temporal_weight(c.year_min - 3), 0.5);
    }

    #[test]
    fn weight_is_monotone_in_year() {
        let c = ScorerConfig::default();
        let mut prev = 0.0;
        for year in c.year_min..=c.year_current {
            let w = c.temporal_weight(year);
            assert!(w >= prev);
            prev = w;
        }
    }
}

#[cfg(test)]
mod distribution {
    use crate::distribution::ScoreDistribution;

    #[test]
    fn zero_raw_is_perfectly_safe() {
        let d = ScoreDistribution::from_raw_scores([3.0, 7.0, 20.0]);
        assert_eq!(d.normalize(0.0), 100);
    }

    #[test]
    fn scores_stay_in_range() {
        let raws = [0.5, 1.0, 4.0, 9.0, 25.0, 120.0, 3_000.0];
        let d = ScoreDistribution::from_raw_scores(raws);
        for r in raws {
            let s = d.normalize(r);
            assert!((1..=99).contains(&s), "raw {r} → {s}");
        }
    }

    #[test]
    fn heavier_raw_is_less_safe() {
        let d = ScoreDistribution::from_raw_scores([2.0, 8.0, 40.0, 200.0]);
        assert!(d.normalize(2.0) > d.normalize(8.0));
        assert!(d.normalize(8.0) > d.normalize(40.0));
        assert!(d.normalize(40.0) > d.normalize(200.0));
    }

    #[test]
    fn outliers_clamp_to_extremes() {
        let d = ScoreDistribution::from_raw_scores([2.0, 8.0, 40.0, 200.0]);
        // Far below the lower fence and far above the upper fence.
        assert_eq!(d.normalize(1e-9), 99);
        assert_eq!(d.normalize(1e12), 1);
    }

    #[test]
    fn degenerate_population_maps_to_midpoint() {
        // One distinct value → zero IQR → no spread to map across.
        let d = ScoreDistribution::from_raw_scores([5.0, 5.0, 5.0]);
        assert_eq!(d.normalize(5.0), 50);
        assert_eq!(d.normalize(0.0), 100);
    }

    #[test]
    fn quartiles_of_known_population() {
        let d = ScoreDistribution::from_raw_scores([1.0_f64, 2.0, 3.0, 4.0, 5.0]);
        // Logs of 2..6: [0.693, 1.099, 1.386, 1.609, 1.792]
        assert_eq!(d.count, 5);
        assert!((d.q1 - 1.099).abs() < 1e-3);
        assert!((d.q3 - 1.609).abs() < 1e-3);
        assert!((d.iqr - 0.511).abs() < 1e-3);
    }
}

#[cfg(test)]
mod scorer {
    use super::helpers::{incident, seg};
    use crate::incident::{CrimeIncident, OffenseKind, TimeOfDay};
    use crate::scorer::{SafetyScorer, ScorerConfig};
    use crate::segment::RoadType;

    #[test]
    fn untouched_segments_score_100() {
        let segments = vec![
            seg(0, 38.900, -77.030, RoadType::Street),
            seg(1, 38.910, -77.030, RoadType::Street), // ~1.1 km north
        ];
        let incidents = vec![incident(38.900, -77.030, OffenseKind::Robbery, 2025)];

        let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &incidents);
        assert_eq!(scored.len(), 2);
        assert!(scored[0].safety_overall < 100);
        assert_eq!(scored[1].safety_overall, 100);
    }

    #[test]
    fn non_routable_segments_are_dropped() {
        let segments = vec![
            seg(0, 38.900, -77.030, RoadType::Street),
            seg(1, 38.901, -77.030, RoadType::Alley),
            seg(2, 38.902, -77.030, RoadType::Driveway),
        ];
        let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &[]);
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].segment.id.0, 0);
    }

    #[test]
    fn no_incidents_means_everything_is_safe() {
        let segments = vec![
            seg(0, 38.900, -77.030, RoadType::Street),
            seg(1, 38.905, -77.030, RoadType::Avenue),
        ];
        let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &[]);
        assert!(scored.iter().all(|s| s.safety_overall == 100));
    }

    #[test]
    fn more_incidents_is_less_safe() {
        // Both segments get hit; segment 0 twice as hard.
        let segments = vec![
            seg(0, 38.900, -77.030, RoadType::Street),
            seg(1, 38.910, -77.030, RoadType::Street),
        ];
        let incidents = vec![
            incident(38.900, -77.030, OffenseKind::Robbery, 2025),
            incident(38.900, -77.030, OffenseKind::Robbery, 2025),
            incident(38.910, -77.030, OffenseKind::Robbery, 2025),
        ];
        let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &incidents);
        assert!(scored[0].safety_overall < scored[1].safety_overall);
    }

    #[test]
    fn order_of_incidents_is_irrelevant() {
        let segments = || {
            vec![
                seg(0, 38.900, -77.030, RoadType::Street),
                seg(1, 38.902, -77.031, RoadType::Street),
            ]
        };
        let mut incidents = vec![
            incident(38.9001, -77.0300, OffenseKind::Robbery, 2024),
            incident(38.9005, -77.0302, OffenseKind::Homicide, 2022),
            incident(38.9019, -77.0309, OffenseKind::TheftOther, 2025),
        ];
        let scorer = SafetyScorer::new(ScorerConfig::default());
        let a = scorer.score(segments(), &incidents);
        incidents.reverse();
        let b = scorer.score(segments(), &incidents);
        assert_eq!(a, b);
    }

    #[test]
    fn decay_favors_distant_segments() {
        // Segment 1 sits ~110 m from the incident, segment 0 right on it;
        // both within the 200 m radius, so both accumulate, but 0 more.
        let segments = vec![
            seg(0, 38.9000, -77.030, RoadType::Street),
            seg(1, 38.9010, -77.030, RoadType::Street),
            seg(2, 38.9100, -77.030, RoadType::Street), // control, untouched
        ];
        let incidents = vec![incident(38.9000, -77.030, OffenseKind::Robbery, 2025)];
        let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &incidents);
        assert!(scored[0].safety_overall < scored[1].safety_overall);
        assert_eq!(scored[2].safety_overall, 100);
    }

    #[test]
    fn night_incident_leaves_day_bucket_clean() {
        let segments = vec![seg(0, 38.900, -77.030, RoadType::Street)];
        let incidents = vec![CrimeIncident {
            lat: 38.900,
            lon: -77.030,
            offense: OffenseKind::Robbery,
            year: 2025,
            time_of_day: TimeOfDay::Night,
        }];
        let scored = SafetyScorer::new(ScorerConfig::default()).score(segments, &incidents);
        assert_eq!(scored[0].safety_day, 100);
        assert!(scored[0].safety_night < 100);
        assert!(scored[0].safety_overall < 100);
    }
}

#[cfg(test)]
mod io {
    use super::helpers::seg;
    use crate::incident::load_incidents_reader;
    use crate::segment::{
        decode_polyline, encode_polyline, load_scored_reader, load_segments_reader,
        save_scored_writer, RoadType, ScoredSegment,
    };
    use crate::ScoreError;

    #[test]
    fn polyline_codec_round_trips_exactly() {
        let s = seg(0, 38.8977, -77.0365, RoadType::Street);
        let text = encode_polyline(&s.polyline);
        let back = decode_polyline(&text).unwrap();
        assert_eq!(back, s.polyline);
    }

    #[test]
    fn polyline_rejects_single_point() {
        assert!(decode_polyline("38897700 -77036500").is_err());
    }

    #[test]
    fn incident_loader_accepts_valid_rows() {
        let csv = "lat,lon,offense,year,shift\n\
                   38.9012,-77.0323,ROBBERY,2024,MIDNIGHT\n\
                   38.8990,-77.0401,THEFT/OTHER,2023,DAY\n";
        let incidents = load_incidents_reader(csv.as_bytes()).unwrap();
        assert_eq!(incidents.len(), 2);
        assert_eq!(incidents[0].year, 2024);
    }

    #[test]
    fn incident_loader_reports_row_number() {
        let csv = "lat,lon,offense,year,shift\n\
                   38.9012,-77.0323,ROBBERY,2024,MIDNIGHT\n\
                   38.8990,-77.0401,LOITERING,2023,DAY\n";
        let err = load_incidents_reader(csv.as_bytes()).unwrap_err();
        match err {
            ScoreError::Parse { row, .. } => assert_eq!(row, 2),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn segment_loader_round_trip() {
        let original = seg(3, 38.8977, -77.0365, RoadType::Avenue);
        let csv = format!(
            "id,street_name,road_type,quadrant,polyline\n3,{},avenue,NW,{}\n",
            original.street_name,
            encode_polyline(&original.polyline)
        );
        let loaded = load_segments_reader(csv.as_bytes()).unwrap();
        assert_eq!(loaded, vec![original]);
    }

    #[test]
    fn scored_artifact_is_byte_stable() {
        let scored: Vec<ScoredSegment> = vec![
            ScoredSegment {
                segment: seg(1, 38.8977, -77.0365, RoadType::Street),
                safety_overall: 73,
                safety_day: 80,
                safety_night: 61,
            },
            ScoredSegment {
                segment: seg(0, 38.8893, -77.0502, RoadType::Avenue),
                safety_overall: 100,
                safety_day: 100,
                safety_night: 100,
            },
        ];

        let mut first = Vec::new();
        save_scored_writer(&mut first, &scored).unwrap();

        let reloaded = load_scored_reader(first.as_slice()).unwrap();
        assert_eq!(reloaded.len(), 2);
        // Writer sorts by id regardless of input order.
        assert_eq!(reloaded[0].segment.id.0, 0);

        let mut second = Vec::new();
        save_scored_writer(&mut second, &reloaded).unwrap();
        assert_eq!(first, second);
    }
}
