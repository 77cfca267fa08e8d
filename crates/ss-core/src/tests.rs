//! Unit tests for ss-core.
//!
//! Geographic assertions use real DC landmarks so the tolerances reflect the
//! coordinates the engine actually serves.

#[cfg(test)]
mod geo {
    use crate::geo::{
        corridor_width_m, nearest_point_on_segment, point_segment_distance_m,
        segment_intersection, within_ellipse, Coord,
    };

    const WHITE_HOUSE: Coord = Coord { lat: 38.8977, lon: -77.0365 };
    const LINCOLN: Coord = Coord { lat: 38.8893, lon: -77.0502 };

    #[test]
    fn distance_zero_iff_equal() {
        assert_eq!(WHITE_HOUSE.distance_m(WHITE_HOUSE), 0.0);
        assert!(WHITE_HOUSE.distance_m(LINCOLN) > 0.0);
    }

    #[test]
    fn distance_symmetric() {
        let ab = WHITE_HOUSE.distance_m(LINCOLN);
        let ba = LINCOLN.distance_m(WHITE_HOUSE);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn white_house_to_lincoln() {
        // Straight-line distance between the two landmarks is ~1.5 km.
        let d = WHITE_HOUSE.distance_m(LINCOLN);
        assert!((1_400.0..1_600.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_latitude() {
        let a = Coord::new(38.0, -77.0);
        let b = Coord::new(39.0, -77.0);
        // One degree of latitude ≈ 111.2 km.
        let d = a.distance_m(b);
        assert!((110_000.0..112_500.0).contains(&d), "got {d}");
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = Coord::new(38.9, -77.0);
        assert!((origin.bearing_deg(Coord::new(39.0, -77.0)) - 0.0).abs() < 0.5); // north
        assert!((origin.bearing_deg(Coord::new(38.8, -77.0)) - 180.0).abs() < 0.5); // south
        assert!((origin.bearing_deg(Coord::new(38.9, -76.9)) - 90.0).abs() < 0.5); // east
        assert!((origin.bearing_deg(Coord::new(38.9, -77.1)) - 270.0).abs() < 0.5); // west
    }

    #[test]
    fn bearing_in_range() {
        for &target in &[LINCOLN, Coord::new(38.99, -77.11), Coord::new(38.80, -76.95)] {
            let b = WHITE_HOUSE.bearing_deg(target);
            assert!((0.0..360.0).contains(&b), "bearing {b} out of range");
        }
    }

    #[test]
    fn destination_round_trip() {
        let d = WHITE_HOUSE.destination(73.0, 850.0);
        assert!((WHITE_HOUSE.distance_m(d) - 850.0).abs() < 0.5);
        assert!((WHITE_HOUSE.bearing_deg(d) - 73.0).abs() < 0.1);
    }

    #[test]
    fn corridor_width_floor() {
        assert_eq!(corridor_width_m(100.0, 0.30, 200.0), 200.0); // floor wins
        assert_eq!(corridor_width_m(1_000.0, 0.30, 200.0), 300.0); // fraction wins
    }

    #[test]
    fn ellipse_contains_foci_and_midline() {
        let w = corridor_width_m(WHITE_HOUSE.distance_m(LINCOLN), 0.30, 200.0);
        assert!(within_ellipse(WHITE_HOUSE, WHITE_HOUSE, LINCOLN, w));
        assert!(within_ellipse(LINCOLN, WHITE_HOUSE, LINCOLN, w));
        let mid = Coord::new(
            0.5 * (WHITE_HOUSE.lat + LINCOLN.lat),
            0.5 * (WHITE_HOUSE.lon + LINCOLN.lon),
        );
        assert!(within_ellipse(mid, WHITE_HOUSE, LINCOLN, w));
    }

    #[test]
    fn ellipse_excludes_far_points() {
        let w = corridor_width_m(WHITE_HOUSE.distance_m(LINCOLN), 0.30, 200.0);
        // The Capitol is ~2.5 km east of the corridor axis.
        let capitol = Coord::new(38.8899, -77.0091);
        assert!(!within_ellipse(capitol, WHITE_HOUSE, LINCOLN, w));
    }

    #[test]
    fn projection_interior() {
        let a = Coord::new(38.90, -77.04);
        let b = Coord::new(38.90, -77.02);
        let p = Coord::new(38.905, -77.03); // due north of the midpoint
        let q = nearest_point_on_segment(p, a, b);
        assert!((q.lat - 38.90).abs() < 1e-6);
        assert!((q.lon - (-77.03)).abs() < 1e-4);
    }

    #[test]
    fn projection_clamps_to_endpoints() {
        let a = Coord::new(38.90, -77.04);
        let b = Coord::new(38.90, -77.02);
        let p = Coord::new(38.90, -77.10); // far west of a
        let q = nearest_point_on_segment(p, a, b);
        assert!(q.distance_m(a) < 0.01);
    }

    #[test]
    fn projection_degenerate_segment() {
        let a = Coord::new(38.90, -77.04);
        let p = Coord::new(38.95, -77.00);
        assert_eq!(nearest_point_on_segment(p, a, a), a);
    }

    #[test]
    fn point_segment_distance() {
        let a = Coord::new(38.90, -77.04);
        let b = Coord::new(38.90, -77.02);
        let p = Coord::new(38.901, -77.03); // ~111 m north of the segment
        let d = point_segment_distance_m(p, a, b);
        assert!((100.0..125.0).contains(&d), "got {d}");
    }

    #[test]
    fn crossing_segments_intersect() {
        // A north-south street crossing an east-west street mid-block.
        let p = segment_intersection(
            Coord::new(38.900, -77.030),
            Coord::new(38.902, -77.030),
            Coord::new(38.901, -77.031),
            Coord::new(38.901, -77.029),
            1.0,
        )
        .expect("segments cross");
        assert!((p.lat - 38.901).abs() < 1e-5);
        assert!((p.lon - (-77.030)).abs() < 1e-5);
    }

    #[test]
    fn disjoint_segments_do_not_intersect() {
        let p = segment_intersection(
            Coord::new(38.900, -77.030),
            Coord::new(38.902, -77.030),
            Coord::new(38.903, -77.031),
            Coord::new(38.903, -77.029),
            1.0,
        );
        assert!(p.is_none());
    }

    #[test]
    fn parallel_offset_segments_do_not_intersect() {
        // Two north-south streets a full block (~90 m) apart.
        let p = segment_intersection(
            Coord::new(38.900, -77.030),
            Coord::new(38.902, -77.030),
            Coord::new(38.900, -77.029),
            Coord::new(38.902, -77.029),
            1.0,
        );
        assert!(p.is_none());
    }

    #[test]
    fn collinear_overlap_returns_midpoint() {
        // Second segment retraces the upper half of the first.
        let p = segment_intersection(
            Coord::new(38.900, -77.030),
            Coord::new(38.904, -77.030),
            Coord::new(38.902, -77.030),
            Coord::new(38.904, -77.030),
            1.0,
        )
        .expect("overlap");
        // Midpoint of the overlap [38.902, 38.904].
        assert!((p.lat - 38.903).abs() < 1e-5);
    }
}

#[cfg(test)]
mod quantize {
    use crate::geo::Coord;
    use crate::quantize::{MaskKey, NodeKey};

    #[test]
    fn coincident_vertices_collapse() {
        // Within 1e-6° of each other → same key.
        let a = NodeKey::from_coord(Coord::new(38.8977001, -77.0365002));
        let b = NodeKey::from_coord(Coord::new(38.8977004, -77.0364998));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_vertices_stay_distinct() {
        let a = NodeKey::from_coord(Coord::new(38.897700, -77.036500));
        let b = NodeKey::from_coord(Coord::new(38.897702, -77.036500));
        assert_ne!(a, b);
    }

    #[test]
    fn round_trip_within_half_step() {
        let c = Coord::new(38.8893217, -77.0502169);
        let back = NodeKey::from_coord(c).to_coord();
        assert!((back.lat - c.lat).abs() <= 5e-7);
        assert!((back.lon - c.lon).abs() <= 5e-7);
    }

    #[test]
    fn canonical_pair_orders() {
        let a = NodeKey::from_coord(Coord::new(38.90, -77.03));
        let b = NodeKey::from_coord(Coord::new(38.89, -77.02));
        assert_eq!(NodeKey::canonical_pair(a, b), (b, a));
        assert_eq!(NodeKey::canonical_pair(b, a), (b, a));
    }

    #[test]
    fn mask_key_offset() {
        let k = MaskKey::from_lat_lon(38.8977, -77.0365);
        let n = k.offset(1, -1);
        assert_eq!(n.lat_ddeg, k.lat_ddeg + 1);
        assert_eq!(n.lon_ddeg, k.lon_ddeg - 1);
    }
}

#[cfg(test)]
mod bounds {
    use crate::bounds::ServiceArea;
    use crate::geo::Coord;

    #[test]
    fn dc_contains_landmarks() {
        assert!(ServiceArea::DC.contains(Coord::new(38.8977, -77.0365))); // White House
        assert!(ServiceArea::DC.contains(Coord::new(38.8893, -77.0502))); // Lincoln Memorial
    }

    #[test]
    fn rejects_null_island_and_edges() {
        assert!(!ServiceArea::DC.contains(Coord::new(0.0, 0.0)));
        assert!(!ServiceArea::DC.contains(Coord::new(39.1, -77.0))); // north of the line
        assert!(!ServiceArea::DC.contains(Coord::new(38.9, -76.8))); // east of the line
    }
}

#[cfg(test)]
mod config {
    use crate::config::EngineConfig;

    #[test]
    fn defaults_match_documented_values() {
        let c = EngineConfig::default();
        assert_eq!(c.walking_speed_kmh, 5.0);
        assert_eq!(c.corridor_fraction, 0.30);
        assert_eq!(c.corridor_min_m, 200.0);
        assert_eq!(c.search_timeout_ms, 25_000);
        assert_eq!(c.iteration_check_interval, 500);
        assert!(c.alpha_override.is_none());
    }

    #[test]
    fn walking_speed_conversion() {
        let c = EngineConfig::default();
        // 5 km/h ≈ 1.39 m/s
        assert!((c.walking_speed_ms() - 1.3889).abs() < 1e-3);
    }
}
