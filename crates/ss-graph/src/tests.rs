//! Unit tests for ss-graph.
//!
//! All fixtures are hand-placed street stubs around Franklin Square; no data
//! files are loaded.

#[cfg(test)]
mod helpers {
    use ss_core::{Coord, SegmentId};
    use ss_score::segment::{Quadrant, RoadType, StreetSegment};
    use ss_score::ScoredSegment;
    use ss_spatial::WalkabilityMask;

    pub fn scored(id: u32, points: &[(f64, f64)], road_type: RoadType, safety: u8) -> ScoredSegment {
        ScoredSegment {
            segment: StreetSegment {
                id: SegmentId(id),
                polyline: points.iter().map(|&(la, lo)| Coord::new(la, lo)).collect(),
                street_name: format!("TEST ST {id}"),
                road_type,
                quadrant: Quadrant::NW,
            },
            safety_overall: safety,
            safety_day: safety,
            safety_night: safety,
        }
    }

    /// Mask that marks every polyline endpoint of `segments` walkable.
    pub fn mask_for(segments: &[ScoredSegment]) -> WalkabilityMask {
        let mut m = WalkabilityMask::new();
        for s in segments {
            let first = s.segment.polyline[0];
            let last = *s.segment.polyline.last().unwrap();
            m.insert(first.lat, first.lon);
            m.insert(last.lat, last.lon);
        }
        m
    }
}

#[cfg(test)]
mod assemble {
    use ss_core::quantize::NodeKey;
    use ss_core::Coord;

    use crate::builder::straight_edge_spec;
    use crate::{GraphError, RoutingGraph};

    fn keys_of(specs: &[crate::EdgeSpec]) -> Vec<NodeKey> {
        specs.iter().flat_map(|s| [s.a, s.b]).collect()
    }

    #[test]
    fn edge_length_matches_haversine_to_a_centimetre() {
        let a = Coord::new(38.9000, -77.0300);
        let b = Coord::new(38.9021, -77.0287);
        let specs = vec![straight_edge_spec(a, b, 80)];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();

        let e = g.edge(ss_core::EdgeId(0));
        let src = g.node(e.source).coord;
        let tgt = g.node(e.target).coord;
        assert!((e.length_m - src.distance_m(tgt)).abs() < 0.01);
    }

    #[test]
    fn canonical_direction_and_bidirectional_lookup() {
        let a = Coord::new(38.9020, -77.0300); // higher latitude — not canonical first
        let b = Coord::new(38.9000, -77.0300);
        let specs = vec![straight_edge_spec(a, b, 60)];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();

        let e = g.edge(ss_core::EdgeId(0));
        assert!(g.node(e.source).key < g.node(e.target).key);

        let fwd = g.edge_between(e.source, e.target);
        let rev = g.edge_between(e.target, e.source);
        assert_eq!(fwd, Some(ss_core::EdgeId(0)));
        assert_eq!(fwd, rev);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let p = |la, lo| Coord::new(la, lo);
        let specs = vec![
            straight_edge_spec(p(38.900, -77.030), p(38.902, -77.030), 70),
            straight_edge_spec(p(38.902, -77.030), p(38.902, -77.028), 70),
            straight_edge_spec(p(38.900, -77.030), p(38.902, -77.028), 70),
        ];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();

        for n in 0..g.node_count() {
            let n = ss_core::NodeId(n as u32);
            for &m in g.neighbors(n) {
                assert!(g.neighbors(m).contains(&n), "{m} missing back-link to {n}");
            }
        }
    }

    #[test]
    fn duplicate_inserts_are_no_ops() {
        let a = Coord::new(38.900, -77.030);
        let b = Coord::new(38.902, -77.030);
        let specs = vec![
            straight_edge_spec(a, b, 70),
            straight_edge_spec(b, a, 30), // reversed duplicate — first wins
        ];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edge(ss_core::EdgeId(0)).safety_score, 70);
    }

    #[test]
    fn unknown_node_key_is_corrupt() {
        let spec = straight_edge_spec(
            Coord::new(38.900, -77.030),
            Coord::new(38.902, -77.030),
            70,
        );
        // Node list omits one endpoint.
        let err = RoutingGraph::assemble(vec![spec.a], vec![spec]).unwrap_err();
        assert!(matches!(err, GraphError::Corrupt(_)));
    }

    #[test]
    fn safety_score_out_of_range_is_corrupt() {
        let spec = straight_edge_spec(
            Coord::new(38.900, -77.030),
            Coord::new(38.902, -77.030),
            0,
        );
        let keys = vec![spec.a, spec.b];
        let err = RoutingGraph::assemble(keys, vec![spec]).unwrap_err();
        assert!(matches!(err, GraphError::Corrupt(_)));
    }

    #[test]
    fn weight_vector_endpoints() {
        let p = |la, lo| Coord::new(la, lo);
        let specs = vec![
            straight_edge_spec(p(38.900, -77.030), p(38.902, -77.030), 100),
            straight_edge_spec(p(38.902, -77.030), p(38.904, -77.030), 1),
        ];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();
        // Safest edge costs 0 safety-metres; most dangerous costs 100.
        let by_score = |s: u8| {
            g.edges()
                .iter()
                .find(|e| e.safety_score == s)
                .unwrap()
                .w_safety
        };
        assert_eq!(by_score(100), 0.0);
        assert_eq!(by_score(1), 100.0);
    }

    #[test]
    fn component_sizes_sorted_descending() {
        let p = |la, lo| Coord::new(la, lo);
        let specs = vec![
            // Component 1: three nodes in a path.
            straight_edge_spec(p(38.900, -77.030), p(38.902, -77.030), 70),
            straight_edge_spec(p(38.902, -77.030), p(38.904, -77.030), 70),
            // Component 2: an isolated pair far away.
            straight_edge_spec(p(38.950, -77.080), p(38.952, -77.080), 70),
        ];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();
        assert_eq!(g.component_sizes(), vec![3, 2]);
    }

    #[test]
    fn snap_to_nearest_node() {
        let a = Coord::new(38.900, -77.030);
        let b = Coord::new(38.902, -77.030);
        let specs = vec![straight_edge_spec(a, b, 70)];
        let g = RoutingGraph::assemble(keys_of(&specs), specs).unwrap();

        let near_a = g.snap_to_node(Coord::new(38.9003, -77.0301)).unwrap();
        assert_eq!(g.node(near_a).key, NodeKey::from_coord(a));
    }
}

#[cfg(test)]
mod builder {
    use ss_core::quantize::NodeKey;
    use ss_core::Coord;
    use ss_score::segment::RoadType;
    use ss_spatial::WalkabilityMask;

    use super::helpers::{mask_for, scored};
    use crate::GraphBuilder;

    #[test]
    fn dense_vertices_from_polyline() {
        let segs = vec![scored(
            0,
            &[(38.900, -77.030), (38.901, -77.030), (38.902, -77.029)],
            RoadType::Street,
            80,
        )];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn coincident_endpoints_share_a_node() {
        let segs = vec![
            scored(0, &[(38.900, -77.030), (38.902, -77.030)], RoadType::Street, 80),
            scored(1, &[(38.902, -77.030), (38.902, -77.028)], RoadType::Avenue, 60),
        ];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();
        assert_eq!(g.node_count(), 3); // shared corner collapses
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn one_walkable_endpoint_keeps_the_segment() {
        let segs = vec![scored(
            0,
            &[(38.900, -77.030), (38.902, -77.030)],
            RoadType::Street,
            80,
        )];
        let mut mask = WalkabilityMask::new();
        mask.insert(38.900, -77.030); // only the south endpoint
        let g = GraphBuilder::new().build(&segs, &mask).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn unwalkable_segments_are_dropped() {
        let segs = vec![scored(
            0,
            &[(38.900, -77.030), (38.902, -77.030)],
            RoadType::Street,
            80,
        )];
        let g = GraphBuilder::new().build(&segs, &WalkabilityMask::new()).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn alleys_are_dropped() {
        let segs = vec![
            scored(0, &[(38.900, -77.030), (38.902, -77.030)], RoadType::Street, 80),
            scored(1, &[(38.900, -77.028), (38.902, -77.028)], RoadType::Alley, 80),
        ];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn crossing_streets_split_into_four_edges() {
        // A north-south street and an east-west street crossing mid-block
        // with no shared vertex in the source data.
        let segs = vec![
            scored(0, &[(38.900, -77.030), (38.902, -77.030)], RoadType::Street, 80),
            scored(1, &[(38.901, -77.031), (38.901, -77.029)], RoadType::Avenue, 40),
        ];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();

        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 4);

        let crossing = g
            .node_by_key(NodeKey::from_coord(Coord::new(38.901, -77.030)))
            .expect("crossing node exists");
        assert_eq!(g.neighbors(crossing).len(), 4);
    }

    #[test]
    fn split_children_inherit_parent_safety() {
        let segs = vec![
            scored(0, &[(38.900, -77.030), (38.902, -77.030)], RoadType::Street, 80),
            scored(1, &[(38.901, -77.031), (38.901, -77.029)], RoadType::Avenue, 40),
        ];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();

        let crossing = g
            .node_by_key(NodeKey::from_coord(Coord::new(38.901, -77.030)))
            .unwrap();
        let mut scores: Vec<u8> = g
            .neighbors(crossing)
            .iter()
            .map(|&n| {
                let e = g.edge_between(crossing, n).unwrap();
                g.edge(e).safety_score
            })
            .collect();
        scores.sort_unstable();
        assert_eq!(scores, vec![40, 40, 80, 80]);
    }

    #[test]
    fn t_junction_splits_only_the_through_street() {
        // The avenue dead-ends onto the street's interior.
        let segs = vec![
            scored(0, &[(38.900, -77.030), (38.902, -77.030)], RoadType::Street, 80),
            scored(1, &[(38.901, -77.030), (38.901, -77.029)], RoadType::Avenue, 40),
        ];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();

        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);

        let junction = g
            .node_by_key(NodeKey::from_coord(Coord::new(38.901, -77.030)))
            .unwrap();
        assert_eq!(g.neighbors(junction).len(), 3);
    }

    #[test]
    fn missing_score_falls_back_to_midpoint() {
        let segs = vec![scored(
            0,
            &[(38.900, -77.030), (38.902, -77.030)],
            RoadType::Street,
            0, // no score recorded
        )];
        let g = GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap();
        assert_eq!(g.edge(ss_core::EdgeId(0)).safety_score, 50);
    }
}

#[cfg(test)]
mod artifacts {
    use ss_score::segment::RoadType;

    use super::helpers::{mask_for, scored};
    use crate::artifacts::{load_graph, save_graph, ADJACENCY_FILE, EDGE_LOOKUP_FILE};
    use crate::{GraphBuilder, GraphError, RoutingGraph};

    fn fixture_graph() -> RoutingGraph {
        let segs = vec![
            scored(0, &[(38.900, -77.030), (38.902, -77.030)], RoadType::Street, 80),
            scored(1, &[(38.901, -77.031), (38.901, -77.029)], RoadType::Avenue, 40),
            scored(2, &[(38.902, -77.030), (38.902, -77.028)], RoadType::Street, 65),
        ];
        GraphBuilder::new().build(&segs, &mask_for(&segs)).unwrap()
    }

    #[test]
    fn save_load_round_trip_is_byte_identical() {
        let g = fixture_graph();
        let dir1 = tempfile::tempdir().unwrap();
        let dir2 = tempfile::tempdir().unwrap();

        save_graph(dir1.path(), &g).unwrap();
        let reloaded = load_graph(dir1.path()).unwrap();
        assert_eq!(reloaded.node_count(), g.node_count());
        assert_eq!(reloaded.edge_count(), g.edge_count());

        save_graph(dir2.path(), &reloaded).unwrap();
        for name in [
            crate::artifacts::NODES_FILE,
            crate::artifacts::EDGES_FILE,
            ADJACENCY_FILE,
            EDGE_LOOKUP_FILE,
        ] {
            let a = std::fs::read(dir1.path().join(name)).unwrap();
            let b = std::fs::read(dir2.path().join(name)).unwrap();
            assert_eq!(a, b, "{name} differs after round trip");
        }
    }

    #[test]
    fn missing_artifact_is_reported() {
        let g = fixture_graph();
        let dir = tempfile::tempdir().unwrap();
        save_graph(dir.path(), &g).unwrap();
        std::fs::remove_file(dir.path().join(EDGE_LOOKUP_FILE)).unwrap();

        let err = load_graph(dir.path()).unwrap_err();
        assert!(matches!(err, GraphError::MissingArtifact { .. }));
    }

    #[test]
    fn tampered_adjacency_is_corrupt() {
        let g = fixture_graph();
        let dir = tempfile::tempdir().unwrap();
        save_graph(dir.path(), &g).unwrap();

        // Duplicate the last adjacency row — count and uniqueness both break.
        let path = dir.path().join(ADJACENCY_FILE);
        let mut text = std::fs::read_to_string(&path).unwrap();
        let last = text.trim_end().rsplit('\n').next().unwrap().to_string();
        text.push_str(&last);
        text.push('\n');
        std::fs::write(&path, text).unwrap();

        let err = load_graph(dir.path()).unwrap_err();
        assert!(matches!(err, GraphError::Corrupt(_)));
    }
}
