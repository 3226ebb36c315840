//! Unit tests for wd-spatial.
//!
//! All tests use hand-crafted graphs so they run without any OSM file.

#[cfg(test)]
mod helpers {
    use wd_core::{GeoPoint, NodeId, WayId};
    use crate::{StreetGraph, StreetGraphBuilder};

    /// A small street plan.
    ///
    /// ```text
    ///   1 ── 2 ── 3        "Main Street" (way 100): 1, 2, 3
    ///        │
    ///        4 ── 5        "Cross Street" (way 200): 2, 4, 5
    ///
    ///   9                  isolated node, no way
    /// ```
    pub fn t_junction() -> StreetGraph {
        let mut b = StreetGraphBuilder::new();
        b.add_node(NodeId(1), GeoPoint::new(0.000, 0.000)).unwrap();
        b.add_node(NodeId(2), GeoPoint::new(0.000, 0.001)).unwrap();
        b.add_node(NodeId(3), GeoPoint::new(0.000, 0.002)).unwrap();
        b.add_node(NodeId(4), GeoPoint::new(-0.001, 0.001)).unwrap();
        b.add_node(NodeId(5), GeoPoint::new(-0.001, 0.002)).unwrap();
        b.add_node(NodeId(9), GeoPoint::new(0.010, 0.010)).unwrap();
        b.add_way(WayId(100), vec![NodeId(1), NodeId(2), NodeId(3)], "Main Street", "residential")
            .unwrap();
        b.add_way(WayId(200), vec![NodeId(2), NodeId(4), NodeId(5)], "Cross Street", "service")
            .unwrap();
        b.build().unwrap()
    }
}

// ── Builder & graph structure ─────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use wd_core::{GeoPoint, NodeId, WayId};
    use crate::{GraphError, StreetGraph, StreetGraphBuilder};

    #[test]
    fn empty_build() {
        let graph = StreetGraph::empty();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.way_count(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn counts_and_lookups() {
        let graph = super::helpers::t_junction();
        assert_eq!(graph.node_count(), 6);
        assert_eq!(graph.way_count(), 2);
        assert_eq!(graph.node(NodeId(3)).unwrap().pos, GeoPoint::new(0.0, 0.002));
        assert_eq!(graph.way(WayId(200)).unwrap().name, "Cross Street");
        assert!(graph.node(NodeId(77)).is_none());
        assert!(graph.way(WayId(77)).is_none());
    }

    #[test]
    fn dangling_reference_is_fatal() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_way(WayId(5), vec![NodeId(1), NodeId(2)], "", "").unwrap();
        let err = b.build().unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnknownNode { way: WayId(5), node: NodeId(2) }
        ));
    }

    #[test]
    fn duplicates_rejected() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            b.add_node(NodeId(1), GeoPoint::new(1.0, 1.0)),
            Err(GraphError::DuplicateNode(NodeId(1)))
        ));
        b.add_way(WayId(3), vec![NodeId(1)], "", "").unwrap();
        assert!(matches!(
            b.add_way(WayId(3), vec![NodeId(1)], "", ""),
            Err(GraphError::DuplicateWay(WayId(3)))
        ));
    }
}

// ── Traversal ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod traversal {
    use wd_core::{GeoPoint, NodeId, WayId};
    use crate::StreetGraphBuilder;

    #[test]
    fn ways_through_junction_in_definition_order() {
        let graph = super::helpers::t_junction();
        let ids: Vec<WayId> = graph.ways_through(NodeId(2)).map(|w| w.id).collect();
        assert_eq!(ids, vec![WayId(100), WayId(200)]);
    }

    #[test]
    fn ways_through_end_node() {
        let graph = super::helpers::t_junction();
        let ids: Vec<WayId> = graph.ways_through(NodeId(5)).map(|w| w.id).collect();
        assert_eq!(ids, vec![WayId(200)]);
    }

    #[test]
    fn isolated_and_unknown_nodes_have_no_ways() {
        let graph = super::helpers::t_junction();
        assert_eq!(graph.ways_through(NodeId(9)).count(), 0);
        assert_eq!(graph.ways_through(NodeId(12345)).count(), 0);
    }

    #[test]
    fn closed_loop_listed_once() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_node(NodeId(2), GeoPoint::new(0.0, 0.001)).unwrap();
        b.add_node(NodeId(3), GeoPoint::new(0.001, 0.0)).unwrap();
        b.add_way(WayId(1), vec![NodeId(1), NodeId(2), NodeId(3), NodeId(1)], "Ring", "")
            .unwrap();
        let graph = b.build().unwrap();
        assert_eq!(graph.ways_through(NodeId(1)).count(), 1);
    }

    #[test]
    fn index_of_finds_first_position() {
        let graph = super::helpers::t_junction();
        let main = graph.way(WayId(100)).unwrap();
        assert_eq!(main.index_of(NodeId(1)).unwrap(), 0);
        assert_eq!(main.index_of(NodeId(3)).unwrap(), 2);
    }

    #[test]
    fn index_of_missing_node_errors() {
        use crate::GraphError;

        let graph = super::helpers::t_junction();
        let main = graph.way(WayId(100)).unwrap();
        assert!(matches!(
            main.index_of(NodeId(5)),
            Err(GraphError::NodeNotOnWay { node: NodeId(5), way: WayId(100) })
        ));
    }

    #[test]
    fn label_falls_back_to_id() {
        let mut b = StreetGraphBuilder::new();
        b.add_node(NodeId(1), GeoPoint::new(0.0, 0.0)).unwrap();
        b.add_way(WayId(8), vec![NodeId(1)], "", "").unwrap();
        let graph = b.build().unwrap();
        assert_eq!(graph.way(WayId(8)).unwrap().label(), "WayId(8)");
    }
}

// ── Random selection ──────────────────────────────────────────────────────────

#[cfg(test)]
mod random {
    use std::collections::HashSet;

    use wd_core::{NodeId, SimRng, WayId};
    use crate::{GraphError, StreetGraph};

    #[test]
    fn random_node_on_empty_graph_errors() {
        let graph = StreetGraph::empty();
        let mut rng = SimRng::new(1);
        assert!(matches!(graph.random_node(rng.inner()), Err(GraphError::EmptyGraph)));
    }

    #[test]
    fn random_node_covers_all_nodes() {
        let graph = super::helpers::t_junction();
        let mut rng = SimRng::new(42);
        let seen: HashSet<NodeId> = (0..500)
            .map(|_| graph.random_node(rng.inner()).unwrap().id)
            .collect();
        assert_eq!(seen.len(), graph.node_count());
    }

    #[test]
    fn random_way_picks_only_incident_ways() {
        let graph = super::helpers::t_junction();
        let mut rng = SimRng::new(7);
        let seen: HashSet<WayId> = (0..200)
            .map(|_| graph.random_way(NodeId(2), rng.inner()).unwrap().id)
            .collect();
        assert_eq!(seen, HashSet::from([WayId(100), WayId(200)]));

        for _ in 0..50 {
            assert_eq!(graph.random_way(NodeId(1), rng.inner()).unwrap().id, WayId(100));
        }
    }

    #[test]
    fn random_way_at_isolated_node_errors() {
        let graph = super::helpers::t_junction();
        let mut rng = SimRng::new(7);
        assert!(matches!(
            graph.random_way(NodeId(9), rng.inner()),
            Err(GraphError::NoWayAtNode(NodeId(9)))
        ));
    }
}

// ── OSM assembly ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "osm"))]
mod osm_loader {
    use std::collections::HashMap;
    use std::path::Path;

    use wd_core::{GeoPoint, NodeId, WayId};
    use crate::osm::{OsmWay, assemble, load_from_pbf, street_way};
    use crate::GraphError;

    fn way(id: i64, tags: &[(&str, &str)], refs: &[i64]) -> Option<OsmWay> {
        street_way(id, tags.iter().copied(), refs.iter().copied())
    }

    /// Nodes 1..=3 on a street, 4 unreferenced, 5 only on a building outline.
    fn nodes() -> HashMap<i64, GeoPoint> {
        HashMap::from([
            (1, GeoPoint::new(0.000, 0.000)),
            (2, GeoPoint::new(0.000, 0.001)),
            (3, GeoPoint::new(0.000, 0.002)),
            (4, GeoPoint::new(1.000, 1.000)),
            (5, GeoPoint::new(0.001, 0.001)),
        ])
    }

    #[test]
    fn only_highway_ways_are_streets() {
        let street = way(10, &[("highway", "residential"), ("name", "Main Street")], &[1, 2]).unwrap();
        assert_eq!(street.kind, "residential");
        assert_eq!(street.name, "Main Street");
        assert_eq!(street.refs, vec![1, 2]);

        assert!(way(20, &[("building", "yes")], &[2, 5]).is_none());
        assert!(way(21, &[], &[1, 2]).is_none());
        assert_eq!(way(22, &[("highway", "footway")], &[3]).unwrap().name, "");
    }

    #[test]
    fn assembly_drops_dangling_refs_empty_ways_and_stray_nodes() {
        let ways: Vec<OsmWay> = [
            way(10, &[("highway", "residential"), ("name", "Main Street")], &[1, 2, 99, 3]),
            way(20, &[("building", "yes")], &[2, 5]),
            way(30, &[("highway", "service")], &[98, 97]),
            way(40, &[("highway", "footway")], &[3]),
        ]
        .into_iter()
        .flatten()
        .collect();

        let graph = assemble(nodes(), ways).unwrap();

        let ids: Vec<NodeId> = graph.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert!(!graph.contains_node(NodeId(4)));
        assert!(!graph.contains_node(NodeId(5)));

        assert_eq!(graph.way_count(), 2);
        let main = graph.way(WayId(10)).unwrap();
        assert_eq!(main.nodes, vec![NodeId(1), NodeId(2), NodeId(3)]);
        assert_eq!(main.kind, "residential");
        assert!(graph.way(WayId(20)).is_none());
        assert!(graph.way(WayId(30)).is_none());

        let through: Vec<WayId> = graph.ways_through(NodeId(3)).map(|w| w.id).collect();
        assert_eq!(through, vec![WayId(10), WayId(40)]);
        for way in &graph.ways {
            assert!(way.nodes.iter().all(|&n| graph.contains_node(n)));
        }
    }

    #[test]
    fn no_streets_gives_empty_graph() {
        let ways: Vec<OsmWay> = way(20, &[("building", "yes")], &[2, 5]).into_iter().collect();
        let graph = assemble(nodes(), ways).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.way_count(), 0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_from_pbf(Path::new("/nonexistent/wd-spatial/map.osm.pbf")).unwrap_err();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
