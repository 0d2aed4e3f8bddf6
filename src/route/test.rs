use crate::config::Mode;
use crate::graph::{EdgeId, GraphReader, MemoryGraph, NodeId};
use crate::route::*;

use approx::assert_relative_eq;
use serde_json::json;
use std::sync::Arc;
use traffic_fixtures::{fixture_path, TRAFFIC_TILES};

fn fixture() -> Arc<MemoryGraph> {
    Arc::new(MemoryGraph::from_path(fixture_path(TRAFFIC_TILES)).expect("fixture must load"))
}

fn edge_ids(route: &Route) -> Vec<EdgeId> {
    route.edges().iter().map(|edge| edge.edge).collect()
}

#[test]
fn dijkstra_visits_in_cost_order() {
    // 1 -> 2 (5), 1 -> 3 (1), 3 -> 2 (1), 2 -> 4 (1)
    let arcs: [(u32, u32, &str, u32); 4] = [(1, 2, "a", 5), (1, 3, "b", 1), (3, 2, "c", 1), (2, 4, "d", 1)];

    let visited = Dijkstra
        .reach(&1u32, |node: &u32| {
            arcs.iter()
                .filter(|(from, ..)| from == node)
                .map(|(_, to, arc, cost)| (*to, *arc, *cost))
                .collect::<Vec<_>>()
        })
        .map(|item| (item.node, item.via, item.total_cost))
        .collect::<Vec<_>>();

    assert_eq!(
        visited,
        vec![(1, None, 0), (3, Some("b"), 1), (2, Some("c"), 2), (4, Some("d"), 3)]
    );
}

#[test]
fn same_edge_forward_is_direct() {
    let router = GraphRouter::new(fixture(), Mode::Auto);
    let route = router
        .route(
            &EdgePosition::new(EdgeId(2), 0.25),
            &EdgePosition::new(EdgeId(2), 0.75),
            1000.0,
        )
        .expect("route along one edge");

    assert_eq!(edge_ids(&route), vec![EdgeId(2)]);
    assert_relative_eq!(route.length(), 1011.5 / 2.0, epsilon = 1.0);
}

#[test]
fn routes_across_consecutive_edges() {
    let graph = fixture();
    let router = GraphRouter::new(graph.clone(), Mode::Auto);

    let route = router
        .route(
            &EdgePosition::new(EdgeId(1), 0.5),
            &EdgePosition::new(EdgeId(3), 0.5),
            5000.0,
        )
        .expect("eastbound route exists");

    assert_eq!(edge_ids(&route), vec![EdgeId(1), EdgeId(2), EdgeId(3)]);
    assert_relative_eq!(route.length(), 580.0 + 1011.5 + 327.35, epsilon = 1.0);

    let geometry = route.geometry(graph.as_ref());
    assert_eq!(geometry.first(), Some(&graph.edge(EdgeId(1)).expect("edge").shape().point_at(0.5)));
    assert!(geometry.len() >= 4);
}

#[test]
fn backwards_on_same_edge_goes_around() {
    let router = GraphRouter::new(fixture(), Mode::Auto);
    let source = EdgePosition::new(EdgeId(1), 0.5);
    let target = EdgePosition::new(EdgeId(1), 0.2);

    assert!(router.route(&source, &target, 1000.0).is_none());

    // Turns back at node 2, returning to node 1 along the opposite carriageway.
    let route = router.route(&source, &target, 5000.0).expect("loop exists");
    assert_eq!(edge_ids(&route), vec![EdgeId(1), EdgeId(6), EdgeId(1)]);
    assert_relative_eq!(route.length(), 580.0 + 1160.0 + 232.0, epsilon = 1.0);
}

#[test]
fn disconnected_roads_have_no_route() {
    let router = GraphRouter::new(fixture(), Mode::Auto);

    let routes = router.routes(
        &EdgePosition::new(EdgeId(1), 0.5),
        &[EdgePosition::new(EdgeId(12), 0.5), EdgePosition::new(EdgeId(2), 0.5)],
        100_000.0,
    );

    assert!(routes[0].is_none());
    assert!(routes[1].is_some());
}

#[test]
fn zero_length_ends_are_trimmed() {
    let router = GraphRouter::new(fixture(), Mode::Auto);

    // Source at the very end of edge 13, target at the very start of edge 14.
    let route = router
        .route(
            &EdgePosition::new(EdgeId(13), 1.0),
            &EdgePosition::new(EdgeId(14), 0.5),
            5000.0,
        )
        .expect("route exists");

    assert_eq!(edge_ids(&route), vec![EdgeId(14)]);
    assert_eq!(route.source(), Some(EdgePosition::new(EdgeId(14), 0.0)));
}

#[test]
fn split_partitions_length() {
    let router = GraphRouter::new(fixture(), Mode::Auto);
    let route = router
        .route(
            &EdgePosition::new(EdgeId(11), 0.5),
            &EdgePosition::new(EdgeId(13), 0.5),
            5000.0,
        )
        .expect("route exists");

    let (before, after) = route.split(1, 0.5).expect("index in bounds");
    assert_eq!(edge_ids(&before), vec![EdgeId(11), EdgeId(12)]);
    assert_eq!(edge_ids(&after), vec![EdgeId(12), EdgeId(13)]);
    assert_relative_eq!(before.length() + after.length(), route.length(), epsilon = 1e-6);

    // Splitting at an edge boundary leaves no zero-length remnant.
    let (before, after) = route.split(1, 0.0).expect("index in bounds");
    assert_eq!(edge_ids(&before), vec![EdgeId(11)]);
    assert_eq!(edge_ids(&after), vec![EdgeId(12), EdgeId(13)]);

    assert!(route.split(5, 0.5).is_none());
}

#[test]
fn mode_restricts_traversal() {
    let document = json!({
        "nodes": [
            { "id": 1, "lon": 0.000, "lat": 0.0 },
            { "id": 2, "lon": 0.001, "lat": 0.0 },
            { "id": 3, "lon": 0.002, "lat": 0.0 },
            { "id": 4, "lon": 0.003, "lat": 0.0 }
        ],
        "edges": [
            { "id": 1, "source": 1, "target": 2 },
            { "id": 2, "source": 2, "target": 3, "access": ["pedestrian"] },
            { "id": 3, "source": 3, "target": 4 }
        ]
    });

    let graph = Arc::new(MemoryGraph::from_json(&document.to_string()).expect("graph loads"));
    assert_eq!(graph.outgoing(NodeId(2)).as_slice(), &[EdgeId(2)]);

    let source = EdgePosition::new(EdgeId(1), 0.5);
    let target = EdgePosition::new(EdgeId(3), 0.5);

    let walking = GraphRouter::new(graph.clone(), Mode::Pedestrian);
    let route = walking.route(&source, &target, 1000.0).expect("footpath is open");
    assert_eq!(edge_ids(&route), vec![EdgeId(1), EdgeId(2), EdgeId(3)]);

    let driving = GraphRouter::new(graph, Mode::Auto);
    assert!(driving.route(&source, &target, 1000.0).is_none());
}
