use crate::config::{MatchOptions, MatcherConfig, Mode};
use crate::error::MatchError;
use crate::graph::{EdgeId, MemoryGraph};
use crate::index::CandidateIndex;
use crate::route::GraphRouter;
use crate::transition::*;
use crate::Measurement;

use approx::assert_relative_eq;
use geo::Point;
use serde_json::json;
use std::sync::Arc;
use traffic_fixtures::{fixture_path, MATCHER_CONFIG, TRAFFIC_TILES};

struct Harness {
    index: CandidateIndex<MemoryGraph>,
    router: GraphRouter<MemoryGraph>,
    options: MatchOptions,
}

impl Harness {
    fn new(graph: MemoryGraph, options: MatchOptions) -> Self {
        let config = MatcherConfig::from_path(fixture_path(MATCHER_CONFIG)).expect("config loads");
        let graph = Arc::new(graph);

        Self {
            index: CandidateIndex::new(graph.clone(), &config.grid, Mode::Auto),
            router: GraphRouter::new(graph, Mode::Auto),
            options,
        }
    }

    fn fixture() -> Self {
        let config = MatcherConfig::from_path(fixture_path(MATCHER_CONFIG)).expect("config loads");
        let graph = MemoryGraph::from_path(fixture_path(TRAFFIC_TILES)).expect("fixture loads");
        Self::new(graph, config.default)
    }

    fn matcher(&self) -> MapMatcher<'_, MemoryGraph, GraphRouter<MemoryGraph>> {
        MapMatcher::new(&self.index, &self.router, &self.options)
    }
}

fn measurement(lon: f64, lat: f64, time: f64, accuracy: f64) -> Measurement {
    Measurement::new(Point::new(lon, lat), accuracy, 50.0, Some(time)).expect("valid measurement")
}

const P0: (f64, f64) = (-76.376045, 40.539207);
const PA: (f64, f64) = (-76.357056, 40.541309);

fn matched_edges(trace: &MatchedTrace) -> Vec<Option<EdgeId>> {
    trace
        .results()
        .iter()
        .map(|r| r.state.map(|s| s.edge))
        .collect()
}

#[test]
fn selection_keeps_ends_and_spaced_measurements() {
    let harness = Harness::fixture();
    let matcher = harness.matcher();

    let trace = [
        measurement(P0.0, P0.1, 0.0, 5.0),
        measurement(P0.0 + 0.00005, P0.1, 0.1, 5.0), // ~4m on
        measurement(P0.0 + 0.0005, P0.1, 0.5, 5.0),  // ~42m on
        measurement(P0.0 + 0.00051, P0.1, 0.6, 5.0), // ~1m on
    ];

    assert_eq!(matcher.select(&trace), vec![0, 2, 3]);
    assert_eq!(matcher.select(&trace[..1]), vec![0]);
    assert!(matcher.select(&[]).is_empty());
}

#[test_log::test]
fn matches_along_one_road() {
    let harness = Harness::fixture();
    let trace = [measurement(P0.0, P0.1, 0.0, 5.0), measurement(PA.0, PA.1, 1.0, 5.0)];

    let matched = harness.matcher().match_measurements(&trace).expect("trace matches");

    assert_eq!(matched_edges(&matched), vec![Some(EdgeId(1)), Some(EdgeId(2))]);
    assert_eq!(matched.matched(), 2);

    let route = matched.routes()[0].as_ref().expect("points are connected");
    let edges = route.edges().iter().map(|e| e.edge).collect::<Vec<_>>();
    assert_eq!(edges, vec![EdgeId(1), EdgeId(2)]);
    assert_relative_eq!(route.length(), 1621.5, epsilon = 2.0);
}

#[test]
fn breakage_distance_splits_the_path() {
    let mut harness = Harness::fixture();
    harness.options.breakage_distance = 1000.0;

    let trace = [measurement(P0.0, P0.1, 0.0, 5.0), measurement(PA.0, PA.1, 1.0, 5.0)];
    let matched = harness.matcher().match_measurements(&trace).expect("trace matches");

    assert_eq!(matched.matched(), 2);
    assert_eq!(matched.routes().len(), 1);
    assert!(matched.routes()[0].is_none());
}

#[test_log::test]
fn close_measurements_are_placed_on_the_route() {
    let harness = Harness::fixture();

    // ~5m along the road from the first measurement
    let trace = [
        measurement(P0.0, P0.1, 0.0, 5.0),
        measurement(-76.3759865, 40.5392135, 0.5, 5.0),
        measurement(PA.0, PA.1, 1.0, 5.0),
    ];

    let matched = harness.matcher().match_measurements(&trace).expect("trace matches");
    assert_eq!(
        matched_edges(&matched),
        vec![Some(EdgeId(1)), Some(EdgeId(1)), Some(EdgeId(2))]
    );

    let [Some(before), Some(after)] = matched.routes() else {
        panic!("expected a continuous path, got {:?}", matched.routes());
    };

    assert_relative_eq!(before.length(), 5.0, epsilon = 1.0);
    assert_relative_eq!(before.length() + after.length(), 1621.5, epsilon = 2.0);
    assert_eq!(before.target(), after.source());
    assert_eq!(matched.results()[1].time, Some(0.5));
}

#[test]
fn unmatched_measurement_breaks_the_path() {
    let harness = Harness::fixture();

    let trace = [
        measurement(P0.0, P0.1, 0.0, 5.0),
        measurement(-76.37, 40.548, 1.0, 5.0),
        measurement(PA.0, PA.1, 2.0, 5.0),
    ];

    let matched = harness.matcher().match_measurements(&trace).expect("trace matches");
    assert_eq!(
        matched_edges(&matched),
        vec![Some(EdgeId(1)), None, Some(EdgeId(2))]
    );
    assert!(matched.routes().iter().all(Option::is_none));
    assert_eq!(matched.results()[1].time, Some(1.0));
}

#[test]
fn degenerate_traces_fail() {
    let harness = Harness::fixture();
    let matcher = harness.matcher();

    assert!(matches!(
        matcher.match_measurements(&[]),
        Err(MatchError::EmptyTrace)
    ));

    let nowhere = [measurement(-76.37, 40.548, 0.0, 5.0), measurement(-76.37, 40.549, 1.0, 5.0)];
    assert!(matches!(
        matcher.match_measurements(&nowhere),
        Err(MatchError::NoCandidates(2))
    ));
}

#[test]
fn single_measurement_matches_without_routes() {
    let harness = Harness::fixture();
    let matched = harness
        .matcher()
        .match_measurements(&[measurement(PA.0, PA.1, 0.0, 5.0)])
        .expect("trace matches");

    assert_eq!(matched.len(), 1);
    assert!(matched.routes().is_empty());
    assert!(matched.results()[0].is_matched());
}

fn one_way_street() -> MemoryGraph {
    let document = json!({
        "nodes": [
            { "id": 1, "lon": 0.00, "lat": 0.0 },
            { "id": 2, "lon": 0.01, "lat": 0.0 }
        ],
        "edges": [{ "id": 7, "source": 1, "target": 2 }]
    });

    MemoryGraph::from_json(&document.to_string()).expect("graph loads")
}

#[test]
fn backwards_jitter_within_accuracy_stands_still() {
    let options = MatchOptions {
        interpolation_distance: 0.0,
        ..MatchOptions::default()
    };

    // ~2.2m backwards along a one-way street
    let harness = Harness::new(one_way_street(), options.clone());
    let trace = [measurement(0.005, 0.0, 0.0, 5.0), measurement(0.00498, 0.0, 1.0, 5.0)];
    let matched = harness.matcher().match_measurements(&trace).expect("trace matches");

    let route = matched.routes()[0].as_ref().expect("jitter keeps the path");
    assert_relative_eq!(route.length(), 0.0);

    // Reported accuracy tighter than the jitter.
    let harness = Harness::new(one_way_street(), options);
    let trace = [measurement(0.005, 0.0, 0.0, 1.0), measurement(0.00498, 0.0, 1.0, 1.0)];
    let matched = harness.matcher().match_measurements(&trace).expect("trace matches");

    assert_eq!(matched.matched(), 2);
    assert!(matched.routes()[0].is_none());
}

#[test]
fn emission_cost_widens_with_accuracy() {
    let strategies: CostingStrategies = CostingStrategies::default();
    let (a, b) = (Point::new(0.0, 0.0), Point::new(0.0, 0.0001));

    let tight = strategies.emission(EmissionContext::new(&a, &b, 10.0, 1.0));
    let loose = strategies.emission(EmissionContext::new(&a, &b, 10.0, 20.0));

    assert_relative_eq!(tight, 0.5 * (10.0f64 / 4.07).powi(2), epsilon = 1e-9);
    assert_relative_eq!(loose, 0.125, epsilon = 1e-9);
}
