use approx::assert_abs_diff_eq;
use geo::Point;
use std::sync::Arc;
use traffic_fixtures::{fixture_path, MATCHER_CONFIG, TRAFFIC_TILES};
use traffic_matcher::error::{InvalidArgument, MatchError};
use traffic_matcher::graph::SegmentId;
use traffic_matcher::{
    Error, MatcherConfig, Measurement, MemoryGraph, TrafficSegmentMatcher, TrafficSegmentRecord,
};

const TIME_TOLERANCE: f64 = 0.25;
const LENGTH_TOLERANCE: f64 = 50.0;

const ROAD_ONE_WEST: (f64, f64) = (-76.376045, 40.539207);
const ROAD_ONE_MIDDLE: (f64, f64) = (-76.357056, 40.541309);
const ROAD_ONE_EAST: (f64, f64) = (-76.351089, 40.541504);
const ROAD_TWO_WEST: (f64, f64) = (-76.38126, 40.55602);
const ROAD_TWO_EAST: (f64, f64) = (-76.35784, 40.56786);
const ROAD_TWO_END: (f64, f64) = (-76.3842165, 40.5545253);
const BETWEEN_ROADS: (f64, f64) = (-76.37, 40.548);

fn matcher() -> TrafficSegmentMatcher<MemoryGraph> {
    let config = MatcherConfig::from_path(fixture_path(MATCHER_CONFIG)).expect("config loads");
    let graph = MemoryGraph::from_path(fixture_path(TRAFFIC_TILES)).expect("fixture loads");

    TrafficSegmentMatcher::new(config, Arc::new(graph)).expect("config is valid")
}

fn trace(points: &[((f64, f64), f64)]) -> Vec<Measurement> {
    points
        .iter()
        .map(|((lon, lat), time)| {
            Measurement::new(Point::new(*lon, *lat), 5.0, 50.0, Some(*time)).expect("valid measurement")
        })
        .collect()
}

/// The expected shape of a record, with `None` for an open bound.
struct Expected {
    segment: u64,
    start: Option<f64>,
    end: Option<f64>,
    indices: (usize, usize),
    length: Option<f64>,
}

fn expect(records: &[TrafficSegmentRecord], expected: &[Expected]) {
    assert_eq!(
        records.len(),
        expected.len(),
        "expected {} records, got {records:#?}",
        expected.len()
    );

    for (record, expected) in records.iter().zip(expected) {
        assert_eq!(record.segment_id, SegmentId(expected.segment), "{record:?}");
        assert_eq!(
            (record.begin_shape_index, record.end_shape_index),
            expected.indices,
            "{record:?}"
        );

        for (actual, expected, tolerance) in [
            (record.start_time, expected.start, TIME_TOLERANCE),
            (record.end_time, expected.end, TIME_TOLERANCE),
            (record.length, expected.length, LENGTH_TOLERANCE),
        ] {
            match (actual, expected) {
                (Some(actual), Some(expected)) => {
                    assert_abs_diff_eq!(actual, expected, epsilon = tolerance)
                }
                (None, None) => {}
                _ => panic!("expected {expected:?}, got {actual:?} in {record:?}"),
            }
        }
    }

    assert_well_formed(records);
}

/// Shape indices never overlap, and a length is known exactly when both times are.
fn assert_well_formed(records: &[TrafficSegmentRecord]) {
    for record in records {
        assert!(record.begin_shape_index <= record.end_shape_index);
        assert_eq!(
            record.length.is_some(),
            record.start_time.is_some() && record.end_time.is_some()
        );
    }

    for pair in records.windows(2) {
        assert!(pair[0].end_shape_index <= pair[1].begin_shape_index);
    }
}

#[test_log::test]
fn scenario_a_one_boundary() {
    let records = matcher()
        .match_measurements(&trace(&[(ROAD_ONE_WEST, 0.0), (ROAD_ONE_MIDDLE, 1.0)]))
        .expect("trace matches");

    expect(
        &records,
        &[
            Expected {
                segment: 100,
                start: None,
                end: Some(0.5),
                indices: (0, 0),
                length: None,
            },
            Expected {
                segment: 101,
                start: Some(0.5),
                end: None,
                indices: (0, 1),
                length: None,
            },
        ],
    );
}

#[test_log::test]
fn scenario_b_full_segment_between_partials() {
    let records = matcher()
        .match_measurements(&trace(&[(ROAD_ONE_WEST, 0.0), (ROAD_ONE_EAST, 3.0)]))
        .expect("trace matches");

    expect(
        &records,
        &[
            Expected {
                segment: 100,
                start: None,
                end: Some(1.0),
                indices: (0, 0),
                length: None,
            },
            Expected {
                segment: 101,
                start: Some(1.0),
                end: Some(2.5),
                indices: (0, 0),
                length: Some(1000.0),
            },
            Expected {
                segment: 102,
                start: Some(2.5),
                end: None,
                indices: (0, 1),
                length: None,
            },
        ],
    );
}

#[test_log::test]
fn scenario_c_ends_on_a_segment_boundary() {
    let records = matcher()
        .match_measurements(&trace(&[(ROAD_TWO_WEST, 0.0), (ROAD_TWO_EAST, 6.0)]))
        .expect("trace matches");

    expect(
        &records,
        &[
            Expected {
                segment: 200,
                start: None,
                end: Some(0.5),
                indices: (0, 0),
                length: None,
            },
            Expected {
                segment: 201,
                start: Some(0.5),
                end: Some(1.0),
                indices: (0, 0),
                length: Some(200.0),
            },
            Expected {
                segment: 202,
                start: Some(1.0),
                end: Some(3.5),
                indices: (0, 0),
                length: Some(1000.0),
            },
            Expected {
                segment: 203,
                start: Some(3.5),
                end: Some(6.0),
                indices: (0, 1),
                length: Some(1000.0),
            },
        ],
    );
}

#[test_log::test]
fn scenario_d_reversed_direction() {
    let records = matcher()
        .match_measurements(&trace(&[(ROAD_TWO_EAST, 0.0), (ROAD_TWO_WEST, 6.0)]))
        .expect("trace matches");

    expect(
        &records,
        &[
            Expected {
                segment: 210,
                start: Some(0.0),
                end: Some(2.5),
                indices: (0, 0),
                length: Some(1000.0),
            },
            Expected {
                segment: 211,
                start: Some(2.5),
                end: Some(5.0),
                indices: (0, 0),
                length: Some(1000.0),
            },
            // The trace stops part way along 212, so the partial record
            // closes at the last measurement (index 1), not at index 0
            // where it was entered.
            Expected {
                segment: 212,
                start: Some(5.0),
                end: None,
                indices: (0, 1),
                length: None,
            },
        ],
    );
}

#[test]
fn segment_spanning_two_edges_is_full() {
    let records = matcher()
        .match_measurements(&trace(&[(ROAD_TWO_EAST, 0.0), (ROAD_TWO_END, 9.0)]))
        .expect("trace matches");

    let ids = records.iter().map(|r| r.segment_id.0).collect::<Vec<_>>();
    assert_eq!(ids, vec![210, 211, 212]);
    assert!(records.iter().all(TrafficSegmentRecord::is_full));

    let last = records[2];
    assert_abs_diff_eq!(last.length.unwrap_or_default(), 696.1, epsilon = 1.0);
    assert_abs_diff_eq!(last.end_time.unwrap_or_default(), 9.0, epsilon = TIME_TOLERANCE);
    assert_eq!(last.end_shape_index, 1);
}

#[test_log::test]
fn disconnected_roads_form_separate_groups() {
    let records = matcher()
        .match_measurements(&trace(&[
            (ROAD_ONE_WEST, 0.0),
            (ROAD_ONE_MIDDLE, 1.0),
            (ROAD_TWO_WEST, 100.0),
            (ROAD_TWO_EAST, 106.0),
        ]))
        .expect("trace matches");

    let ids = records.iter().map(|r| r.segment_id.0).collect::<Vec<_>>();
    assert_eq!(ids, vec![100, 101, 200, 201, 202, 203]);

    // The path restarts after the gap, so neither side is bounded by it.
    assert_eq!(records[1].end_time, None);
    assert_eq!(records[2].start_time, None);
    assert_eq!(records[2].begin_shape_index, 2);
    assert_eq!(records[5].end_shape_index, 3);
    assert_well_formed(&records);
}

#[test]
fn unmatched_interior_point_is_a_discontinuity() {
    let matcher = matcher();
    let measurements = trace(&[
        (ROAD_ONE_WEST, 0.0),
        (ROAD_ONE_MIDDLE, 1.0),
        (BETWEEN_ROADS, 2.0),
        (ROAD_ONE_EAST, 3.0),
    ]);

    let matched = matcher.map_match(&measurements).expect("trace matches");
    assert!(!matched.results()[2].is_matched());
    assert!(matched.results()[3].is_matched());

    let records = matcher.match_measurements(&measurements).expect("trace matches");
    let ids = records.iter().map(|r| r.segment_id.0).collect::<Vec<_>>();
    assert_eq!(ids, vec![100, 101]);
}

#[test]
fn interpolated_point_shifts_shape_indices() {
    // ~5m along road two from its western measurement
    let records = matcher()
        .match_measurements(&trace(&[
            (ROAD_TWO_WEST, 0.0),
            ((-76.3812107, 40.5560449), 0.0126),
            (ROAD_TWO_EAST, 6.0),
        ]))
        .expect("trace matches");

    let spans = records
        .iter()
        .map(|r| (r.segment_id.0, r.begin_shape_index, r.end_shape_index))
        .collect::<Vec<_>>();

    assert_eq!(
        spans,
        vec![(200, 0, 1), (201, 1, 1), (202, 1, 1), (203, 1, 2)]
    );
    assert_abs_diff_eq!(records[1].start_time.unwrap_or_default(), 0.5, epsilon = TIME_TOLERANCE);
}

#[test]
fn whole_trace_failures() {
    let matcher = matcher();

    assert!(matches!(
        matcher.match_measurements(&[]),
        Err(Error::Match(MatchError::EmptyTrace))
    ));

    assert!(matches!(
        matcher.match_measurements(&trace(&[(BETWEEN_ROADS, 0.0), (BETWEEN_ROADS, 1.0)])),
        Err(Error::Match(MatchError::NoCandidates(2)))
    ));

    assert_eq!(
        Measurement::new(Point::new(ROAD_ONE_WEST.0, ROAD_ONE_WEST.1), -1.0, 50.0, Some(0.0)),
        Err(InvalidArgument::NegativeAccuracy(-1.0))
    );
}

#[test]
fn matching_is_deterministic() {
    let matcher = matcher();
    let measurements = trace(&[(ROAD_TWO_WEST, 0.0), (ROAD_TWO_EAST, 6.0)]);

    let first = matcher.match_measurements(&measurements).expect("trace matches");
    let second = matcher.match_measurements(&measurements).expect("trace matches");

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).expect("serialises"),
        serde_json::to_string(&second).expect("serialises")
    );
}

#[test]
fn shared_matcher_across_threads() {
    let matcher = matcher();
    let traces = [
        trace(&[(ROAD_ONE_WEST, 0.0), (ROAD_ONE_MIDDLE, 1.0)]),
        trace(&[(ROAD_ONE_WEST, 0.0), (ROAD_ONE_EAST, 3.0)]),
        trace(&[(ROAD_TWO_WEST, 0.0), (ROAD_TWO_EAST, 6.0)]),
        trace(&[(ROAD_TWO_EAST, 0.0), (ROAD_TWO_WEST, 6.0)]),
    ];

    let sequential = traces
        .iter()
        .map(|t| matcher.match_measurements(t).expect("trace matches"))
        .collect::<Vec<_>>();

    let shared = &matcher;
    let concurrent = std::thread::scope(|scope| {
        let handles = traces
            .iter()
            .cycle()
            .take(16)
            .map(|t| scope.spawn(move || shared.match_measurements(t).expect("trace matches")))
            .collect::<Vec<_>>();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect::<Vec<_>>()
    });

    for (index, records) in concurrent.iter().enumerate() {
        assert_eq!(records, &sequential[index % traces.len()]);
    }
}
