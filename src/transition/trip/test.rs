use crate::transition::Trip;

use approx::assert_relative_eq;
use geo::{wkt, Point};

fn trip(line: geo::LineString) -> Trip {
    Trip::new(line.into_points())
}

#[test]
fn straight_road_has_no_turn_cost() {
    let trip = trip(wkt! { LINESTRING (-76.38 40.54, -76.37 40.54, -76.36 40.54) });

    assert_eq!(trip.headings().len(), 2);
    assert_relative_eq!(trip.turn_cost(), 0.0, epsilon = 1e-4);
}

#[test]
fn right_angle_costs_one_half() {
    let trip = trip(wkt! { LINESTRING (-76.38 40.54, -76.37 40.54, -76.37 40.55) });

    let turns = trip.delta_angle();
    let [turn] = turns[..] else {
        panic!("expected a single turn");
    };

    assert_relative_eq!(turn, 90.0, epsilon = 0.1);
    assert_relative_eq!(trip.turn_cost(), 0.5, epsilon = 0.01);
}

#[test]
fn u_turn_costs_one() {
    let trip = trip(wkt! { LINESTRING (-76.38 40.54, -76.37 40.54, -76.38 40.54) });

    assert_relative_eq!(trip.delta_angle()[0], 180.0, epsilon = 0.1);
    assert_relative_eq!(trip.turn_cost(), 1.0, epsilon = 1e-3);
}

#[test]
fn turns_accumulate() {
    // North, east, then back west: a right angle and a U-turn.
    let trip = trip(wkt! { LINESTRING (-76.38 40.54, -76.38 40.55, -76.37 40.55, -76.375 40.55) });

    assert_relative_eq!(trip.turn_cost(), 1.5, epsilon = 0.01);
}

#[test]
fn heading_wraps_through_north() {
    // North-west then north-east crosses the 0°/360° boundary.
    let trip = trip(wkt! { LINESTRING (-76.37 40.54, -76.371 40.541, -76.370 40.542) });

    let turns = trip.delta_angle();
    let [turn] = turns[..] else {
        panic!("expected a single turn");
    };

    assert_relative_eq!(turn, 74.6, epsilon = 1.0);
}

#[test]
fn overlapping_positions_have_no_heading() {
    let trip = Trip::new([
        Point::new(-76.38, 40.54),
        Point::new(-76.38, 40.54),
        Point::new(-76.37, 40.54),
    ]);

    assert_eq!(trip.headings().len(), 1);
    assert!(trip.delta_angle().is_empty());
    assert_eq!(trip.turn_cost(), 0.0);
}
