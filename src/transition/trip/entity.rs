use geo::{Bearing, Distance, Haversine, Point};

/// The positions passed through along a route, in travel order,
/// from which the turns taken along the route are measured.
#[derive(Clone, Debug, Default)]
pub struct Trip(Vec<Point>);

impl Trip {
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        Self(points.into_iter().collect())
    }

    /// The bearing of each leg of the trip, in degrees clockwise from north.
    ///
    /// Legs shorter than a meter are skipped, as no meaningful
    /// bearing exists between their ends.
    pub fn headings(&self) -> Vec<f64> {
        self.0
            .windows(2)
            .filter_map(|leg| match leg {
                [a, b] if Haversine.distance(*a, *b) >= 1.0 => Some(Haversine.bearing(*a, *b)),
                _ => None,
            })
            .collect()
    }

    /// The magnitude of each change in heading, within `[0, 180]` degrees.
    ///
    /// ### Example
    /// ```rust
    ///  use traffic_matcher::transition::Trip;
    ///  use geo::Point;
    ///
    ///  let trip = Trip::new([
    ///     Point::new(-76.38, 40.54),
    ///     Point::new(-76.37, 40.54),
    ///     Point::new(-76.37, 40.55),
    ///  ]);
    ///
    ///  // East, then north: a single ~90° turn.
    ///  assert_eq!(trip.delta_angle().len(), 1);
    /// ```
    pub fn delta_angle(&self) -> Vec<f64> {
        self.headings()
            .windows(2)
            .map(|pair| {
                let turn = (pair[1] - pair[0]).rem_euclid(360.0);
                turn.min(360.0 - turn)
            })
            .collect()
    }

    /// The normalised turn cost of the trip.
    ///
    /// Each change in heading contributes `(1 - cos Δθ) / 2`, which is zero
    /// when continuing straight, one half for a right-angle turn, and one
    /// for a complete U-turn.
    ///
    /// ```math
    /// turn_cost(trip) = ∑ (1 - cos(Δθ)) / 2
    /// ```
    pub fn turn_cost(&self) -> f64 {
        self.delta_angle()
            .into_iter()
            .map(|angle| (1.0 - angle.to_radians().cos()) / 2.0)
            .sum()
    }
}
