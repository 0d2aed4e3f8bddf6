use crate::transition::Strategy;

use geo::Point;

pub trait EmissionStrategy: for<'a> Strategy<EmissionContext<'a>, Cost = f64> {}
impl<T> EmissionStrategy for T where T: for<'a> Strategy<EmissionContext<'a>, Cost = f64> {}

#[derive(Clone, Copy, Debug)]
pub struct EmissionContext<'a> {
    /// The proposed (candidate) position to be matched onto.
    ///
    /// This belongs to the network, and is not provided
    /// as input to the match query.
    pub candidate_position: &'a Point,

    /// The position the costing method is matching.
    ///
    /// This belongs to the un-matched trip, as the position
    /// which must be matched upon the network.
    pub source_position: &'a Point,

    /// Great-circle distance between the two positions, in meters.
    pub distance: f64,

    /// The reported accuracy of the source position, in meters.
    pub accuracy: f64,
}

impl<'a> EmissionContext<'a> {
    pub fn new(candidate: &'a Point, source: &'a Point, distance: f64, accuracy: f64) -> Self {
        Self {
            candidate_position: candidate,
            source_position: source,
            distance,
            accuracy,
        }
    }
}
