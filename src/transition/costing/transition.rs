use crate::route::Route;
use crate::transition::{Strategy, Trip};

pub trait TransitionStrategy: for<'a> Strategy<TransitionContext<'a>, Cost = f64> {}
impl<T> TransitionStrategy for T where T: for<'a> Strategy<TransitionContext<'a>, Cost = f64> {}

#[derive(Clone, Copy, Debug)]
pub struct TransitionContext<'a> {
    /// The shortest route between the two candidates.
    pub route: &'a Route,

    /// The geometry of the route.
    pub trip: &'a Trip,

    /// Great-circle distance between the two measurements, in meters.
    pub measurement_distance: f64,

    /// Great-circle distance between the two candidates, in meters.
    pub candidate_distance: f64,
}

impl TransitionContext<'_> {
    /// The absolute difference between the distance the measurements imply
    /// was travelled, and the length of the route.
    pub fn deviance(&self) -> f64 {
        (self.route.length() - self.measurement_distance).abs()
    }
}
