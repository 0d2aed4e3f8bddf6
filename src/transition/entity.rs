use crate::graph::EdgeId;
use crate::route::{EdgePosition, Route};

use geo::Point;

/// The position a measurement was matched onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedState {
    pub edge: EdgeId,
    pub fraction: f64,

    /// The matched point upon the edge.
    pub point: Point,

    /// Distance between the measurement and the matched point, in meters.
    pub distance: f64,
}

impl MatchedState {
    pub fn position(&self) -> EdgePosition {
        EdgePosition::new(self.edge, self.fraction)
    }
}

/// The outcome of matching a single measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// `None` when no acceptable candidate existed.
    pub state: Option<MatchedState>,
    pub time: Option<f64>,
}

impl MatchResult {
    pub fn unmatched(time: Option<f64>) -> Self {
        Self { state: None, time }
    }

    #[inline]
    pub fn is_matched(&self) -> bool {
        self.state.is_some()
    }
}

/// The matched path of a trace.
///
/// Holds one result per input measurement, in input order, and the
/// routes joining each result to the next. `routes[i]` connects
/// `results[i]` to `results[i + 1]`, and is `None` wherever the
/// path is discontinuous.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedTrace {
    results: Vec<MatchResult>,
    routes: Vec<Option<Route>>,
}

impl MatchedTrace {
    pub fn new(results: Vec<MatchResult>, routes: Vec<Option<Route>>) -> Self {
        Self { results, routes }
    }

    #[inline]
    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    #[inline]
    pub fn routes(&self) -> &[Option<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Number of measurements matched onto the network.
    pub fn matched(&self) -> usize {
        self.results.iter().filter(|r| r.is_matched()).count()
    }
}
