use crate::error::InvalidArgument;

use geo::Point;

/// A single observed position within a trace.
///
/// Accuracy and search radius are in meters, and are validated
/// to be non-negative at construction. The time is in seconds,
/// and may be absent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    position: Point,
    accuracy: f64,
    search_radius: f64,
    time: Option<f64>,
}

impl Measurement {
    pub fn new(
        position: Point,
        accuracy: f64,
        search_radius: f64,
        time: Option<f64>,
    ) -> Result<Self, InvalidArgument> {
        if !(position.x().is_finite() && position.y().is_finite()) {
            return Err(InvalidArgument::NonFinitePosition(
                position.x(),
                position.y(),
            ));
        }

        if !(accuracy >= 0.0) {
            return Err(InvalidArgument::NegativeAccuracy(accuracy));
        }

        if !(search_radius >= 0.0) {
            return Err(InvalidArgument::NegativeSearchRadius(search_radius));
        }

        Ok(Self {
            position,
            accuracy,
            search_radius,
            time: time.filter(|t| t.is_finite() && *t >= 0.0),
        })
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    #[inline]
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    #[inline]
    pub fn search_radius(&self) -> f64 {
        self.search_radius
    }

    /// Seconds since the start of the trace, if it was observed.
    #[inline]
    pub fn time(&self) -> Option<f64> {
        self.time
    }
}
