//! The Interpolator.
//!
//! Distributes the time between each pair of consecutive matched
//! measurements across the edges of the route joining them, in
//! proportion to the distance travelled along each edge.
//!
//! ```text
//!   t=0                                t=3
//!    x======o==================o=======x
//!    | e1   |        e2        |  e3   |
//!    0     0.7                2.2      3
//! ```
//!
//! A discontinuity in the matched path closes the current group of points,
//! and the next connected pair opens another.


use crate::graph::EdgeId;
use crate::transition::MatchedTrace;

use log::debug;
use std::mem;

/// The traversal of one edge between two matched measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationPoint {
    pub edge: EdgeId,

    /// Length of the whole edge, in meters.
    pub edge_length: f64,

    /// Fraction along the edge at which it was entered.
    pub begin_fraction: f64,

    /// Fraction along the edge at which it was left.
    pub end_fraction: f64,

    /// Distance travelled along the group's path on entry, in meters.
    pub begin_distance: f64,
    pub end_distance: f64,

    /// Absent when either bounding measurement lacks a time.
    pub begin_time: Option<f64>,
    pub end_time: Option<f64>,

    /// Index of the measurement the traversal began after.
    pub begin_shape_index: usize,

    /// Index of the measurement the traversal ended at, or the
    /// [begin index](#structfield.begin_shape_index) if it ended
    /// before reaching the next measurement.
    pub end_shape_index: usize,
}

impl InterpolationPoint {
    /// Distance travelled along the edge, in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.end_distance - self.begin_distance
    }
}

/// Interpolates the matched path into groups of edge traversals, one
/// group per continuous stretch of the path.
///
/// A trace with no connected pair of measurements yields no groups.
pub fn interpolate(trace: &MatchedTrace) -> Vec<Vec<InterpolationPoint>> {
    let results = trace.results();

    let mut groups = Vec::new();
    let mut current: Vec<InterpolationPoint> = Vec::new();
    let mut travelled = 0.0;

    for (index, route) in trace.routes().iter().enumerate() {
        let Some(route) = route else {
            if !current.is_empty() {
                groups.push(mem::take(&mut current));
                travelled = 0.0;
            }
            continue;
        };

        let times = results
            .get(index)
            .zip(results.get(index + 1))
            .and_then(|(a, b)| a.time.zip(b.time));

        let total = route.length();
        let last = route.edges().len().saturating_sub(1);
        let mut along = 0.0;

        for (position, traversal) in route.edges().iter().enumerate() {
            let length = traversal.length();

            let (begin_time, end_time) = match times {
                Some((a, b)) if total > 0.0 => (
                    Some(a + (b - a) * along / total),
                    Some(a + (b - a) * (along + length) / total),
                ),
                Some((a, b)) => (Some(a), Some(b)),
                None => (None, None),
            };

            current.push(InterpolationPoint {
                edge: traversal.edge,
                edge_length: traversal.edge_length,
                begin_fraction: traversal.source_fraction,
                end_fraction: traversal.target_fraction,
                begin_distance: travelled + along,
                end_distance: travelled + along + length,
                begin_time,
                end_time,
                begin_shape_index: index,
                end_shape_index: if position == last { index + 1 } else { index },
            });

            along += length;
        }

        travelled += total;
    }

    if !current.is_empty() {
        groups.push(current);
    }

    debug!(
        "Interpolated {} points into {} groups",
        groups.iter().map(Vec::len).sum::<usize>(),
        groups.len()
    );

    groups
}
