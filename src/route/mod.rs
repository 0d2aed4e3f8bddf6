//! The route-cost oracle.
//!
//! Routes connect two positions along edges of the network, and are
//! described edge-by-edge as the fraction of each edge traversed.
//!
//! ```text
//!        source                                     target
//!   o------x=========o====================o=========x------o
//!          | fs..1.0 |      0.0..1.0      | 0.0..ft |
//! ```

pub mod dijkstra;
pub mod router;

#[cfg(test)]
mod test;

#[doc(inline)]
pub use dijkstra::*;
#[doc(inline)]
pub use router::*;

use crate::graph::{EdgeId, GraphReader};

use geo::Point;

/// Routes shorter than this (in meters) are considered stationary.
const STATIONARY_LENGTH: f64 = 1e-3;

/// A position upon the network, as a fraction along an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePosition {
    pub edge: EdgeId,
    pub fraction: f64,
}

impl EdgePosition {
    pub fn new(edge: EdgeId, fraction: f64) -> Self {
        Self { edge, fraction }
    }
}

/// The traversed part of one edge within a [`Route`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEdge {
    pub edge: EdgeId,
    pub source_fraction: f64,
    pub target_fraction: f64,

    /// Length of the whole edge, in meters.
    pub edge_length: f64,
}

impl RouteEdge {
    /// A traversal across the full edge.
    pub fn whole(edge: EdgeId, edge_length: f64) -> Self {
        Self {
            edge,
            source_fraction: 0.0,
            target_fraction: 1.0,
            edge_length,
        }
    }

    /// Traversed length, in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        ((self.target_fraction - self.source_fraction) * self.edge_length).max(0.0)
    }
}

/// An ordered, edge-contiguous path between two positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    edges: Vec<RouteEdge>,
}

impl Route {
    /// Creates a route over the given edges.
    ///
    /// Edges traversed for no distance at either end of the route (such as
    /// a source positioned at the very end of its edge) are dropped, so long
    /// as at least one edge remains.
    pub fn new(mut edges: Vec<RouteEdge>) -> Self {
        while edges.len() > 1 && edges[0].length() <= STATIONARY_LENGTH {
            edges.remove(0);
        }

        while edges.len() > 1 && edges[edges.len() - 1].length() <= STATIONARY_LENGTH {
            edges.pop();
        }

        Self { edges }
    }

    /// A route which does not move from its position.
    pub fn stationary(position: EdgePosition, edge_length: f64) -> Self {
        Self {
            edges: vec![RouteEdge {
                edge: position.edge,
                source_fraction: position.fraction,
                target_fraction: position.fraction,
                edge_length,
            }],
        }
    }

    #[inline]
    pub fn edges(&self) -> &[RouteEdge] {
        &self.edges
    }

    /// Total length, in meters.
    pub fn length(&self) -> f64 {
        self.edges.iter().map(RouteEdge::length).sum()
    }

    pub fn source(&self) -> Option<EdgePosition> {
        self.edges
            .first()
            .map(|edge| EdgePosition::new(edge.edge, edge.source_fraction))
    }

    pub fn target(&self) -> Option<EdgePosition> {
        self.edges
            .last()
            .map(|edge| EdgePosition::new(edge.edge, edge.target_fraction))
    }

    /// Splits the route at the fraction along the edge at `edge_index`,
    /// yielding the route up to that position and the route after it.
    ///
    /// Returns `None` if the index is out of bounds.
    pub fn split(&self, edge_index: usize, fraction: f64) -> Option<(Route, Route)> {
        let at = self.edges.get(edge_index)?;
        let fraction = fraction.clamp(at.source_fraction, at.target_fraction.max(at.source_fraction));

        let mut before = self.edges[..edge_index].to_vec();
        before.push(RouteEdge {
            target_fraction: fraction,
            ..*at
        });

        let mut after = vec![RouteEdge {
            source_fraction: fraction,
            ..*at
        }];
        after.extend_from_slice(&self.edges[edge_index + 1..]);

        Some((Route::new(before), Route::new(after)))
    }

    /// The geometry of the route, following each edge's shape.
    pub fn geometry<G>(&self, graph: &G) -> Vec<Point>
    where
        G: GraphReader + ?Sized,
    {
        let mut points: Vec<Point> = Vec::new();

        for traversal in &self.edges {
            let Some(edge) = graph.edge(traversal.edge) else {
                continue;
            };

            for point in edge
                .shape()
                .slice(traversal.source_fraction, traversal.target_fraction)
            {
                if points.last() != Some(&point) {
                    points.push(point);
                }
            }
        }

        points
    }
}

/// Resolves the shortest path between positions on the network.
///
/// Implementations must be safe to call concurrently.
pub trait RouteOracle: Send + Sync {
    /// The shortest route from the source to each target, where one exists
    /// no longer than `max_distance` meters. The output is index-aligned
    /// with `targets`.
    fn routes(
        &self,
        source: &EdgePosition,
        targets: &[EdgePosition],
        max_distance: f64,
    ) -> Vec<Option<Route>>;

    /// The shortest route between two positions, if one exists no longer
    /// than `max_distance` meters.
    fn route(&self, source: &EdgePosition, target: &EdgePosition, max_distance: f64) -> Option<Route> {
        self.routes(source, std::slice::from_ref(target), max_distance)
            .into_iter()
            .next()
            .flatten()
    }
}
