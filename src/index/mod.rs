//! The Candidate Index.
//!
//! Buckets the road network into a grid of fixed-size cells, each holding the
//! edges whose geometry may cross it. Cells are loaded lazily from the
//! [`GraphReader`] on first use, and retained within a bounded [`LruCache`].
//!
//! ```text
//!   +-----+-----+-----+
//!   |     |  x--|--x  |     A query visits every cell its search
//!   +-----+--|--+-----+     square touches, then projects the
//!   |     |  o  |     |     measurement `o` onto each distinct edge
//!   +-----+-----+-----+     found within them.
//! ```

pub mod cache;


pub use cache::LruCache;

use crate::config::{GridConfig, Mode};
use crate::graph::shape::METERS_PER_DEGREE;
use crate::graph::{EdgeId, GraphReader, Projection};
use crate::Measurement;

use geo::{coord, Destination, Haversine, Point, Rect};
use itertools::Itertools;
use log::trace;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Integer grid coordinate of a cell, as (column, row).
pub type CellKey = (i64, i64);

/// An edge near a measurement, with the measurement's projection onto it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCandidate {
    pub edge: EdgeId,
    pub projection: Projection,
}

pub struct CandidateIndex<G> {
    graph: Arc<G>,
    cells: LruCache<CellKey, Vec<EdgeId>>,

    /// Edge length of a cell, in degrees.
    cell_degrees: f64,
    mode: Mode,
}

impl<G> CandidateIndex<G>
where
    G: GraphReader,
{
    pub fn new(graph: Arc<G>, grid: &GridConfig, mode: Mode) -> Self {
        Self {
            graph,
            cells: LruCache::new(grid.cache_size),
            cell_degrees: grid.size / METERS_PER_DEGREE,
            mode,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// The loaded cells.
    pub fn cache(&self) -> &LruCache<CellKey, Vec<EdgeId>> {
        &self.cells
    }

    /// The key of the cell containing the point.
    pub fn cell_of(&self, point: &Point) -> CellKey {
        (
            (point.x() / self.cell_degrees).floor() as i64,
            (point.y() / self.cell_degrees).floor() as i64,
        )
    }

    fn cell_bounds(&self, (column, row): CellKey) -> Rect {
        let size = self.cell_degrees;
        Rect::new(
            coord! { x: column as f64 * size, y: row as f64 * size },
            coord! { x: (column + 1) as f64 * size, y: (row + 1) as f64 * size },
        )
    }

    /// Edges within `radius` meters of the point, closest first.
    /// Ties in distance are broken by edge identifier.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self)))]
    pub fn within(&self, point: &Point, radius: f64) -> Vec<EdgeCandidate> {
        let north = Haversine.destination(*point, 0.0, radius);
        let east = Haversine.destination(*point, 90.0, radius);
        let south = Haversine.destination(*point, 180.0, radius);
        let west = Haversine.destination(*point, 270.0, radius);

        let (min_column, min_row) = self.cell_of(&Point::new(west.x(), south.y()));
        let (max_column, max_row) = self.cell_of(&Point::new(east.x(), north.y()));

        let mut edges = FxHashSet::default();
        for key in (min_column..=max_column).cartesian_product(min_row..=max_row) {
            let cell = self.cells.query(key, |key| {
                trace!("Loading cell {key:?}");
                self.graph.edges_within(&self.cell_bounds(*key))
            });

            edges.extend(cell.iter().copied());
        }

        edges
            .into_iter()
            .filter_map(|id| self.graph.edge(id))
            .filter(|edge| edge.allows(self.mode))
            .map(|edge| EdgeCandidate {
                edge: edge.id(),
                projection: edge.shape().project(point),
            })
            .filter(|candidate| candidate.projection.distance <= radius)
            .sorted_by(|a, b| {
                a.projection
                    .distance
                    .total_cmp(&b.projection.distance)
                    .then(a.edge.cmp(&b.edge))
            })
            .collect()
    }

    /// Edges within the measurement's search radius. When none are found,
    /// the radius is doubled until one is, or `max_search_radius` is reached.
    ///
    /// An empty result is not an error: the measurement is simply unmatched.
    pub fn candidates(&self, measurement: &Measurement, max_search_radius: f64) -> Vec<EdgeCandidate> {
        let point = measurement.position();
        let mut radius = measurement.search_radius();

        loop {
            let found = self.within(&point, radius);
            if !found.is_empty() || radius >= max_search_radius {
                return found;
            }

            radius = (radius * 2.0).max(1.0).min(max_search_radius);
            trace!("Expanding search radius to {radius}m");
        }
    }
}
