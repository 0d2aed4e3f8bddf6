use crate::route::EdgePosition;

use geo::Point;
use rayon::iter::{FromParallelIterator, IntoParallelIterator, ParallelIterator};

/// A position a measurement could be matched onto.
///
/// Holds the position upon the edge it was projected onto, the projected
/// point itself, its distance from the measurement, and the resulting
/// emission cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub position: EdgePosition,
    pub point: Point,

    /// Length of the candidate's edge, in meters.
    pub edge_length: f64,

    /// Distance from the measurement, in meters.
    pub distance: f64,
    pub emission: f64,
}

/// A layer within the transition graph.
///
/// This represents the set of [candidates](#field.candidates)
/// for one measurement, and the [origin](#field.origin) point
/// they were projected from.
#[derive(Clone, Debug)]
pub struct Layer {
    /// Index of the measurement within the trace.
    pub measurement: usize,

    /// The measured position.
    pub origin: Point,

    /// All candidates detected for the layer, closest first.
    pub candidates: Vec<Candidate>,
}

impl Layer {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Default, Debug)]
pub struct Layers {
    pub layers: Vec<Layer>,
}

impl Layers {
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether no layer holds any candidate.
    pub fn unmatchable(&self) -> bool {
        self.layers.iter().all(Layer::is_empty)
    }
}

impl FromParallelIterator<Layer> for Layers {
    fn from_par_iter<I>(layers: I) -> Self
    where
        I: IntoParallelIterator<Item = Layer>,
    {
        let layers = layers.into_par_iter().collect::<Vec<Layer>>();
        Self { layers }
    }
}
