use crate::graph::GraphReader;
use crate::index::CandidateIndex;
use crate::route::EdgePosition;
use crate::transition::*;
use crate::Measurement;

use log::{debug, trace, warn};
use measure_time::debug_time;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use wkt::ToWkt;

/// Upper bound on the candidates kept within a single layer.
const MAX_CANDIDATES: usize = 25;

/// Generates the layers within the transition graph.
///
/// Each layer represents one measurement, and each candidate within it a
/// position that measurement may be matched onto. Candidates are found by
/// projecting the measurement onto the edges within its search radius,
/// which is expanded up to `max_search_radius` if nothing is found.
pub struct LayerGenerator<'a, G, E, T>
where
    G: GraphReader,
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    index: &'a CandidateIndex<G>,
    heuristics: &'a CostingStrategies<E, T>,
    max_search_radius: f64,
}

impl<'a, G, E, T> LayerGenerator<'a, G, E, T>
where
    G: GraphReader,
    E: EmissionStrategy + Send + Sync,
    T: TransitionStrategy + Send + Sync,
{
    pub fn new(
        index: &'a CandidateIndex<G>,
        heuristics: &'a CostingStrategies<E, T>,
        max_search_radius: f64,
    ) -> Self {
        LayerGenerator {
            index,
            heuristics,
            max_search_radius,
        }
    }

    /// Generates a layer for each of the selected measurements, in the
    /// order given. Layers are generated in parallel.
    pub fn with_measurements(&self, measurements: &[Measurement], selected: &[usize]) -> Layers {
        debug_time!("generating {} layers", selected.len());

        selected
            .par_iter()
            .filter_map(|index| measurements.get(*index).map(|m| (*index, m)))
            .map(|(index, measurement)| self.layer(index, measurement))
            .collect::<Layers>()
    }

    fn layer(&self, index: usize, measurement: &Measurement) -> Layer {
        let origin = measurement.position();
        let found = self.index.candidates(measurement, self.max_search_radius);

        let candidates = found
            .into_iter()
            .take(MAX_CANDIDATES)
            .filter_map(|found| {
                let edge_length = self.index.graph().edge(found.edge)?.length();
                let projection = found.projection;

                let emission = self.heuristics.emission(EmissionContext::new(
                    &projection.position,
                    &origin,
                    projection.distance,
                    measurement.accuracy(),
                ));

                trace!(
                    "Candidate on edge {} at {:.3} ({:.1}m), emission {emission:.3}",
                    found.edge,
                    projection.fraction,
                    projection.distance
                );

                Some(Candidate {
                    position: EdgePosition::new(found.edge, projection.fraction),
                    point: projection.position,
                    edge_length,
                    distance: projection.distance,
                    emission,
                })
            })
            .collect::<Vec<_>>();

        if candidates.is_empty() {
            warn!(
                "Measurement {index} ({}) has no candidates",
                origin.wkt_string()
            );
        } else {
            debug!("Layer for measurement {index} has {} candidates", candidates.len());
        }

        Layer {
            measurement: index,
            origin,
            candidates,
        }
    }
}
