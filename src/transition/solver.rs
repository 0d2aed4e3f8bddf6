use crate::config::MatchOptions;
use crate::graph::GraphReader;
use crate::route::{Route, RouteOracle};
use crate::transition::*;
use crate::Measurement;

use geo::{Distance, Haversine};
use log::{debug, trace, warn};
use measure_time::debug_time;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// The most likely candidate of each layer, and the routes between them.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    /// The chosen candidate within each layer, `None` if the layer was left unmatched.
    pub choices: Vec<Option<usize>>,

    /// `routes[k]` joins the choice of layer `k` to that of layer `k + 1`,
    /// and is `None` where the two were solved in separate chains.
    pub routes: Vec<Option<Route>>,
}

pub trait Solver {
    /// Solves the transition graph formed by the layers, each of which
    /// was generated for the measurement it names.
    fn solve(&self, layers: &Layers, measurements: &[Measurement]) -> Solution;
}

/// The forward pass over one layer of a chain.
struct Step {
    layer: usize,

    /// Cost of the cheapest path ending at each candidate.
    costs: Vec<f64>,

    /// The predecessor of each candidate upon its cheapest path,
    /// with the route taken from it.
    parents: Vec<Option<(usize, Route)>>,
}

impl Step {
    fn start(index: usize, layer: &Layer) -> Self {
        Step {
            layer: index,
            costs: layer.candidates.iter().map(|c| c.emission).collect(),
            parents: vec![None; layer.candidates.len()],
        }
    }

    /// The first candidate of least cost.
    fn cheapest(&self) -> Option<usize> {
        self.costs
            .iter()
            .enumerate()
            .filter(|(_, cost)| cost.is_finite())
            .fold(None::<(usize, f64)>, |best, (index, cost)| match best {
                Some((_, lowest)) if lowest <= *cost => best,
                _ => Some((index, *cost)),
            })
            .map(|(index, _)| index)
    }
}

/// A Viterbi solver over the layered transition graph.
///
/// The forward pass keeps, for each candidate of the current layer, the
/// cheapest path reaching it. A layer which cannot be joined to the
/// previous one (too distant, empty, or unreachable) closes the chain,
/// which is backtracked on its own, and a new chain starts after it.
pub struct ViterbiSolver<'a, G, R, E, T>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    graph: &'a G,
    router: &'a R,
    heuristics: &'a CostingStrategies<E, T>,
    options: &'a MatchOptions,
}

impl<'a, G, R, E, T> ViterbiSolver<'a, G, R, E, T>
where
    G: GraphReader,
    R: RouteOracle,
    E: EmissionStrategy + Send + Sync,
    T: TransitionStrategy + Send + Sync,
{
    pub fn new(
        graph: &'a G,
        router: &'a R,
        heuristics: &'a CostingStrategies<E, T>,
        options: &'a MatchOptions,
    ) -> Self {
        Self {
            graph,
            router,
            heuristics,
            options,
        }
    }

    /// A backwards move along one edge, no further than the measurement's
    /// accuracy, is taken as standing still.
    fn stationary(&self, source: &Candidate, target: &Candidate, accuracy: f64) -> Option<Route> {
        let backwards = source.position.fraction - target.position.fraction;

        (source.position.edge == target.position.edge
            && backwards > 0.0
            && backwards * source.edge_length <= accuracy)
            .then(|| Route::stationary(source.position, source.edge_length))
    }

    /// Advances the chain by the target layer, returning `None`
    /// if no candidate of the layer can be reached.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip_all))]
    fn forward(
        &self,
        source: &Layer,
        previous: &Step,
        index: usize,
        target: &Layer,
        measurements: &[Measurement],
    ) -> Option<Step> {
        let distance = Haversine.distance(source.origin, target.origin);
        if distance > self.options.breakage_distance {
            warn!(
                "Measurements {} and {} are {distance:.0}m apart, beyond the breakage distance",
                source.measurement, target.measurement
            );
            return None;
        }

        let measurement = measurements.get(target.measurement)?;
        let bound = (self.options.max_route_distance_factor * distance + measurement.search_radius())
            .min(self.options.breakage_distance);

        let positions = target.candidates.iter().map(|c| c.position).collect::<Vec<_>>();

        let transitions = source
            .candidates
            .par_iter()
            .zip(previous.costs.par_iter())
            .map(|(from, cost)| {
                if !cost.is_finite() {
                    return vec![None; positions.len()];
                }

                self.router
                    .routes(&from.position, &positions, bound)
                    .into_iter()
                    .zip(&target.candidates)
                    .map(|(route, to)| {
                        let route = self.stationary(from, to, measurement.accuracy()).or(route)?;
                        let trip = Trip::new(route.geometry(self.graph));

                        let cost = self.heuristics.transition(TransitionContext {
                            route: &route,
                            trip: &trip,
                            measurement_distance: distance,
                            candidate_distance: Haversine.distance(from.point, to.point),
                        })?;

                        trace!(
                            "Transition {} -> {} over {:.1}m costs {cost:.3}",
                            from.position.edge,
                            to.position.edge,
                            route.length()
                        );

                        Some((cost, route))
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        let mut costs = vec![f64::INFINITY; target.candidates.len()];
        let mut parents: Vec<Option<(usize, Route)>> = vec![None; target.candidates.len()];

        for (from, row) in transitions.into_iter().enumerate() {
            for (to, entry) in row.into_iter().enumerate() {
                let Some((cost, route)) = entry else {
                    continue;
                };

                let total = previous.costs[from] + cost + target.candidates[to].emission;
                if total < costs[to] {
                    costs[to] = total;
                    parents[to] = Some((from, route));
                }
            }
        }

        if costs.iter().all(|cost| !cost.is_finite()) {
            warn!(
                "No candidate of measurement {} is reachable from measurement {}",
                target.measurement, source.measurement
            );
            return None;
        }

        Some(Step {
            layer: index,
            costs,
            parents,
        })
    }

    /// Backtracks the chain from its cheapest final candidate,
    /// writing the choices and routes into the solution.
    fn collapse(&self, chain: &mut Vec<Step>, solution: &mut Solution) {
        let Some(last) = chain.last() else {
            return;
        };

        debug!("Collapsing chain of {} layers", chain.len());
        let mut choice = last.cheapest();

        for step in chain.drain(..).rev() {
            let Some(current) = choice else {
                break;
            };

            solution.choices[step.layer] = Some(current);
            choice = match step.parents.into_iter().nth(current).flatten() {
                Some((parent, route)) => {
                    if let Some(slot) = step.layer.checked_sub(1) {
                        solution.routes[slot] = Some(route);
                    }
                    Some(parent)
                }
                None => None,
            };
        }
    }
}

impl<G, R, E, T> Solver for ViterbiSolver<'_, G, R, E, T>
where
    G: GraphReader,
    R: RouteOracle,
    E: EmissionStrategy + Send + Sync,
    T: TransitionStrategy + Send + Sync,
{
    fn solve(&self, layers: &Layers, measurements: &[Measurement]) -> Solution {
        debug_time!("solving {} layers", layers.len());

        let mut solution = Solution {
            choices: vec![None; layers.len()],
            routes: vec![None; layers.len().saturating_sub(1)],
        };

        let mut chain: Vec<Step> = Vec::new();
        for (index, layer) in layers.layers.iter().enumerate() {
            if layer.is_empty() {
                self.collapse(&mut chain, &mut solution);
                continue;
            }

            let step = chain.last().and_then(|previous| {
                let source = &layers.layers[previous.layer];
                self.forward(source, previous, index, layer, measurements)
            });

            match step {
                Some(step) => chain.push(step),
                None => {
                    self.collapse(&mut chain, &mut solution);
                    chain.push(Step::start(index, layer));
                }
            }
        }

        self.collapse(&mut chain, &mut solution);
        solution
    }
}
