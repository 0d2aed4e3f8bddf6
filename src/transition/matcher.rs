use crate::config::MatchOptions;
use crate::error::MatchError;
use crate::graph::{GraphReader, Projection};
use crate::index::CandidateIndex;
use crate::route::{Route, RouteOracle};
use crate::transition::*;
use crate::Measurement;

use geo::{Distance, Haversine, Point};
use log::{info, warn};

/// The HMM map matcher.
///
/// Matches a sequence of measurements onto the network, producing one
/// [`MatchResult`] per measurement and the routes joining them.
///
/// Measurements closer than `interpolation_distance` to the last measurement
/// given a layer are not solved for. Once the path is known, they are placed
/// onto it at their closest position, in travel order.
pub struct MapMatcher<'a, G, R, E = DefaultEmissionCost, T = DefaultTransitionCost>
where
    E: EmissionStrategy,
    T: TransitionStrategy,
{
    index: &'a CandidateIndex<G>,
    router: &'a R,
    heuristics: CostingStrategies<E, T>,
    options: &'a MatchOptions,
}

impl<'a, G, R> MapMatcher<'a, G, R>
where
    G: GraphReader,
    R: RouteOracle,
{
    /// A matcher using the default costing strategies.
    pub fn new(index: &'a CandidateIndex<G>, router: &'a R, options: &'a MatchOptions) -> Self {
        MapMatcher {
            index,
            router,
            heuristics: CostingStrategies::from_options(options),
            options,
        }
    }
}

impl<'a, G, R, E, T> MapMatcher<'a, G, R, E, T>
where
    G: GraphReader,
    R: RouteOracle,
    E: EmissionStrategy + Send + Sync,
    T: TransitionStrategy + Send + Sync,
{
    /// Replaces the costing strategies.
    pub fn with_costing<E2, T2>(self, heuristics: CostingStrategies<E2, T2>) -> MapMatcher<'a, G, R, E2, T2>
    where
        E2: EmissionStrategy,
        T2: TransitionStrategy,
    {
        MapMatcher {
            index: self.index,
            router: self.router,
            heuristics,
            options: self.options,
        }
    }

    /// The indices of the measurements given their own layer.
    ///
    /// The first and last measurements are always selected. Others are
    /// selected once they are at least `interpolation_distance` from
    /// the previously selected measurement.
    pub fn select(&self, measurements: &[Measurement]) -> Vec<usize> {
        let last = measurements.len().saturating_sub(1);
        let mut selected: Vec<usize> = Vec::with_capacity(measurements.len());

        for (index, measurement) in measurements.iter().enumerate() {
            let keep = match selected.last() {
                None => true,
                Some(previous) => {
                    index == last
                        || Haversine.distance(measurements[*previous].position(), measurement.position())
                            >= self.options.interpolation_distance
                }
            };

            if keep {
                selected.push(index);
            }
        }

        selected
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
    pub fn match_measurements(&self, measurements: &[Measurement]) -> Result<MatchedTrace, MatchError> {
        if measurements.is_empty() {
            return Err(MatchError::EmptyTrace);
        }

        let selected = self.select(measurements);
        let layers = LayerGenerator::new(self.index, &self.heuristics, self.options.max_search_radius)
            .with_measurements(measurements, &selected);

        if layers.unmatchable() {
            return Err(MatchError::NoCandidates(measurements.len()));
        }

        let graph = self.index.graph();
        let solution = ViterbiSolver::new(graph, self.router, &self.heuristics, self.options)
            .solve(&layers, measurements);

        let mut results = measurements
            .iter()
            .map(|m| MatchResult::unmatched(m.time()))
            .collect::<Vec<_>>();
        let mut routes: Vec<Option<Route>> = vec![None; measurements.len() - 1];

        for (layer, choice) in layers.layers.iter().zip(&solution.choices) {
            let Some(candidate) = choice.and_then(|c| layer.candidates.get(c)) else {
                continue;
            };

            results[layer.measurement].state = Some(MatchedState {
                edge: candidate.position.edge,
                fraction: candidate.position.fraction,
                point: candidate.point,
                distance: candidate.distance,
            });
        }

        for (pair, route) in layers.layers.windows(2).zip(solution.routes) {
            let ([from, to], Some(route)) = (pair, route) else {
                continue;
            };

            self.place(measurements, from.measurement, to.measurement, route, &mut results, &mut routes);
        }

        let trace = MatchedTrace::new(results, routes);
        info!(
            "Matched {} of {} measurements ({} solved)",
            trace.matched(),
            trace.len(),
            layers.len()
        );

        Ok(trace)
    }

    /// Places the measurements strictly between `from` and `to` onto the route
    /// joining them, splitting the route at each.
    ///
    /// Should a measurement fail to be placed, the path is left
    /// discontinuous from the last placed measurement.
    fn place(
        &self,
        measurements: &[Measurement],
        from: usize,
        to: usize,
        route: Route,
        results: &mut [MatchResult],
        routes: &mut [Option<Route>],
    ) {
        let mut previous = from;
        let mut remaining = route;

        for index in from + 1..to {
            let point = measurements[index].position();
            let Some((at, projection)) = self.locate(&remaining, &point) else {
                warn!("Measurement {index} could not be placed upon its route");
                return;
            };

            let edge = remaining.edges()[at].edge;
            let Some((before, after)) = remaining.split(at, projection.fraction) else {
                return;
            };

            results[index].state = Some(MatchedState {
                edge,
                fraction: projection.fraction,
                point: projection.position,
                distance: projection.distance,
            });

            routes[previous] = Some(before);
            previous = index;
            remaining = after;
        }

        routes[previous] = Some(remaining);
    }

    /// The closest position to the point along the route, as the index of
    /// the route edge it lies upon and the projection onto that edge.
    fn locate(&self, route: &Route, point: &Point) -> Option<(usize, Projection)> {
        let graph = self.index.graph();

        route
            .edges()
            .iter()
            .enumerate()
            .filter_map(|(index, traversal)| {
                let shape = graph.edge(traversal.edge)?.shape();
                let projection =
                    shape.project_within(point, traversal.source_fraction, traversal.target_fraction);

                Some((index, projection))
            })
            .fold(None::<(usize, Projection)>, |best, (index, projection)| match best {
                Some((_, closest)) if closest.distance <= projection.distance => best,
                _ => Some((index, projection)),
            })
    }
}
