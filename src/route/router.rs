use crate::config::Mode;
use crate::graph::{EdgeId, GraphReader, NodeId};
use crate::route::*;

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::sync::Arc;

const METER_TO_CM: f64 = 100.0;

/// Edge costs are accumulated in centimeters, to keep them totally ordered.
type Cost = u32;

#[inline]
fn to_cost(meters: f64) -> Cost {
    (meters * METER_TO_CM).round().clamp(0.0, Cost::MAX as f64) as Cost
}

/// A [`RouteOracle`] resolving shortest paths by distance, using an
/// upper-bounded dijkstra over the directed network.
///
/// Only edges accessible to the configured [`Mode`] are traversed.
pub struct GraphRouter<G> {
    graph: Arc<G>,
    mode: Mode,
}

impl<G> GraphRouter<G>
where
    G: GraphReader,
{
    pub fn new(graph: Arc<G>, mode: Mode) -> Self {
        Self { graph, mode }
    }

    /// All nodes reachable from `start` within `budget`, with their parent
    /// node, the edge taken from it, and the cost to reach them.
    ///
    /// The search stops early once every node within `wanted` is settled.
    fn settle(
        &self,
        start: NodeId,
        budget: Cost,
        mut wanted: FxHashSet<NodeId>,
    ) -> FxHashMap<NodeId, (Option<NodeId>, Option<EdgeId>, Cost)> {
        let mut settled = FxHashMap::default();
        let graph = self.graph.as_ref();
        let mode = self.mode;

        let reachable = Dijkstra.reach(&start, |node: &NodeId| {
            graph
                .outgoing(*node)
                .into_iter()
                .filter_map(|id| graph.edge(id))
                .filter(|edge| edge.allows(mode))
                .map(|edge| (edge.target(), edge.id(), to_cost(edge.length())))
                .collect::<SmallVec<[_; 4]>>()
        });

        for item in reachable {
            // Bounded by the threshold distance (centimeters)
            if item.total_cost > budget {
                break;
            }

            wanted.remove(&item.node);
            settled.insert(item.node, (item.parent, item.via, item.total_cost));

            if wanted.is_empty() {
                break;
            }
        }

        trace!("Settled {} nodes from {start}", settled.len());
        settled
    }
}

impl<G> RouteOracle for GraphRouter<G>
where
    G: GraphReader,
{
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, targets)))]
    fn routes(
        &self,
        source: &EdgePosition,
        targets: &[EdgePosition],
        max_distance: f64,
    ) -> Vec<Option<Route>> {
        let mut routes = vec![None; targets.len()];
        let Some(origin) = self.graph.edge(source.edge) else {
            return routes;
        };

        let leaving = RouteEdge {
            edge: origin.id(),
            source_fraction: source.fraction,
            target_fraction: 1.0,
            edge_length: origin.length(),
        };

        // Targets further along the source edge are reached directly,
        // the rest need a search from the end of the source edge.
        let mut wanted = FxHashSet::default();
        for (index, target) in targets.iter().enumerate() {
            if target.edge == source.edge && target.fraction >= source.fraction {
                let direct = RouteEdge {
                    target_fraction: target.fraction,
                    ..leaving
                };

                if direct.length() <= max_distance {
                    routes[index] = Some(Route::new(vec![direct]));
                }
            } else if let Some(edge) = self.graph.edge(target.edge) {
                if edge.allows(self.mode) {
                    wanted.insert(edge.source());
                }
            }
        }

        let offset = leaving.length();
        if wanted.is_empty() || offset > max_distance {
            return routes;
        }

        let settled = self.settle(origin.target(), to_cost(max_distance - offset), wanted);

        for (index, target) in targets.iter().enumerate() {
            if routes[index].is_some() {
                continue;
            }

            let Some(arriving) = self.graph.edge(target.edge) else {
                continue;
            };

            let Some((_, _, cost)) = settled.get(&arriving.source()) else {
                continue;
            };

            let entering = RouteEdge {
                edge: arriving.id(),
                source_fraction: 0.0,
                target_fraction: target.fraction,
                edge_length: arriving.length(),
            };

            let length = offset + *cost as f64 / METER_TO_CM + entering.length();
            if length > max_distance {
                continue;
            }

            // Walk the parents back to the start of the search.
            let mut node = arriving.source();
            let mut between = Vec::new();
            while let Some((Some(parent), Some(via), _)) = settled.get(&node) {
                between.push(*via);
                node = *parent;
            }

            let edges = std::iter::once(leaving)
                .chain(between.into_iter().rev().filter_map(|id| {
                    self.graph
                        .edge(id)
                        .map(|edge| RouteEdge::whole(id, edge.length()))
                }))
                .chain(std::iter::once(entering))
                .collect::<Vec<_>>();

            routes[index] = Some(Route::new(edges));
        }

        routes
    }
}
