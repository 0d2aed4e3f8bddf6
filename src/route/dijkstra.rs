use indexmap::map::Entry;
use indexmap::IndexMap;
use pathfinding::num_traits::Zero;
use rustc_hash::{FxHashSet, FxHasher};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::{BuildHasherDefault, Hash};
use std::ops::Add;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

#[derive(Debug)]
struct SmallestHolder<C> {
    cost: C,
    index: usize,
}

impl<C: Ord> PartialEq for SmallestHolder<C> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl<C: Ord> Eq for SmallestHolder<C> {}

impl<C: Ord> PartialOrd for SmallestHolder<C> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: Ord> Ord for SmallestHolder<C> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Struct returned by [`Dijkstra::reach`].
pub struct DijkstraReachable<N, A, C, FN> {
    to_see: BinaryHeap<SmallestHolder<C>>,
    seen: FxHashSet<usize>,

    /// Per node: the index of its parent, the arc taken from it, and the total cost.
    parents: FxIndexMap<N, (usize, Option<A>, C)>,
    successors: FN,
}

/// Information about a node reached by [`Dijkstra::reach`].
#[derive(Debug, Hash, PartialEq, Eq, Clone)]
pub struct DijkstraReachableItem<N, A, C> {
    /// The node that was reached.
    pub node: N,

    /// The previous node that the current node came from.
    /// If the node is the first node, there will be no parent.
    pub parent: Option<N>,

    /// The arc traversed from the parent to reach this node.
    pub via: Option<A>,

    /// The total cost from the starting node.
    pub total_cost: C,
}

impl<N, A, C, FN, IN> Iterator for DijkstraReachable<N, A, C, FN>
where
    N: Hash + Eq + Clone,
    A: Clone,
    C: Zero + Ord + Copy + Add<Output = C>,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, A, C)>,
{
    type Item = DijkstraReachableItem<N, A, C>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(SmallestHolder { cost, index }) = self.to_see.pop() {
            if !self.seen.insert(index) {
                continue;
            }

            let Some((node, (parent_index, via, _))) = self.parents.get_index(index) else {
                continue;
            };

            let item = DijkstraReachableItem {
                node: node.clone(),
                parent: self.parents.get_index(*parent_index).map(|x| x.0.clone()),
                via: via.clone(),
                total_cost: cost,
            };

            let successors = (self.successors)(&item.node);
            for (successor, arc, move_cost) in successors {
                let new_cost = cost + move_cost;

                let index = match self.parents.entry(successor) {
                    Entry::Vacant(e) => {
                        let n = e.index();
                        e.insert((index, Some(arc), new_cost));
                        n
                    }
                    Entry::Occupied(mut e) => {
                        if e.get().2 > new_cost {
                            e.insert((index, Some(arc), new_cost));
                            e.index()
                        } else {
                            continue;
                        }
                    }
                };

                self.to_see.push(SmallestHolder {
                    cost: new_cost,
                    index,
                });
            }

            return Some(item);
        }

        None
    }
}

pub struct Dijkstra;

impl Dijkstra {
    /// Visit all nodes that are reachable from a start node. The node
    /// will be visited in order of cost, with the closest nodes first.
    ///
    /// The `successors` function receives the current node, and returns
    /// an iterator of successors, each with the arc leading to it and
    /// the cost of traversing that arc.
    pub fn reach<N, A, C, FN, IN>(&self, start: &N, successors: FN) -> DijkstraReachable<N, A, C, FN>
    where
        N: Hash + Eq + Clone,
        C: Zero + Ord + Copy,
        FN: FnMut(&N) -> IN,
        IN: IntoIterator<Item = (N, A, C)>,
    {
        let mut to_see = BinaryHeap::with_capacity(256);
        to_see.push(SmallestHolder {
            cost: C::zero(),
            index: 0,
        });

        let mut parents: FxIndexMap<N, (usize, Option<A>, C)> =
            FxIndexMap::with_capacity_and_hasher(64, BuildHasherDefault::<FxHasher>::default());

        parents.insert(start.clone(), (usize::MAX, None, C::zero()));

        DijkstraReachable {
            to_see,
            seen: FxHashSet::default(),
            parents,
            successors,
        }
    }
}
