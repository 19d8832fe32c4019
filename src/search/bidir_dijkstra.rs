//! Bidirectional Dijkstra over a contraction hierarchy.
//!
//! Both frontiers run forward on the upward graph: every downward edge
//! `v -> w` is mirrored upward as `w -> v`, so walking out-edges of the
//! target in the upward graph is exactly the backward search over the
//! downward graph. The sides advance in lockstep, always settling the
//! frontier with the cheaper queue minimum.

use rustc_hash::FxHashMap;

use crate::constants::{add_weights, Weight, INFINITY};
use crate::graph::{Graph, VertexId};
use crate::priority_queue::PriorityQueue;
use crate::search::shortest_path::ShortestPath;
use crate::search::{build_path, SearchError};
use crate::statistics::SearchStats;

struct SearchSide {
    distances: FxHashMap<VertexId, Weight>,
    predecessors: FxHashMap<VertexId, VertexId>,
    queue: PriorityQueue<VertexId, Weight>,
}

impl SearchSide {
    fn new(start: VertexId) -> Self {
        let mut distances = FxHashMap::default();
        distances.insert(start, 0);
        let mut queue = PriorityQueue::new();
        queue.push(start, 0);
        SearchSide {
            distances,
            predecessors: FxHashMap::default(),
            queue,
        }
    }

    /// Settles the cheapest queued vertex: checks it against the opposite
    /// frontier for a better meeting point, then relaxes its out-edges.
    fn settle(
        &mut self,
        g: &Graph,
        opposite: &FxHashMap<VertexId, Weight>,
        best_weight: &mut Weight,
        meet_vertex: &mut Option<VertexId>,
    ) {
        let Some((vertex, cost)) = self.queue.pop() else {
            return;
        };

        if let Some(&other) = opposite.get(&vertex) {
            let total = add_weights(cost, other);
            if total < *best_weight {
                *best_weight = total;
                *meet_vertex = Some(vertex);
            }
        }

        for edge in g.edges_from(vertex) {
            if edge.weight >= INFINITY {
                continue;
            }
            let next = add_weights(cost, edge.weight);
            if next < self.distances.get(&edge.target).copied().unwrap_or(INFINITY) {
                self.distances.insert(edge.target, next);
                self.predecessors.insert(edge.target, vertex);
                self.queue.update(edge.target, next);
            }
        }
    }
}

pub struct BidirDijkstra<'a> {
    pub stats: SearchStats,
    upwards: &'a Graph,
}

impl<'a> BidirDijkstra<'a> {
    pub fn new(upwards: &'a Graph) -> Self {
        BidirDijkstra {
            upwards,
            stats: SearchStats::default(),
        }
    }

    /// Shortest up-then-down path between `source` and `target`, expressed in
    /// hierarchy edges (shortcut hops included).
    pub fn search(
        &mut self,
        source: VertexId,
        target: VertexId,
    ) -> Result<ShortestPath, SearchError> {
        self.stats.init();

        if source == target {
            self.stats.finish();
            return if self.upwards.contains_vertex(source) {
                Ok(ShortestPath::new(vec![source], 0))
            } else {
                Err(SearchError::TargetUnreachable)
            };
        }

        let mut forward = SearchSide::new(source);
        let mut backward = SearchSide::new(target);

        let mut best_weight = INFINITY;
        let mut meet_vertex: Option<VertexId> = None;

        loop {
            let (Some((_, forward_min)), Some((_, backward_min))) =
                (forward.queue.peek(), backward.queue.peek())
            else {
                break;
            };

            // Once the joint frontiers cannot beat the best meeting point,
            // the remaining work belongs to the drain loops below.
            if best_weight < INFINITY && add_weights(forward_min, backward_min) >= best_weight {
                break;
            }

            if forward_min <= backward_min {
                forward.settle(self.upwards, &backward.distances, &mut best_weight, &mut meet_vertex);
            } else {
                backward.settle(self.upwards, &forward.distances, &mut best_weight, &mut meet_vertex);
            }
            self.stats.nodes_popped += 1;
        }

        while forward
            .queue
            .peek()
            .map_or(false, |(_, min)| min < best_weight)
        {
            forward.settle(self.upwards, &backward.distances, &mut best_weight, &mut meet_vertex);
            self.stats.nodes_popped += 1;
        }
        while backward
            .queue
            .peek()
            .map_or(false, |(_, min)| min < best_weight)
        {
            backward.settle(self.upwards, &forward.distances, &mut best_weight, &mut meet_vertex);
            self.stats.nodes_popped += 1;
        }

        self.stats.finish();

        let Some(meet) = meet_vertex else {
            return Err(SearchError::TargetUnreachable);
        };

        let forward_path = build_path(&forward.predecessors, source, meet)?;
        let mut backward_path = build_path(&backward.predecessors, target, meet)?;
        backward_path.reverse();

        let mut path = forward_path;
        path.extend_from_slice(&backward_path[1..]);
        Ok(ShortestPath::new(path, best_weight))
    }
}
