//! Bounded single-source Dijkstra with optional vertex exclusion.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::constants::{add_weights, Weight, INFINITY};
use crate::graph::{Graph, VertexId};
use crate::priority_queue::PriorityQueue;
use crate::search::shortest_path::ShortestPath;
use crate::search::{build_path, SearchError};
use crate::statistics::SearchStats;

pub struct Dijkstra<'a> {
    pub stats: SearchStats,
    g: &'a Graph,
}

impl<'a> Dijkstra<'a> {
    pub fn new(g: &'a Graph) -> Self {
        Dijkstra {
            g,
            stats: SearchStats::default(),
        }
    }

    /// Searches a path from `source` to `target` of cost strictly below
    /// `bound`. Distances are tracked lazily: only touched vertices get an
    /// entry. When `excluded` is set, that vertex and every edge touching it
    /// are treated as absent.
    pub fn search(
        &mut self,
        source: VertexId,
        target: VertexId,
        bound: Weight,
        excluded: Option<VertexId>,
    ) -> Result<ShortestPath, SearchError> {
        self.stats.init();

        if source == target {
            self.stats.finish();
            return if self.g.contains_vertex(source) && 0 < bound {
                Ok(ShortestPath::new(vec![source], 0))
            } else {
                Err(SearchError::TargetUnreachable)
            };
        }

        let mut distances: FxHashMap<VertexId, Weight> = FxHashMap::default();
        distances.insert(source, 0);
        let mut predecessors: FxHashMap<VertexId, VertexId> = FxHashMap::default();
        let mut visited: FxHashSet<VertexId> = FxHashSet::default();

        let mut queue: PriorityQueue<VertexId, Weight> = PriorityQueue::new();
        queue.push(source, 0);

        while let Some((vertex, cost)) = queue.pop() {
            self.stats.nodes_popped += 1;

            if !visited.insert(vertex) {
                continue;
            }

            // Everything still queued costs at least as much, so the target
            // cannot be reached below the bound anymore.
            if cost >= bound {
                break;
            }

            if excluded == Some(vertex) {
                continue;
            }

            if vertex == target {
                let path = build_path(&predecessors, source, target)?;
                self.stats.finish();
                return Ok(ShortestPath::new(path, cost));
            }

            for edge in self.g.edges_from(vertex) {
                if excluded == Some(edge.target) || visited.contains(&edge.target) {
                    continue;
                }
                if edge.weight >= INFINITY {
                    continue;
                }
                let next = add_weights(cost, edge.weight);
                if next >= bound {
                    continue;
                }
                if next < distances.get(&edge.target).copied().unwrap_or(INFINITY) {
                    distances.insert(edge.target, next);
                    predecessors.insert(edge.target, vertex);
                    queue.push(edge.target, next);
                }
            }
        }

        self.stats.finish();
        Err(SearchError::TargetUnreachable)
    }
}
