//! Witness check used by the contraction loop: does a path from `source` to
//! `target` of cost strictly below `bound` exist while `excluded` is treated
//! as absent? Same bounded Dijkstra as [`crate::search::dijkstra`], invoked
//! for its boolean outcome only, so it skips predecessor bookkeeping.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::constants::{add_weights, Weight, INFINITY};
use crate::graph::{Graph, VertexId};
use crate::priority_queue::PriorityQueue;

pub(crate) fn witness_exists(
    g: &Graph,
    source: VertexId,
    target: VertexId,
    bound: Weight,
    excluded: VertexId,
) -> bool {
    let mut distances: FxHashMap<VertexId, Weight> = FxHashMap::default();
    distances.insert(source, 0);
    let mut visited: FxHashSet<VertexId> = FxHashSet::default();

    let mut queue: PriorityQueue<VertexId, Weight> = PriorityQueue::new();
    queue.push(source, 0);

    while let Some((vertex, cost)) = queue.pop() {
        if !visited.insert(vertex) {
            continue;
        }
        if cost >= bound {
            return false;
        }
        if vertex == target {
            return true;
        }

        for edge in g.edges_from(vertex) {
            if edge.target == excluded || visited.contains(&edge.target) {
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
                queue.push(edge.target, next);
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_graphs::graph_from_edges;

    #[test]
    fn detour_below_bound_is_a_witness() {
        // 0 -- 1 -- 2 with detour 0 -- 3 -- 2.
        let g = graph_from_edges(4, &[(0, 1, 1), (1, 2, 1), (0, 3, 1), (3, 2, 1)]);
        assert!(witness_exists(&g, 0, 2, 3, 1));
    }

    #[test]
    fn bound_excludes_equal_cost_paths() {
        let g = graph_from_edges(4, &[(0, 1, 1), (1, 2, 1), (0, 3, 2), (3, 2, 2)]);
        // The detour costs exactly the bound.
        assert!(!witness_exists(&g, 0, 2, 4, 1));
        assert!(witness_exists(&g, 0, 2, 5, 1));
    }

    #[test]
    fn no_witness_without_alternative_route() {
        let g = graph_from_edges(3, &[(0, 1, 1), (1, 2, 1)]);
        assert!(!witness_exists(&g, 0, 2, 10, 1));
    }
}
