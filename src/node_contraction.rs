//! CH preprocessing: priority-driven contraction with witness search.
//!
//! Vertices are contracted in batches. Each batch is an independent set (no
//! two members adjacent, no shared neighbor), so the shortcut computations
//! read disjoint star neighborhoods and can run in parallel against the
//! unchanging working graph. All mutation happens on the single thread that
//! owns the contractor.

use log::{debug, info};
use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::constants::{add_weights, Weight};
use crate::graph::{Graph, GraphError, VertexId};
use crate::hierarchy::ContractionHierarchy;
use crate::priority_queue::PriorityQueue;
use crate::search::dijkstra::Dijkstra;
use crate::witness_search::witness_exists;

/// Upper limit for one independent contraction batch.
const BATCH_SIZE: usize = 128;

struct Shortcut {
    from: VertexId,
    to: VertexId,
    weight: Weight,
    via: VertexId,
}

pub struct NodeContractor {
    working: Graph,
    upwards: Graph,
    downwards: Graph,
    contraction_order: Vec<VertexId>,
    contracted: FxHashSet<VertexId>,
    priorities: PriorityQueue<VertexId, f64>,
    shortcuts_added: usize,
}

impl NodeContractor {
    pub fn new(g: &Graph) -> Self {
        let mut upwards = Graph::new();
        let mut downwards = Graph::new();
        for vertex in g.vertices() {
            upwards
                .add_vertex(*vertex)
                .unwrap_or_else(|err| panic!("seeding upward graph: {err}"));
            downwards
                .add_vertex(*vertex)
                .unwrap_or_else(|err| panic!("seeding downward graph: {err}"));
        }

        NodeContractor {
            working: g.clone(),
            upwards,
            downwards,
            contraction_order: Vec::with_capacity(g.num_vertices()),
            contracted: FxHashSet::default(),
            priorities: PriorityQueue::new(),
            shortcuts_added: 0,
        }
    }

    /// Contracts the whole working graph and freezes the result.
    pub fn run(mut self) -> ContractionHierarchy {
        info!(
            "contracting {} vertices, {} directed edges",
            self.working.num_vertices(),
            self.working.num_edges()
        );

        self.initialize_priorities();

        while !self.working.is_empty() {
            let mut batch = self.find_independent_set(BATCH_SIZE);

            if batch.is_empty() {
                // Nothing independent among the candidates; fall back to the
                // single best-priority vertex still alive.
                while let Some((vertex, _)) = self.priorities.pop() {
                    if self.working.contains_vertex(vertex) {
                        batch.push(vertex);
                        break;
                    }
                }
                if batch.is_empty() {
                    break;
                }
            }

            debug!("contracting batch of {}", batch.len());

            let shortcuts = self.collect_shortcuts(&batch);
            self.apply_shortcuts(shortcuts);
            let affected = self.contract_batch(&batch);
            self.recompute_priorities(affected);
        }

        info!(
            "contraction finished, {} shortcuts added",
            self.shortcuts_added
        );

        ContractionHierarchy::from_parts(
            self.contraction_order,
            self.upwards,
            self.downwards,
            self.shortcuts_added,
        )
    }

    fn initialize_priorities(&mut self) {
        let working = &self.working;
        let ids: Vec<VertexId> = working.vertex_ids().collect();
        let priorities: Vec<(VertexId, f64)> = ids
            .par_iter()
            .map(|&vertex| (vertex, priority(working, vertex)))
            .collect();
        for (vertex, value) in priorities {
            self.priorities.push(vertex, value);
        }
    }

    /// Pops candidates until `max_size` mutually independent vertices are
    /// found. Candidates violating independence are re-queued afterwards.
    fn find_independent_set(&mut self, max_size: usize) -> Vec<VertexId> {
        let mut set = Vec::new();
        let mut in_set: FxHashSet<VertexId> = FxHashSet::default();
        let mut neighbors_of_set: FxHashSet<VertexId> = FxHashSet::default();
        let mut held_back: Vec<(VertexId, f64)> = Vec::new();

        while set.len() < max_size {
            let Some((vertex, value)) = self.priorities.pop() else {
                break;
            };
            if !self.working.contains_vertex(vertex) {
                continue;
            }

            let independent = !neighbors_of_set.contains(&vertex)
                && self
                    .working
                    .neighbors(vertex)
                    .all(|n| !in_set.contains(&n) && !neighbors_of_set.contains(&n));

            if independent {
                in_set.insert(vertex);
                neighbors_of_set.extend(self.working.neighbors(vertex));
                set.push(vertex);
            } else {
                held_back.push((vertex, value));
            }
        }

        for (vertex, value) in held_back {
            self.priorities.push(vertex, value);
        }
        set
    }

    /// Computes the shortcuts every batch member requires, in parallel. The
    /// independence constraint keeps the read neighborhoods disjoint.
    fn collect_shortcuts(&self, batch: &[VertexId]) -> Vec<Shortcut> {
        let working = &self.working;
        batch
            .par_iter()
            .flat_map_iter(|&vertex| required_shortcuts(working, vertex))
            .collect()
    }

    fn apply_shortcuts(&mut self, shortcuts: Vec<Shortcut>) {
        for shortcut in shortcuts {
            self.shortcuts_added += 1;
            match self.working.add_edge(
                shortcut.from,
                shortcut.to,
                shortcut.weight,
                Some(shortcut.via),
            ) {
                Ok(()) => {
                    self.working
                        .add_edge(shortcut.to, shortcut.from, shortcut.weight, Some(shortcut.via))
                        .unwrap_or_else(|err| {
                            panic!(
                                "mirroring shortcut {} -> {}: {err}",
                                shortcut.to, shortcut.from
                            )
                        });
                }
                Err(GraphError::EdgeAlreadyExists) => {
                    let existing = self
                        .working
                        .edge(shortcut.from, shortcut.to)
                        .expect("existing edge just reported")
                        .weight;
                    if shortcut.weight < existing {
                        for (from, to) in [
                            (shortcut.from, shortcut.to),
                            (shortcut.to, shortcut.from),
                        ] {
                            self.working
                                .update_edge(from, to, shortcut.weight, Some(shortcut.via))
                                .unwrap_or_else(|err| {
                                    panic!("updating shortcut {from} -> {to}: {err}")
                                });
                        }
                    }
                }
                Err(err) => panic!(
                    "inserting shortcut {} -> {}: {err}",
                    shortcut.from, shortcut.to
                ),
            }
        }
    }

    /// Moves each batch member's remaining edges into the upward and downward
    /// graphs and removes the member from the working graph. Returns the
    /// surviving neighbors whose priorities are now stale.
    fn contract_batch(&mut self, batch: &[VertexId]) -> FxHashSet<VertexId> {
        let mut affected: FxHashSet<VertexId> = FxHashSet::default();

        for &vertex in batch {
            self.contraction_order.push(vertex);
            self.contracted.insert(vertex);

            let edges: Vec<_> = self.working.edges_from(vertex).copied().collect();
            for edge in edges {
                affected.insert(edge.target);

                let (up, down) = if self.contracted.contains(&edge.target) {
                    // Contracted earlier means ranked below this vertex.
                    ((edge.target, vertex), (vertex, edge.target))
                } else {
                    ((vertex, edge.target), (edge.target, vertex))
                };
                self.upwards
                    .add_edge(up.0, up.1, edge.weight, edge.via)
                    .unwrap_or_else(|err| panic!("moving edge {} -> {} up: {err}", up.0, up.1));
                self.downwards
                    .add_edge(down.0, down.1, edge.weight, edge.via)
                    .unwrap_or_else(|err| {
                        panic!("moving edge {} -> {} down: {err}", down.0, down.1)
                    });

                self.working
                    .remove_edge(vertex, edge.target)
                    .unwrap_or_else(|err| panic!("detaching contracted vertex {vertex}: {err}"));
                self.working
                    .remove_edge(edge.target, vertex)
                    .unwrap_or_else(|err| panic!("detaching contracted vertex {vertex}: {err}"));
            }

            self.working
                .remove_vertex_strict(vertex)
                .unwrap_or_else(|err| panic!("removing contracted vertex {vertex}: {err}"));
        }

        affected
    }

    fn recompute_priorities(&mut self, affected: FxHashSet<VertexId>) {
        let working = &self.working;
        let alive: Vec<VertexId> = affected
            .into_iter()
            .filter(|&n| working.contains_vertex(n))
            .collect();
        let updates: Vec<(VertexId, f64)> = alive
            .par_iter()
            .map(|&vertex| (vertex, priority(working, vertex)))
            .collect();
        for (vertex, value) in updates {
            self.priorities.update(vertex, value);
        }
    }
}

/// Contraction priority: edge difference plus a term favoring sparse stars.
/// `shortcuts` counts ordered neighbor pairs that would need a shortcut.
fn priority(g: &Graph, vertex: VertexId) -> f64 {
    let degree = g.degree(vertex) as f64;
    let shortcuts = (2 * required_shortcuts(g, vertex).len()) as f64;
    (shortcuts - degree) + shortcuts / (degree + 1.0)
}

/// Shortcuts that contracting `vertex` would require right now. For each
/// neighbor pair the direct search decides whether a cheaper route exists,
/// and a failed witness search (avoiding `vertex`) makes the shortcut
/// necessary.
fn required_shortcuts(g: &Graph, vertex: VertexId) -> Vec<Shortcut> {
    let neighbors: Vec<VertexId> = g.neighbors(vertex).collect();
    let mut shortcuts = Vec::new();

    for (i, &from) in neighbors.iter().enumerate() {
        for &to in &neighbors[i + 1..] {
            let first_leg = g
                .edge(vertex, from)
                .unwrap_or_else(|| panic!("missing incident edge {vertex} -> {from}"))
                .weight;
            let second_leg = g
                .edge(vertex, to)
                .unwrap_or_else(|| panic!("missing incident edge {vertex} -> {to}"))
                .weight;
            let via_cost = add_weights(first_leg, second_leg);

            // A path strictly cheaper than the route through `vertex` makes
            // the shortcut pointless.
            if Dijkstra::new(g).search(from, to, via_cost, None).is_ok() {
                continue;
            }

            if !witness_exists(g, from, to, via_cost, vertex) {
                shortcuts.push(Shortcut {
                    from,
                    to,
                    weight: via_cost,
                    via: vertex,
                });
            }
        }
    }

    shortcuts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INFINITY;
    use crate::hierarchy::QueryError;
    use crate::util::test_graphs::{
        bypass_graph, disconnected_graph, dominant_edge_graph, graph_from_edges, triangle_graph,
        weighted_mesh_graph,
    };

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rank_of(ch: &ContractionHierarchy) -> impl Fn(VertexId) -> usize + '_ {
        move |vertex| {
            ch.contraction_order
                .iter()
                .position(|&v| v == vertex)
                .expect("vertex missing from contraction order")
        }
    }

    #[test]
    fn triangle_detour_gets_shortcut() {
        init();
        let g = triangle_graph();
        let ch = NodeContractor::new(&g).run();

        let result = ch.query(1, 2).unwrap();
        assert_eq!(vec![1, 0, 2], result.path);
        assert_eq!(2, result.weight);
    }

    #[test]
    fn dominant_direct_edge_needs_no_shortcut() {
        init();
        let g = dominant_edge_graph();
        let ch = NodeContractor::new(&g).run();

        let result = ch.query(1, 2).unwrap();
        assert_eq!(vec![1, 2], result.path);
        assert_eq!(1, result.weight);

        for (up, down) in [(&ch.upwards, &ch.downwards), (&ch.downwards, &ch.upwards)] {
            for source in [1, 2] {
                for target in [1, 2] {
                    if let Some(edge) = up.edge(source, target) {
                        assert!(!edge.is_shortcut());
                        assert_eq!(Some(edge.weight), down.edge(target, source).map(|e| e.weight));
                    }
                }
            }
        }
    }

    #[test]
    fn disconnected_components_stay_apart() {
        init();
        let g = disconnected_graph();
        let ch = NodeContractor::new(&g).run();

        assert_eq!(Err(QueryError::TargetUnreachable), ch.query(0, 3));
        let result = ch.query(2, 3).unwrap();
        assert_eq!(vec![2, 3], result.path);
        assert_eq!(1, result.weight);
    }

    #[test]
    fn bypass_route_survives_contraction() {
        init();
        let g = bypass_graph();
        let ch = NodeContractor::new(&g).run();

        let result = ch.query(0, 3).unwrap();
        assert_eq!(vec![0, 4, 5, 1, 2, 3], result.path);
        assert_eq!(23, result.weight);
    }

    #[test]
    fn empty_graph_preprocesses() {
        let ch = NodeContractor::new(&Graph::new()).run();
        assert!(ch.contraction_order.is_empty());
        assert_eq!(0, ch.shortcuts_added());
        assert_eq!(Err(QueryError::TargetUnreachable), ch.query(0, 1));
        assert_eq!(Err(QueryError::TargetUnreachable), ch.query(0, 0));
    }

    #[test]
    fn single_vertex_graph() {
        let g = graph_from_edges(1, &[]);
        let ch = NodeContractor::new(&g).run();
        let result = ch.query(0, 0).unwrap();
        assert_eq!(vec![0], result.path);
        assert_eq!(0, result.weight);
    }

    #[test]
    fn order_is_a_permutation_and_edges_point_up() {
        init();
        let g = weighted_mesh_graph();
        let ch = NodeContractor::new(&g).run();

        assert_eq!(g.num_vertices(), ch.contraction_order.len());
        let mut sorted = ch.contraction_order.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(g.num_vertices(), sorted.len());

        let rank = rank_of(&ch);
        for (source, edge) in ch.upwards.all_edges() {
            assert!(rank(source) < rank(edge.target), "{source} -> {}", edge.target);
            let mirror = ch
                .downwards
                .edge(edge.target, source)
                .expect("downward mirror missing");
            assert_eq!(edge.weight, mirror.weight);
            assert_eq!(edge.via, mirror.via);
        }
        for (source, edge) in ch.downwards.all_edges() {
            assert!(rank(source) > rank(edge.target), "{source} -> {}", edge.target);
        }
    }

    #[test]
    fn shortcut_weights_decompose() {
        init();
        let g = weighted_mesh_graph();
        let ch = NodeContractor::new(&g).run();

        for (source, edge) in ch.upwards.all_edges() {
            let Some(via) = edge.via else { continue };
            let first = ch
                .upwards
                .edge(source, via)
                .or_else(|| ch.downwards.edge(source, via))
                .expect("first shortcut leg missing")
                .weight;
            let second = ch
                .upwards
                .edge(via, edge.target)
                .or_else(|| ch.downwards.edge(via, edge.target))
                .expect("second shortcut leg missing")
                .weight;
            assert_eq!(edge.weight, add_weights(first, second));
        }
    }

    #[test]
    fn queries_match_plain_dijkstra() {
        init();
        let g = weighted_mesh_graph();
        let ch = NodeContractor::new(&g).run();

        let ids: Vec<VertexId> = {
            let mut ids: Vec<VertexId> = g.vertex_ids().collect();
            ids.sort_unstable();
            ids
        };

        for &source in &ids {
            for &target in &ids {
                let baseline = Dijkstra::new(&g).search(source, target, INFINITY, None);
                match ch.query(source, target) {
                    Ok(result) => {
                        let baseline = baseline.expect("hierarchy found a path where none exists");
                        assert_eq!(
                            baseline.weight, result.weight,
                            "query({source}, {target})"
                        );
                        // The unpacked path is made of original edges whose
                        // weights sum to the reported cost.
                        let mut total = 0;
                        for pair in result.path.windows(2) {
                            let edge = g.edge(pair[0], pair[1]).expect("non-original edge in path");
                            assert!(!edge.is_shortcut());
                            total += edge.weight;
                        }
                        assert_eq!(result.weight, total);
                    }
                    Err(QueryError::TargetUnreachable) => assert!(baseline.is_err()),
                    Err(err) => panic!("query({source}, {target}): {err}"),
                }
            }
        }
    }
}
