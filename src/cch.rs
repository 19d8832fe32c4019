//! Metric-independent CCH preprocessing.
//!
//! The contraction order comes from an external nested-dissection tool, so no
//! priority search happens here. Preprocessing only fixes the topology: it
//! orients every road edge from lower to higher rank and inserts the shortcut
//! skeleton that contraction in rank order induces. Weights stay untouched
//! until [`Cch::customize`](crate::customization) runs.

use std::fmt;

use log::info;
use rustc_hash::FxHashMap;

use crate::constants::INFINITY;
use crate::graph::{Graph, VertexId};
use crate::hierarchy::QueryError;
use crate::path_unpacking::unpack_path;
use crate::search::bidir_dijkstra::BidirDijkstra;
use crate::search::shortest_path::QueryResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingError {
    LengthMismatch { expected: usize, found: usize },
    UnknownVertex(VertexId),
    DuplicateVertex(VertexId),
    /// A line of the ordering file could not be interpreted.
    Malformed { line: usize },
}

impl fmt::Display for OrderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderingError::LengthMismatch { expected, found } => write!(
                f,
                "ordering lists {found} vertices, graph has {expected}"
            ),
            OrderingError::UnknownVertex(id) => {
                write!(f, "ordering references unknown vertex {id}")
            }
            OrderingError::DuplicateVertex(id) => {
                write!(f, "ordering references vertex {id} twice")
            }
            OrderingError::Malformed { line } => {
                write!(f, "malformed ordering entry on line {line}")
            }
        }
    }
}

impl std::error::Error for OrderingError {}

/// Customizable contraction hierarchy: fixed topology, swappable metric.
pub struct Cch {
    pub contraction_order: Vec<VertexId>,
    /// Rank per vertex; position in `contraction_order`, kept for O(1) lookup.
    pub contraction_map: FxHashMap<VertexId, usize>,
    pub upwards: Graph,
    pub downwards: Graph,
}

impl Cch {
    /// Builds the hierarchy topology for `g` under the supplied contraction
    /// order (position 0 is contracted first).
    pub fn preprocess(g: &Graph, order: &[VertexId]) -> Result<Cch, OrderingError> {
        let contraction_map = validate_ordering(g, order)?;

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

        // Each undirected pair is seeded once, from its lower-ranked side;
        // the antiparallel twin of the input models the same road segment.
        for (source, edge) in g.all_edges() {
            if contraction_map[&source] < contraction_map[&edge.target] {
                upwards
                    .add_edge(source, edge.target, edge.weight, None)
                    .unwrap_or_else(|err| {
                        panic!("seeding edge {source} -> {}: {err}", edge.target)
                    });
                downwards
                    .add_edge(edge.target, source, edge.weight, None)
                    .unwrap_or_else(|err| {
                        panic!("seeding edge {} -> {source}: {err}", edge.target)
                    });
            }
        }

        let mut shortcuts = 0usize;

        // Elimination in rank order: every pair of higher-ranked neighbors of
        // the contracted vertex must be connected. New shortcuts start at
        // INFINITY and wait for customization.
        for &apex in order {
            let higher: Vec<VertexId> = upwards.neighbors(apex).collect();
            for (i, &a) in higher.iter().enumerate() {
                for &b in &higher[i + 1..] {
                    let (low, high) = if contraction_map[&a] < contraction_map[&b] {
                        (a, b)
                    } else {
                        (b, a)
                    };
                    if upwards.adjacent(low, high) {
                        continue;
                    }
                    upwards
                        .add_edge(low, high, INFINITY, Some(apex))
                        .unwrap_or_else(|err| panic!("adding shortcut {low} -> {high}: {err}"));
                    downwards
                        .add_edge(high, low, INFINITY, Some(apex))
                        .unwrap_or_else(|err| panic!("adding shortcut {high} -> {low}: {err}"));
                    shortcuts += 1;
                }
            }
        }

        info!(
            "CCH topology ready: {} vertices, {} upward edges, {} skeleton shortcuts",
            upwards.num_vertices(),
            upwards.num_edges(),
            shortcuts
        );

        Ok(Cch {
            contraction_order: order.to_vec(),
            contraction_map,
            upwards,
            downwards,
        })
    }

    pub fn rank(&self, vertex: VertexId) -> Option<usize> {
        self.contraction_map.get(&vertex).copied()
    }

    /// Point-to-point query over the customized hierarchy.
    pub fn query(&self, source: VertexId, target: VertexId) -> Result<QueryResult, QueryError> {
        let mut search = BidirDijkstra::new(&self.upwards);
        let hierarchy_path = search.search(source, target)?;
        let path = unpack_path(&self.upwards, &self.downwards, &hierarchy_path.vertices)?;
        Ok(QueryResult {
            path,
            weight: hierarchy_path.weight,
            nodes_popped: search.stats.nodes_popped,
        })
    }
}

/// Checks that `order` is a permutation of the graph's vertices and returns
/// the rank lookup table.
pub(crate) fn validate_ordering(
    g: &Graph,
    order: &[VertexId],
) -> Result<FxHashMap<VertexId, usize>, OrderingError> {
    if order.len() != g.num_vertices() {
        return Err(OrderingError::LengthMismatch {
            expected: g.num_vertices(),
            found: order.len(),
        });
    }

    let mut map =
        FxHashMap::with_capacity_and_hasher(order.len(), Default::default());
    for (rank, &vertex) in order.iter().enumerate() {
        if !g.contains_vertex(vertex) {
            return Err(OrderingError::UnknownVertex(vertex));
        }
        if map.insert(vertex, rank).is_some() {
            return Err(OrderingError::DuplicateVertex(vertex));
        }
    }
    Ok(map)
}
