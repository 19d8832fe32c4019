//! Hand-built graphs shared by tests and benches.

use crate::constants::Weight;
use crate::graph::{Graph, Vertex, VertexId};

/// Graph with vertices `0..num_vertices` and one undirected road edge per
/// `(u, v, weight)` entry.
pub fn graph_from_edges(num_vertices: i64, edges: &[(VertexId, VertexId, Weight)]) -> Graph {
    let mut g = Graph::new();
    for id in 0..num_vertices {
        g.add_vertex(Vertex::new(id, 0.0, 0.0)).unwrap();
    }
    for &(u, v, weight) in edges {
        g.add_edge_undirected(u, v, weight).unwrap();
    }
    g
}

/// Triangle where the direct road between 1 and 2 is dominated by the detour
/// over 0.
pub fn triangle_graph() -> Graph {
    graph_from_edges(3, &[(0, 1, 1), (0, 2, 1), (1, 2, 5)])
}

/// Triangle where the direct road between 1 and 2 wins.
pub fn dominant_edge_graph() -> Graph {
    graph_from_edges(3, &[(0, 1, 10), (0, 2, 1), (1, 2, 1)])
}

/// Two components: 0 - 1 and 2 - 3.
pub fn disconnected_graph() -> Graph {
    graph_from_edges(4, &[(0, 1, 1), (2, 3, 1)])
}

/// Four vertices in a cycle, all roads weight 10.
pub fn diamond_graph() -> Graph {
    graph_from_edges(4, &[(0, 1, 10), (0, 2, 10), (1, 3, 10), (2, 3, 10)])
}

/// Chain 0 - 1 - 2 - 3 with a cheap bypass 0 - 4 - 5 - 1.
pub fn bypass_graph() -> Graph {
    graph_from_edges(
        6,
        &[
            (0, 1, 10),
            (1, 2, 10),
            (2, 3, 10),
            (0, 4, 1),
            (4, 5, 1),
            (5, 1, 1),
        ],
    )
}

/// Eleven vertices with mixed weights and plenty of alternative routes.
pub fn weighted_mesh_graph() -> Graph {
    graph_from_edges(
        11,
        &[
            (0, 1, 3),
            (0, 2, 5),
            (0, 10, 3),
            (1, 3, 5),
            (1, 2, 3),
            (2, 3, 2),
            (2, 9, 2),
            (3, 9, 4),
            (3, 4, 7),
            (4, 9, 3),
            (4, 5, 6),
            (5, 7, 2),
            (5, 6, 4),
            (6, 7, 3),
            (6, 8, 5),
            (7, 8, 3),
            (7, 9, 2),
            (8, 9, 4),
            (8, 10, 6),
            (9, 10, 3),
        ],
    )
}

/// Rectangular grid with deterministic mixed weights, for benches and larger
/// equivalence tests.
pub fn grid_graph(width: i64, height: i64) -> Graph {
    let mut g = Graph::new();
    for id in 0..width * height {
        g.add_vertex(Vertex::new(id, 0.0, 0.0)).unwrap();
    }
    for row in 0..height {
        for col in 0..width {
            let id = row * width + col;
            if col + 1 < width {
                g.add_edge_undirected(id, id + 1, 1 + (id % 3)).unwrap();
            }
            if row + 1 < height {
                g.add_edge_undirected(id, id + width, 1 + (id % 5)).unwrap();
            }
        }
    }
    g
}
