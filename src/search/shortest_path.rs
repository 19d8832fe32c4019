use serde::{Deserialize, Serialize};

use crate::constants::Weight;
use crate::graph::VertexId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath {
    pub vertices: Vec<VertexId>,
    pub weight: Weight,
}

impl ShortestPath {
    pub fn new(vertices: Vec<VertexId>, weight: Weight) -> Self {
        ShortestPath { vertices, weight }
    }
}

/// Answer of a hierarchy query, in the shape an API layer serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    pub path: Vec<VertexId>,
    pub weight: Weight,
    pub nodes_popped: usize,
}
