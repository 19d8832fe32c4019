//! Mutable road graph keyed by stable vertex ids.
//!
//! The graph stores a vertex table and a two-level adjacency map
//! (`source -> target -> edge`). A reverse neighbor index is maintained so
//! that removing a vertex only touches its incident edges. Undirected road
//! edges are modeled as antiparallel directed pairs.

use std::fmt;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::constants::Weight;

/// Stable vertex identifier, assigned by the input layer. Dense but not
/// necessarily contiguous.
pub type VertexId = i64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    pub lat: f64,
    pub lon: f64,
}

impl Vertex {
    pub fn new(id: VertexId, lat: f64, lon: f64) -> Self {
        Vertex { id, lat, lon }
    }
}

/// Directed edge. `via` names the vertex a shortcut bypasses; original road
/// edges carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub target: VertexId,
    pub weight: Weight,
    pub via: Option<VertexId>,
}

impl Edge {
    pub fn is_shortcut(&self) -> bool {
        self.via.is_some()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.via {
            Some(via) => write!(f, "-> {} ({}, via {})", self.target, self.weight, via),
            None => write!(f, "-> {} ({})", self.target, self.weight),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    VertexNotFound,
    VertexAlreadyExists,
    VertexHasEdges,
    EdgeNotFound,
    EdgeAlreadyExists,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            GraphError::VertexNotFound => "vertex not found",
            GraphError::VertexAlreadyExists => "vertex already exists",
            GraphError::VertexHasEdges => "vertex still has incident edges",
            GraphError::EdgeNotFound => "edge not found",
            GraphError::EdgeAlreadyExists => "edge already exists",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for GraphError {}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: FxHashMap<VertexId, Vertex>,
    edges: FxHashMap<VertexId, FxHashMap<VertexId, Edge>>,
    // target -> sources with an edge into it; keeps vertex removal linear in
    // incident edges.
    incoming: FxHashMap<VertexId, FxHashSet<VertexId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.values().map(|targets| targets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys().copied()
    }

    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<(), GraphError> {
        if self.vertices.contains_key(&vertex.id) {
            return Err(GraphError::VertexAlreadyExists);
        }
        self.vertices.insert(vertex.id, vertex);
        Ok(())
    }

    /// Removes a vertex together with all of its incident edges.
    pub fn remove_vertex(&mut self, id: VertexId) -> Result<(), GraphError> {
        if !self.vertices.contains_key(&id) {
            return Err(GraphError::VertexNotFound);
        }

        if let Some(targets) = self.edges.remove(&id) {
            for target in targets.keys() {
                if let Some(sources) = self.incoming.get_mut(target) {
                    sources.remove(&id);
                    if sources.is_empty() {
                        self.incoming.remove(target);
                    }
                }
            }
        }
        if let Some(sources) = self.incoming.remove(&id) {
            for source in sources {
                if let Some(targets) = self.edges.get_mut(&source) {
                    targets.remove(&id);
                    if targets.is_empty() {
                        self.edges.remove(&source);
                    }
                }
            }
        }

        self.vertices.remove(&id);
        Ok(())
    }

    /// Removes a vertex, refusing to orphan edges. The contraction loop uses
    /// this after it has rerouted every incident edge; a leftover edge here is
    /// a bug, not bad input.
    pub fn remove_vertex_strict(&mut self, id: VertexId) -> Result<(), GraphError> {
        if !self.vertices.contains_key(&id) {
            return Err(GraphError::VertexNotFound);
        }
        let has_outgoing = self.edges.get(&id).map_or(false, |t| !t.is_empty());
        let has_incoming = self.incoming.get(&id).map_or(false, |s| !s.is_empty());
        if has_outgoing || has_incoming {
            return Err(GraphError::VertexHasEdges);
        }
        self.edges.remove(&id);
        self.incoming.remove(&id);
        self.vertices.remove(&id);
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        weight: Weight,
        via: Option<VertexId>,
    ) -> Result<(), GraphError> {
        if !self.vertices.contains_key(&source) || !self.vertices.contains_key(&target) {
            return Err(GraphError::VertexNotFound);
        }

        let targets = self.edges.entry(source).or_default();
        if targets.contains_key(&target) {
            return Err(GraphError::EdgeAlreadyExists);
        }
        targets.insert(target, Edge { target, weight, via });
        self.incoming.entry(target).or_default().insert(source);
        Ok(())
    }

    /// Replaces the stored edge record wholesale.
    pub fn update_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        weight: Weight,
        via: Option<VertexId>,
    ) -> Result<(), GraphError> {
        let edge = self
            .edges
            .get_mut(&source)
            .and_then(|targets| targets.get_mut(&target))
            .ok_or(GraphError::EdgeNotFound)?;
        *edge = Edge { target, weight, via };
        Ok(())
    }

    pub fn remove_edge(&mut self, source: VertexId, target: VertexId) -> Result<(), GraphError> {
        let targets = self.edges.get_mut(&source).ok_or(GraphError::EdgeNotFound)?;
        if targets.remove(&target).is_none() {
            return Err(GraphError::EdgeNotFound);
        }
        if targets.is_empty() {
            self.edges.remove(&source);
        }
        if let Some(sources) = self.incoming.get_mut(&target) {
            sources.remove(&source);
            if sources.is_empty() {
                self.incoming.remove(&target);
            }
        }
        Ok(())
    }

    pub fn edge(&self, source: VertexId, target: VertexId) -> Option<&Edge> {
        self.edges.get(&source)?.get(&target)
    }

    pub fn adjacent(&self, source: VertexId, target: VertexId) -> bool {
        self.edge(source, target).is_some()
    }

    /// Out-neighbors of a vertex, in unspecified order. Empty for unknown ids.
    pub fn neighbors(&self, source: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.edges
            .get(&source)
            .into_iter()
            .flat_map(|targets| targets.keys().copied())
    }

    /// Outgoing edges of a vertex, in unspecified order.
    pub fn edges_from(&self, source: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .get(&source)
            .into_iter()
            .flat_map(|targets| targets.values())
    }

    /// All directed edges as `(source, edge)` pairs.
    pub fn all_edges(&self) -> impl Iterator<Item = (VertexId, &Edge)> + '_ {
        self.edges
            .iter()
            .flat_map(|(&source, targets)| targets.values().map(move |edge| (source, edge)))
    }

    pub fn degree(&self, source: VertexId) -> usize {
        self.edges.get(&source).map_or(0, |targets| targets.len())
    }

    /// Adds the antiparallel pair modeling one undirected road edge.
    pub fn add_edge_undirected(
        &mut self,
        u: VertexId,
        v: VertexId,
        weight: Weight,
    ) -> Result<(), GraphError> {
        self.add_edge(u, v, weight, None)?;
        self.add_edge(v, u, weight, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_vertices() -> Graph {
        let mut g = Graph::new();
        g.add_vertex(Vertex::new(0, 0.0, 0.0)).unwrap();
        g.add_vertex(Vertex::new(1, 0.0, 0.0)).unwrap();
        g
    }

    #[test]
    fn duplicate_vertex_is_rejected() {
        let mut g = two_vertices();
        assert_eq!(
            Err(GraphError::VertexAlreadyExists),
            g.add_vertex(Vertex::new(0, 1.0, 1.0))
        );
        // The original record is untouched.
        assert_eq!(0.0, g.vertex(0).unwrap().lat);
    }

    #[test]
    fn add_edge_requires_both_endpoints() {
        let mut g = two_vertices();
        assert_eq!(Err(GraphError::VertexNotFound), g.add_edge(0, 7, 1, None));
        assert_eq!(Err(GraphError::VertexNotFound), g.add_edge(7, 0, 1, None));
        assert!(g.add_edge(0, 1, 3, None).is_ok());
        assert_eq!(Err(GraphError::EdgeAlreadyExists), g.add_edge(0, 1, 5, None));
        assert_eq!(3, g.edge(0, 1).unwrap().weight);
    }

    #[test]
    fn update_edge_replaces_record() {
        let mut g = two_vertices();
        assert_eq!(Err(GraphError::EdgeNotFound), g.update_edge(0, 1, 2, None));
        g.add_edge(0, 1, 3, None).unwrap();
        g.update_edge(0, 1, 9, Some(5)).unwrap();
        let edge = g.edge(0, 1).unwrap();
        assert_eq!(9, edge.weight);
        assert_eq!(Some(5), edge.via);
        assert!(edge.is_shortcut());
    }

    #[test]
    fn remove_edge_both_directions_independently() {
        let mut g = two_vertices();
        g.add_edge_undirected(0, 1, 1).unwrap();
        g.remove_edge(0, 1).unwrap();
        assert!(!g.adjacent(0, 1));
        assert!(g.adjacent(1, 0));
        assert_eq!(Err(GraphError::EdgeNotFound), g.remove_edge(0, 1));
    }

    #[test]
    fn remove_vertex_drops_incident_edges() {
        let mut g = two_vertices();
        g.add_vertex(Vertex::new(2, 0.0, 0.0)).unwrap();
        g.add_edge_undirected(0, 1, 1).unwrap();
        g.add_edge(2, 0, 4, None).unwrap();

        g.remove_vertex(0).unwrap();
        assert!(!g.contains_vertex(0));
        assert!(!g.adjacent(1, 0));
        assert!(!g.adjacent(2, 0));
        assert_eq!(0, g.degree(2));
        assert_eq!(Err(GraphError::VertexNotFound), g.remove_vertex(0));
    }

    #[test]
    fn strict_removal_refuses_connected_vertex() {
        let mut g = two_vertices();
        g.add_edge(0, 1, 1, None).unwrap();
        assert_eq!(Err(GraphError::VertexHasEdges), g.remove_vertex_strict(0));
        assert_eq!(Err(GraphError::VertexHasEdges), g.remove_vertex_strict(1));
        g.remove_edge(0, 1).unwrap();
        g.remove_vertex_strict(0).unwrap();
        g.remove_vertex_strict(1).unwrap();
        assert!(g.is_empty());
    }

    #[test]
    fn neighbors_and_degree() {
        let mut g = two_vertices();
        g.add_vertex(Vertex::new(2, 0.0, 0.0)).unwrap();
        g.add_edge(0, 1, 1, None).unwrap();
        g.add_edge(0, 2, 1, None).unwrap();

        let mut neighbors: Vec<VertexId> = g.neighbors(0).collect();
        neighbors.sort_unstable();
        assert_eq!(vec![1, 2], neighbors);
        assert_eq!(2, g.degree(0));
        assert_eq!(0, g.degree(1));
        assert_eq!(0, g.neighbors(42).count());
    }
}
