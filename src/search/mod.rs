use std::fmt;

use rustc_hash::FxHashMap;

use crate::graph::VertexId;

pub mod bidir_dijkstra;
pub mod dijkstra;
pub mod shortest_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    /// No path to the target exists within the search bound.
    TargetUnreachable,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::TargetUnreachable => f.write_str("target vertex not reachable from source"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Walks the predecessor chain from `target` back to `source`.
pub(crate) fn build_path(
    predecessors: &FxHashMap<VertexId, VertexId>,
    source: VertexId,
    target: VertexId,
) -> Result<Vec<VertexId>, SearchError> {
    let mut path = vec![target];
    let mut current = target;
    while current != source {
        let &previous = predecessors
            .get(&current)
            .ok_or(SearchError::TargetUnreachable)?;
        path.push(previous);
        current = previous;
    }
    path.reverse();
    Ok(path)
}
