//! Immutable result of CH preprocessing and the shared query error type.

use std::fmt;

use crate::graph::{Graph, GraphError, VertexId};
use crate::path_unpacking::unpack_path;
use crate::search::bidir_dijkstra::BidirDijkstra;
use crate::search::shortest_path::QueryResult;
use crate::search::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    TargetUnreachable,
    /// A hierarchy edge referenced during unpacking is missing. Indicates a
    /// corrupted or hand-edited hierarchy, not bad query input.
    MalformedHierarchy(GraphError),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::TargetUnreachable => f.write_str("target vertex not reachable from source"),
            QueryError::MalformedHierarchy(err) => write!(f, "malformed hierarchy: {err}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<SearchError> for QueryError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::TargetUnreachable => QueryError::TargetUnreachable,
        }
    }
}

impl From<GraphError> for QueryError {
    fn from(err: GraphError) -> Self {
        QueryError::MalformedHierarchy(err)
    }
}

/// Upward/downward split of the road graph produced by contraction. Owns both
/// graphs exclusively; queries borrow it read-only.
pub struct ContractionHierarchy {
    pub contraction_order: Vec<VertexId>,
    pub upwards: Graph,
    pub downwards: Graph,
    shortcuts_added: usize,
}

impl ContractionHierarchy {
    pub(crate) fn from_parts(
        contraction_order: Vec<VertexId>,
        upwards: Graph,
        downwards: Graph,
        shortcuts_added: usize,
    ) -> Self {
        ContractionHierarchy {
            contraction_order,
            upwards,
            downwards,
            shortcuts_added,
        }
    }

    /// Number of shortcuts inserted while this hierarchy was built.
    pub fn shortcuts_added(&self) -> usize {
        self.shortcuts_added
    }

    /// Point-to-point query: bidirectional search over the hierarchy, then
    /// shortcut expansion back to road edges.
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
