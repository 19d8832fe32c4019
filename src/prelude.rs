//! Re-exports of the most commonly used items in `ch_engine`.

pub use crate::cch::Cch;
pub use crate::constants::{Weight, INFINITY};
pub use crate::graph::{Graph, GraphError, Vertex, VertexId};
pub use crate::hierarchy::{ContractionHierarchy, QueryError};
pub use crate::node_contraction::NodeContractor;
pub use crate::parser::{load_network, load_ordering, RoadNetwork};
pub use crate::search::shortest_path::QueryResult;

pub use crate::search;
