//! Recursive expansion of shortcut hops into original road edges.

use crate::graph::{Graph, GraphError, VertexId};

/// Re-expresses a hierarchy path using only original edges. Consecutive pairs
/// are looked up in the upward graph first, then the downward graph.
pub fn unpack_path(
    upwards: &Graph,
    downwards: &Graph,
    path: &[VertexId],
) -> Result<Vec<VertexId>, GraphError> {
    if path.len() < 2 {
        return Ok(path.to_vec());
    }

    let mut full_path = vec![path[0]];
    for pair in path.windows(2) {
        let segment = unpack_edge(upwards, downwards, pair[0], pair[1])?;
        full_path.extend_from_slice(&segment[1..]);
    }
    Ok(full_path)
}

fn unpack_edge(
    upwards: &Graph,
    downwards: &Graph,
    u: VertexId,
    v: VertexId,
) -> Result<Vec<VertexId>, GraphError> {
    let edge = upwards
        .edge(u, v)
        .or_else(|| downwards.edge(u, v))
        .ok_or(GraphError::EdgeNotFound)?;

    let Some(via) = edge.via else {
        return Ok(vec![u, v]);
    };

    let mut unpacked = unpack_edge(upwards, downwards, u, via)?;
    let second = unpack_edge(upwards, downwards, via, v)?;
    unpacked.extend_from_slice(&second[1..]);
    Ok(unpacked)
}
