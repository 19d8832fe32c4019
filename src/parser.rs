//! Text formats at the system boundary: the plain node/edge road-network
//! format, nested-dissection ordering files and the METIS export consumed by
//! the external ordering tool.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use rustc_hash::FxHashMap;

use crate::cch::{validate_ordering, OrderingError};
use crate::graph::{Graph, GraphError, Vertex, VertexId};

/// A parsed road network together with the counts its header declared.
pub struct RoadNetwork {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub graph: Graph,
}

pub fn load_network(path: &Path) -> Result<RoadNetwork> {
    let file =
        File::open(path).with_context(|| format!("opening network file {}", path.display()))?;
    parse_network(BufReader::new(file))
        .with_context(|| format!("parsing network file {}", path.display()))
}

/// Parses the plain text road-network format: a node-count line, an
/// edge-count line, then three-token node lines (`id lat lon`) and two-token
/// edge lines (`src tgt`). Every edge line yields both directions with
/// weight 1. Self-loops and repeated edge lines are skipped.
pub fn parse_network<R: BufRead>(reader: R) -> Result<RoadNetwork> {
    let mut lines = reader.lines();

    let num_nodes: usize = lines
        .next()
        .context("missing node count")??
        .trim()
        .parse()
        .context("node count is not a number")?;
    let num_edges: usize = lines
        .next()
        .context("missing edge count")??
        .trim()
        .parse()
        .context("edge count is not a number")?;

    let mut graph = Graph::new();

    for line in lines {
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.len() {
            0 => continue,
            3 => {
                let id: VertexId = fields[0].parse().context("node id")?;
                let lat: f64 = fields[1].parse().context("node latitude")?;
                let lon: f64 = fields[2].parse().context("node longitude")?;
                // Repeated node lines keep the first record.
                let _ = graph.add_vertex(Vertex::new(id, lat, lon));
            }
            2 => {
                let source: VertexId = fields[0].parse().context("edge source")?;
                let target: VertexId = fields[1].parse().context("edge target")?;
                if source == target {
                    continue;
                }
                match graph.add_edge_undirected(source, target, 1) {
                    Ok(()) | Err(GraphError::EdgeAlreadyExists) => {}
                    Err(err) => {
                        bail!("edge {source} -> {target}: {err}");
                    }
                }
            }
            _ => bail!("unparseable line: {line:?}"),
        }
    }

    info!(
        "parsed road network: {} vertices, {} directed edges",
        graph.num_vertices(),
        graph.num_edges()
    );

    Ok(RoadNetwork {
        num_nodes,
        num_edges,
        graph,
    })
}

pub fn load_ordering(path: &Path, g: &Graph) -> Result<Vec<VertexId>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading ordering file {}", path.display()))?;
    let order = parse_ordering(&content, g)
        .with_context(|| format!("parsing ordering file {}", path.display()))?;
    Ok(order)
}

/// Parses a contraction ordering. Two conventions are accepted:
///
/// - *simple*: one vertex id per line, line `i` holds the vertex contracted
///   at position `i`;
/// - *ranked*: `<rank> <node>` per line (both 1-based, optionally preceded by
///   a single count line), where `node` indexes the ascending sort of vertex
///   ids, the same mapping the METIS export uses.
///
/// Any two-token line switches the detector to the ranked convention.
pub fn parse_ordering(content: &str, g: &Graph) -> Result<Vec<VertexId>, OrderingError> {
    let rows: Vec<(usize, Vec<&str>)> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split_whitespace().collect::<Vec<&str>>()))
        .filter(|(_, tokens)| !tokens.is_empty())
        .collect();

    let ranked = rows.iter().any(|(_, tokens)| tokens.len() == 2);
    let order = if ranked {
        parse_ranked_rows(&rows, g)?
    } else {
        parse_simple_rows(&rows)?
    };

    validate_ordering(g, &order)?;
    Ok(order)
}

fn parse_simple_rows(rows: &[(usize, Vec<&str>)]) -> Result<Vec<VertexId>, OrderingError> {
    let mut order = Vec::with_capacity(rows.len());
    for (line, tokens) in rows {
        if tokens.len() != 1 {
            return Err(OrderingError::Malformed { line: *line });
        }
        let id: VertexId = tokens[0]
            .parse()
            .map_err(|_| OrderingError::Malformed { line: *line })?;
        order.push(id);
    }
    Ok(order)
}

fn parse_ranked_rows(
    rows: &[(usize, Vec<&str>)],
    g: &Graph,
) -> Result<Vec<VertexId>, OrderingError> {
    let mut sorted_ids: Vec<VertexId> = g.vertex_ids().collect();
    sorted_ids.sort_unstable();

    // A leading single-token line is the count header some producers emit.
    let rows = match rows.first() {
        Some((_, tokens)) if tokens.len() == 1 => &rows[1..],
        _ => rows,
    };

    let mut order: Vec<Option<VertexId>> = vec![None; rows.len()];
    for (line, tokens) in rows {
        if tokens.len() != 2 {
            return Err(OrderingError::Malformed { line: *line });
        }
        let rank: usize = tokens[0]
            .parse()
            .map_err(|_| OrderingError::Malformed { line: *line })?;
        let index: usize = tokens[1]
            .parse()
            .map_err(|_| OrderingError::Malformed { line: *line })?;
        if rank == 0 || rank > order.len() || index == 0 || index > sorted_ids.len() {
            return Err(OrderingError::Malformed { line: *line });
        }
        let slot = &mut order[rank - 1];
        if slot.is_some() {
            return Err(OrderingError::Malformed { line: *line });
        }
        *slot = Some(sorted_ids[index - 1]);
    }

    // Every rank 1..=n was assigned exactly once, so no slot is left empty.
    Ok(order.into_iter().flatten().collect())
}

/// Writes the graph in METIS text format: a `N E` header, then the 1-based
/// neighbor indices of each vertex (ascending, deduplicated, self-loops
/// skipped). Vertices map to indices through the ascending sort of their ids.
pub fn write_metis<W: Write>(g: &Graph, writer: &mut W) -> io::Result<()> {
    let mut ids: Vec<VertexId> = g.vertex_ids().collect();
    ids.sort_unstable();

    let index_of: FxHashMap<VertexId, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i + 1))
        .collect();

    let mut adjacency: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); ids.len()];
    for (source, edge) in g.all_edges() {
        let s = index_of[&source];
        let t = index_of[&edge.target];
        if s == t {
            continue;
        }
        adjacency[s - 1].insert(t);
        adjacency[t - 1].insert(s);
    }

    let num_edges: usize = adjacency.iter().map(|n| n.len()).sum::<usize>() / 2;
    writeln!(writer, "{} {}", ids.len(), num_edges)?;
    for neighbors in &adjacency {
        let line = neighbors
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::test_graphs::graph_from_edges;

    const SMALL_NETWORK: &str = "\
3
2
0 48.1 11.5
1 48.2 11.6
2 48.3 11.7
0 1
1 2
";

    #[test]
    fn parses_nodes_and_undirected_edges() {
        let network = parse_network(SMALL_NETWORK.as_bytes()).unwrap();
        assert_eq!(3, network.num_nodes);
        assert_eq!(2, network.num_edges);
        assert_eq!(3, network.graph.num_vertices());
        assert_eq!(4, network.graph.num_edges());

        assert_eq!(48.2, network.graph.vertex(1).unwrap().lat);
        assert_eq!(1, network.graph.edge(0, 1).unwrap().weight);
        assert!(network.graph.adjacent(1, 0));
        assert!(network.graph.adjacent(2, 1));
        assert!(!network.graph.adjacent(0, 2));
    }

    #[test]
    fn rejects_garbage_lines() {
        assert!(parse_network("1\n0\n0 1 2 3 4\n".as_bytes()).is_err());
        assert!(parse_network("not-a-number\n".as_bytes()).is_err());
    }

    #[test]
    fn simple_ordering_is_taken_verbatim() {
        let g = graph_from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1)]);
        let order = parse_ordering("2\n0\n3\n1\n", &g).unwrap();
        assert_eq!(vec![2, 0, 3, 1], order);
    }

    #[test]
    fn ranked_ordering_maps_through_sorted_ids() {
        let g = graph_from_edges(3, &[(0, 1, 1), (1, 2, 1)]);
        // rank 1 -> third id (2), rank 2 -> first id (0), rank 3 -> second (1),
        // with a count header in front.
        let order = parse_ordering("3\n1 3\n2 1\n3 2\n", &g).unwrap();
        assert_eq!(vec![2, 0, 1], order);

        // The header is optional.
        let order = parse_ordering("1 3\n2 1\n3 2\n", &g).unwrap();
        assert_eq!(vec![2, 0, 1], order);
    }

    #[test]
    fn ordering_failure_modes() {
        let g = graph_from_edges(3, &[(0, 1, 1), (1, 2, 1)]);

        assert_eq!(
            Err(OrderingError::LengthMismatch {
                expected: 3,
                found: 2
            }),
            parse_ordering("0\n1\n", &g)
        );
        assert_eq!(
            Err(OrderingError::UnknownVertex(9)),
            parse_ordering("0\n1\n9\n", &g)
        );
        assert_eq!(
            Err(OrderingError::DuplicateVertex(1)),
            parse_ordering("1\n1\n2\n", &g)
        );
        assert_eq!(
            Err(OrderingError::Malformed { line: 2 }),
            parse_ordering("1 1\nx 2\n3 3\n", &g)
        );
        // Duplicate rank.
        assert_eq!(
            Err(OrderingError::Malformed { line: 2 }),
            parse_ordering("1 1\n1 2\n3 3\n", &g)
        );
        // Node index out of range.
        assert_eq!(
            Err(OrderingError::Malformed { line: 1 }),
            parse_ordering("1 7\n2 1\n3 2\n", &g)
        );
    }

    #[test]
    fn metis_export_matches_golden_output() {
        // 0 - 1 - 2 plus 0 - 2: a triangle over three 1-based indices.
        let g = graph_from_edges(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 1)]);
        let mut out = Vec::new();
        write_metis(&g, &mut out).unwrap();
        assert_eq!("3 3\n2 3\n1 3\n1 2\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn metis_export_uses_ascending_id_mapping() {
        // Non-contiguous ids: 5, 10, 20 become indices 1, 2, 3.
        let mut g = Graph::new();
        for id in [20, 5, 10] {
            g.add_vertex(Vertex::new(id, 0.0, 0.0)).unwrap();
        }
        g.add_edge_undirected(5, 20, 1).unwrap();
        let mut out = Vec::new();
        write_metis(&g, &mut out).unwrap();
        assert_eq!("3 1\n3\n\n1\n", String::from_utf8(out).unwrap());
    }
}
