//! Flat, binary-serializable snapshots of preprocessed hierarchies.
//!
//! Record lists are sorted (vertices by id, edges by source then target) so
//! that deserializing and re-serializing reproduces the bytes exactly.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cch::Cch;
use crate::graph::{Graph, GraphError, Vertex, VertexId};
use crate::hierarchy::ContractionHierarchy;

/// Sentinel in serialized edge records: `via = -1` means "not a shortcut".
pub const NO_VIA: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: i64,
    pub target: i64,
    pub weight: i64,
    pub via: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecords {
    pub vertices: Vec<VertexRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedCh {
    pub contraction_order: Vec<i64>,
    pub upwards: GraphRecords,
    pub downwards: GraphRecords,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessedCch {
    pub vertices: Vec<VertexRecord>,
    pub upward_edges: Vec<EdgeRecord>,
    pub downward_edges: Vec<EdgeRecord>,
    pub contraction_order: Vec<i64>,
    /// `(vertex, rank)` pairs, sorted by vertex.
    pub contraction_map: Vec<(i64, i64)>,
}

fn vertex_records(g: &Graph) -> Vec<VertexRecord> {
    let mut records: Vec<VertexRecord> = g
        .vertices()
        .map(|v| VertexRecord {
            id: v.id,
            lat: v.lat,
            lon: v.lon,
        })
        .collect();
    records.sort_by_key(|r| r.id);
    records
}

fn edge_records(g: &Graph) -> Vec<EdgeRecord> {
    let mut records: Vec<EdgeRecord> = g
        .all_edges()
        .map(|(source, edge)| EdgeRecord {
            source,
            target: edge.target,
            weight: edge.weight,
            via: edge.via.unwrap_or(NO_VIA),
        })
        .collect();
    records.sort_by_key(|r| (r.source, r.target));
    records
}

fn restore_graph(vertices: &[VertexRecord], edges: &[EdgeRecord]) -> Result<Graph, GraphError> {
    let mut g = Graph::new();
    for record in vertices {
        g.add_vertex(Vertex::new(record.id, record.lat, record.lon))?;
    }
    for record in edges {
        let via = (record.via != NO_VIA).then_some(record.via);
        g.add_edge(record.source, record.target, record.weight, via)?;
    }
    Ok(g)
}

impl From<&ContractionHierarchy> for PreprocessedCh {
    fn from(ch: &ContractionHierarchy) -> Self {
        PreprocessedCh {
            contraction_order: ch.contraction_order.clone(),
            upwards: GraphRecords {
                vertices: vertex_records(&ch.upwards),
                edges: edge_records(&ch.upwards),
            },
            downwards: GraphRecords {
                vertices: vertex_records(&ch.downwards),
                edges: edge_records(&ch.downwards),
            },
        }
    }
}

impl PreprocessedCh {
    pub fn into_hierarchy(self) -> Result<ContractionHierarchy, GraphError> {
        let upwards = restore_graph(&self.upwards.vertices, &self.upwards.edges)?;
        let downwards = restore_graph(&self.downwards.vertices, &self.downwards.edges)?;
        let shortcuts = self
            .upwards
            .edges
            .iter()
            .filter(|record| record.via != NO_VIA)
            .count();
        Ok(ContractionHierarchy::from_parts(
            self.contraction_order,
            upwards,
            downwards,
            shortcuts,
        ))
    }
}

impl From<&Cch> for PreprocessedCch {
    fn from(cch: &Cch) -> Self {
        let mut contraction_map: Vec<(i64, i64)> = cch
            .contraction_map
            .iter()
            .map(|(&vertex, &rank)| (vertex, rank as i64))
            .collect();
        contraction_map.sort_unstable();

        PreprocessedCch {
            vertices: vertex_records(&cch.upwards),
            upward_edges: edge_records(&cch.upwards),
            downward_edges: edge_records(&cch.downwards),
            contraction_order: cch.contraction_order.clone(),
            contraction_map,
        }
    }
}

impl PreprocessedCch {
    pub fn into_cch(self) -> Result<Cch, GraphError> {
        let upwards = restore_graph(&self.vertices, &self.upward_edges)?;
        let downwards = restore_graph(&self.vertices, &self.downward_edges)?;
        let contraction_map: FxHashMap<VertexId, usize> = self
            .contraction_map
            .into_iter()
            .map(|(vertex, rank)| (vertex, rank as usize))
            .collect();
        Ok(Cch {
            contraction_order: self.contraction_order,
            contraction_map,
            upwards,
            downwards,
        })
    }
}

pub fn write_ch(ch: &ContractionHierarchy, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), &PreprocessedCh::from(ch))
        .with_context(|| format!("serializing hierarchy to {}", path.display()))
}

pub fn read_ch(path: &Path) -> Result<ContractionHierarchy> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let preprocessed: PreprocessedCh = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("deserializing hierarchy from {}", path.display()))?;
    preprocessed
        .into_hierarchy()
        .with_context(|| format!("restoring hierarchy from {}", path.display()))
}

pub fn write_cch(cch: &Cch, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    bincode::serialize_into(BufWriter::new(file), &PreprocessedCch::from(cch))
        .with_context(|| format!("serializing hierarchy to {}", path.display()))
}

pub fn read_cch(path: &Path) -> Result<Cch> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let preprocessed: PreprocessedCch = bincode::deserialize_from(BufReader::new(file))
        .with_context(|| format!("deserializing hierarchy from {}", path.display()))?;
    preprocessed
        .into_cch()
        .with_context(|| format!("restoring hierarchy from {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_contraction::NodeContractor;
    use crate::util::test_graphs::{diamond_graph, triangle_graph};

    #[test]
    fn ch_round_trip_is_byte_stable() {
        let g = triangle_graph();
        let ch = NodeContractor::new(&g).run();

        let snapshot = PreprocessedCh::from(&ch);
        let bytes = bincode::serialize(&snapshot).unwrap();
        let restored: PreprocessedCh = bincode::deserialize(&bytes).unwrap();
        assert_eq!(snapshot, restored);
        assert_eq!(bytes, bincode::serialize(&restored).unwrap());
    }

    #[test]
    fn restored_ch_answers_queries() {
        let g = triangle_graph();
        let ch = NodeContractor::new(&g).run();
        let expected = ch.query(1, 2).unwrap();

        let restored = PreprocessedCh::from(&ch).into_hierarchy().unwrap();
        let answer = restored.query(1, 2).unwrap();
        assert_eq!(expected.path, answer.path);
        assert_eq!(expected.weight, answer.weight);
        assert_eq!(ch.shortcuts_added(), restored.shortcuts_added());
    }

    #[test]
    fn cch_round_trip_preserves_customized_weights() {
        let g = diamond_graph();
        let mut cch = Cch::preprocess(&g, &[0, 3, 1, 2]).unwrap();
        cch.customize(&g);

        let snapshot = PreprocessedCch::from(&cch);
        let bytes = bincode::serialize(&snapshot).unwrap();
        let restored: PreprocessedCch = bincode::deserialize(&bytes).unwrap();
        assert_eq!(bytes, bincode::serialize(&restored).unwrap());

        let restored = restored.into_cch().unwrap();
        assert_eq!(cch.contraction_order, restored.contraction_order);
        assert_eq!(20, restored.query(1, 2).unwrap().weight);
        assert_eq!(Some(2), restored.rank(1));
    }

    #[test]
    fn files_round_trip_on_disk() {
        let dir = std::env::temp_dir();
        let path = dir.join("hierarchy_round_trip.bin");

        let g = triangle_graph();
        let ch = NodeContractor::new(&g).run();
        write_ch(&ch, &path).unwrap();
        let restored = read_ch(&path).unwrap();
        assert_eq!(2, restored.query(1, 2).unwrap().weight);

        std::fs::remove_file(&path).ok();
    }
}
