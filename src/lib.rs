//! Road-network shortest-path engine built on contraction hierarchies.
//!
//! Two preprocessing flavors share the same query machinery:
//!
//! - [`node_contraction::NodeContractor`] builds a classic contraction
//!   hierarchy by priority-driven contraction with witness searches;
//! - [`cch::Cch`] builds a customizable hierarchy from an externally supplied
//!   nested-dissection order, whose weights are installed (and re-installed
//!   after every metric change) by [`Cch::customize`](cch::Cch).
//!
//! # Basic usage
//! ```
//! use ch_engine::graph::{Graph, Vertex};
//! use ch_engine::node_contraction::NodeContractor;
//!
//! let mut g = Graph::new();
//! for id in 0..3 {
//!     g.add_vertex(Vertex::new(id, 0.0, 0.0)).unwrap();
//! }
//! g.add_edge_undirected(0, 1, 1).unwrap();
//! g.add_edge_undirected(0, 2, 1).unwrap();
//! g.add_edge_undirected(1, 2, 5).unwrap();
//!
//! let ch = NodeContractor::new(&g).run();
//!
//! let answer = ch.query(1, 2).unwrap();
//! assert_eq!(vec![1, 0, 2], answer.path);
//! assert_eq!(2, answer.weight);
//! ```

pub mod cch;
pub mod constants;
pub mod customization;
pub mod graph;
pub mod hierarchy;
pub mod node_contraction;
pub mod parser;
pub mod path_unpacking;
pub mod prelude;
pub mod preprocessed;
pub mod priority_queue;
pub mod search;
pub mod statistics;
pub mod util;
pub(crate) mod witness_search;
