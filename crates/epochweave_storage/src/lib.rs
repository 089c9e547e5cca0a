//! The graph data model: graph-val, nodes, node-val, edges, and edge-val.
//!
//! This crate provides:
//! - [`GraphState`] - an immutable, full snapshot of one graph's attributes
//! - [`GraphKind`] - directed vs. undirected graph marker
//! - reserved-name checking for graph creation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod graph;

pub use graph::{is_reserved_graph_name, EdgeKey, GraphKind, GraphName, GraphState, NodeKey};
