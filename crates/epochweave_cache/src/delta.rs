//! `GraphDelta`: a nested diff between two times, spec §4.6's C6.
//!
//! A delta is built one entity family at a time, each family processed as
//! one complete pass before the next starts (graph-val, then nodes, then
//! node-val, then edges, then edge-val). That ordering matters: a node-val
//! write is suppressed if the delta already marks its node as deleted, and
//! that check has to see the *final* existence state as of the delta's
//! target time, not whatever existence state happened to hold at the
//! moment the value was written. Interleaving the passes tick-by-tick would
//! let a value write slip through for a node that gets deleted later in the
//! same window.

use std::collections::HashMap;

use epochweave_foundation::Value;
use epochweave_storage::{EdgeKey, GraphState, NodeKey};

/// A diff between two points in one graph's history: which attributes,
/// nodes, and edges changed, and to what.
///
/// Applying a delta to the `GraphState` at its origin time produces the
/// `GraphState` at its target time, in either direction.
#[derive(Debug, Clone, Default)]
pub struct GraphDelta {
    /// Graph-level attribute changes. `Value::Nil` means deleted.
    pub graph_val: HashMap<Value, Value>,
    /// Node existence changes.
    pub nodes: HashMap<NodeKey, bool>,
    /// Node attribute changes, suppressed for any node the delta itself
    /// marks as deleted.
    pub node_val: HashMap<(NodeKey, Value), Value>,
    /// Edge existence changes.
    pub edges: HashMap<EdgeKey, bool>,
    /// Edge attribute changes, suppressed for any edge the delta itself
    /// marks as deleted.
    pub edge_val: HashMap<(EdgeKey, Value), Value>,
}

impl GraphDelta {
    /// An empty delta (a no-op when applied).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a graph-level attribute change.
    pub fn set_graph_val(&mut self, key: Value, value: Value) {
        self.graph_val.insert(key, value);
    }

    /// Records a node existence change.
    pub fn set_node(&mut self, node: NodeKey, exists: bool) {
        self.nodes.insert(node, exists);
    }

    /// Records a node attribute change, suppressed if this delta already
    /// marks `node` as deleted.
    pub fn set_node_val(&mut self, node: NodeKey, key: Value, value: Value) {
        if self.nodes.get(&node) == Some(&false) {
            return;
        }
        self.node_val.insert((node, key), value);
    }

    /// Records an edge existence change.
    pub fn set_edge(&mut self, edge: EdgeKey, exists: bool) {
        self.edges.insert(edge, exists);
    }

    /// Records an edge attribute change, suppressed if this delta already
    /// marks `edge` as deleted.
    pub fn set_edge_val(&mut self, edge: EdgeKey, key: Value, value: Value) {
        if self.edges.get(&edge) == Some(&false) {
            return;
        }
        self.edge_val.insert((edge, key), value);
    }

    /// Returns true if this delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph_val.is_empty()
            && self.nodes.is_empty()
            && self.node_val.is_empty()
            && self.edges.is_empty()
            && self.edge_val.is_empty()
    }

    /// Applies this delta to `state`, producing the state at the delta's
    /// target time.
    #[must_use]
    pub fn apply(&self, state: &GraphState) -> GraphState {
        let mut next = state.clone();

        for (key, value) in &self.graph_val {
            next = next.set_graph_val(key.clone(), value.clone());
        }
        for (node, exists) in &self.nodes {
            next = if *exists {
                next.add_node(node.clone())
            } else {
                next.del_node(node)
            };
        }
        for ((node, key), value) in &self.node_val {
            next = next.set_node_val(node.clone(), key.clone(), value.clone());
        }
        for (edge, exists) in &self.edges {
            next = if *exists {
                next.add_edge(edge.0.clone(), edge.1.clone(), edge.2)
            } else {
                next.del_edge(&edge.0, &edge.1, edge.2)
            };
        }
        for ((edge, key), value) in &self.edge_val {
            next = next.set_edge_val(edge.clone(), key.clone(), value.clone());
        }

        next
    }
}
