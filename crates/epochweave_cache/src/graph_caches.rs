//! `GraphCaches`: the five entity-family journals for one graph, bundled
//! together with the delta-building pass order spec §4.6 requires.

use epochweave_foundation::Value;
use epochweave_storage::{EdgeKey, NodeKey};
use epochweave_timeline::{BranchId, Tick, Turn};

use crate::delta::GraphDelta;
use crate::journal::EntityJournal;

/// The result of a point lookup against a cache: either the value found, or
/// an explicit marker that the key is known to be unset at that time (as
/// opposed to simply absent from the journal, which just means "keep
/// looking further back").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieved<V> {
    /// The key held this value at the queried time.
    Value(V),
    /// The key is known not to have existed at the queried time.
    Unset,
}

/// The five journals (graph-val, nodes, node-val, edges, edge-val) backing
/// one graph's history.
#[derive(Debug, Clone, Default)]
pub struct GraphCaches {
    /// Graph-level attribute journal.
    pub graph_val: EntityJournal<Value, Value>,
    /// Node existence journal.
    pub nodes: EntityJournal<NodeKey, bool>,
    /// Node attribute journal.
    pub node_val: EntityJournal<(NodeKey, Value), Value>,
    /// Edge existence journal.
    pub edges: EntityJournal<EdgeKey, bool>,
    /// Edge attribute journal.
    pub edge_val: EntityJournal<(EdgeKey, Value), Value>,
}

impl GraphCaches {
    /// An empty set of journals.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the delta that carries the graph from `from` to `to` on
    /// `branch`. Picks a forward or backward pass depending on which time
    /// is later, matching the two directions spec §4.6 describes.
    #[must_use]
    pub fn build_delta(
        &self,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> GraphDelta {
        if to >= from {
            self.build_delta_forward(branch, from, to)
        } else {
            self.build_delta_backward(branch, from, to)
        }
    }

    /// Convenience wrapper for a delta within a single turn. The underlying
    /// `WindowDict` range query already handles this uniformly with any
    /// other window, so this exists purely for call-site symmetry with the
    /// two-argument turn/tick API elsewhere.
    #[must_use]
    pub fn build_turn_delta(&self, branch: &BranchId, turn: Turn, tick_from: Tick, tick_to: Tick) -> GraphDelta {
        self.build_delta(branch, (turn, tick_from), (turn, tick_to))
    }

    /// Truncates every journal's `branch` entries forward of `(turn, tick)`.
    /// Used by unload (spec §4.7) to shrink the retained branch down to the
    /// retained window's upper edge.
    pub fn truncate_forward(&mut self, branch: &BranchId, turn: Turn, tick: Tick, keep_at: bool) {
        self.graph_val.truncate_forward(branch, turn, tick, keep_at);
        self.nodes.truncate_forward(branch, turn, tick, keep_at);
        self.node_val.truncate_forward(branch, turn, tick, keep_at);
        self.edges.truncate_forward(branch, turn, tick, keep_at);
        self.edge_val.truncate_forward(branch, turn, tick, keep_at);
    }

    /// Truncates every journal's `branch` entries backward of `(turn,
    /// tick)`.
    pub fn truncate_backward(&mut self, branch: &BranchId, turn: Turn, tick: Tick, keep_at: bool) {
        self.graph_val.truncate_backward(branch, turn, tick, keep_at);
        self.nodes.truncate_backward(branch, turn, tick, keep_at);
        self.node_val.truncate_backward(branch, turn, tick, keep_at);
        self.edges.truncate_backward(branch, turn, tick, keep_at);
        self.edge_val.truncate_backward(branch, turn, tick, keep_at);
    }

    /// Drops every journal's entries for `branch` entirely.
    pub fn drop_branch(&mut self, branch: &BranchId) {
        self.graph_val.drop_branch(branch);
        self.nodes.drop_branch(branch);
        self.node_val.drop_branch(branch);
        self.edges.drop_branch(branch);
        self.edge_val.drop_branch(branch);
    }

    fn build_delta_forward(
        &self,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> GraphDelta {
        let mut delta = GraphDelta::new();

        for (key, value) in self.graph_val.iter_forward(branch, from, to) {
            delta.set_graph_val(key, value);
        }
        for (node, exists) in self.nodes.iter_forward(branch, from, to) {
            delta.set_node(node, exists);
        }
        for ((node, key), value) in self.node_val.iter_forward(branch, from, to) {
            delta.set_node_val(node, key, value);
        }
        for (edge, exists) in self.edges.iter_forward(branch, from, to) {
            delta.set_edge(edge, exists);
        }
        for ((edge, key), value) in self.edge_val.iter_forward(branch, from, to) {
            delta.set_edge_val(edge, key, value);
        }

        delta
    }

    fn build_delta_backward(
        &self,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> GraphDelta {
        let mut delta = GraphDelta::new();

        for (key, value) in self.graph_val.iter_backward(branch, from, to) {
            delta.set_graph_val(key, value.unwrap_or(Value::Nil));
        }
        for (node, existed) in self.nodes.iter_backward(branch, from, to) {
            delta.set_node(node, existed.unwrap_or(false));
        }
        for ((node, key), value) in self.node_val.iter_backward(branch, from, to) {
            match value {
                Some(v) => delta.set_node_val(node, key, v),
                None => delta.set_node_val(node, key, Value::Nil),
            }
        }
        for (edge, existed) in self.edges.iter_backward(branch, from, to) {
            delta.set_edge(edge, existed.unwrap_or(false));
        }
        for ((edge, key), value) in self.edge_val.iter_backward(branch, from, to) {
            match value {
                Some(v) => delta.set_edge_val(edge, key, v),
                None => delta.set_edge_val(edge, key, Value::Nil),
            }
        }

        delta
    }
}
