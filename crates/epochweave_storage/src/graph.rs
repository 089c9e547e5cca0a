//! The per-graph data model: graph-val, nodes, node-val, edges, edge-val.
//!
//! [`GraphState`] is a full, immutable snapshot of one graph's attribute
//! state. It is the value type kept inside a keyframe and the scratch value
//! synthesized when the delta engine replays a journal forward or backward.
//! Every mutator is functional (returns a new `GraphState`), mirroring the
//! `World`-snapshot pattern: clones are O(1) thanks to persistent
//! collections, so keeping many historical `GraphState`s alive is cheap.

use std::fmt;
use std::sync::Arc;

use epochweave_foundation::{PMap, PSet, Value};

/// A graph's name: any hashable atom, usually a string.
pub type GraphName = Value;

/// A node identifier: any hashable atom.
pub type NodeKey = Value;

/// An edge identifier: `(orig, dest, idx)`. `idx` is always `0` for a
/// non-multigraph; multigraphs may have several edges between the same pair.
pub type EdgeKey = (Value, Value, u64);

/// Whether a graph is directed or not.
///
/// Only directed graphs are implemented end to end; `Undirected` is kept as
/// an explicit, rejected variant so a caller's intent is never silently
/// reinterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GraphKind {
    /// A directed graph (the only kind the store actually implements).
    Directed,
    /// An undirected graph. Constructing one is a [`GraphNameError`]-adjacent
    /// rejection at the ORM boundary, not a storage-layer concept.
    ///
    /// [`GraphNameError`]: epochweave_foundation::ErrorKind::GraphName
    Undirected,
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Directed => write!(f, "digraph"),
            Self::Undirected => write!(f, "graph"),
        }
    }
}

/// Names reserved for internal bookkeeping; a graph may not be created under
/// one of these.
pub const RESERVED_GRAPH_NAMES: &[&str] = &["global", "trunk", "xglobal"];

/// Returns true if `name` is on the reserved list.
#[must_use]
pub fn is_reserved_graph_name(name: &str) -> bool {
    RESERVED_GRAPH_NAMES.contains(&name)
}

/// A full, immutable snapshot of one graph's state: its graph-level
/// attributes, the set of nodes and edges that currently exist, and their
/// per-entity attributes.
///
/// Invariant (enforced by the mutators below, never by the caller): every key
/// in `node_val` names a node present in `nodes`, and every key in `edge_val`
/// names an edge present in `edges`. Deleting a node or edge cascades into
/// the corresponding `*_val` map exactly as the original's existence-implies-
/// no-orphan-attributes rule requires.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GraphState {
    graph_val: PMap<Value, Value>,
    nodes: PSet<NodeKey>,
    node_val: PMap<(NodeKey, Value), Value>,
    edges: PSet<EdgeKey>,
    edge_val: PMap<(EdgeKey, Value), Value>,
}

impl GraphState {
    /// An empty graph: no attributes, no nodes, no edges.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- graph-val ----------------------------------------------------

    /// Reads a graph-level attribute.
    #[must_use]
    pub fn graph_val(&self, key: &Value) -> Option<&Value> {
        self.graph_val.get(key)
    }

    /// Returns a new state with the graph-level attribute set. Setting it to
    /// `Value::Nil` is the same operation as deleting it (the journal still
    /// records a write at this time).
    #[must_use]
    pub fn set_graph_val(&self, key: Value, value: Value) -> Self {
        let mut next = self.clone();
        if value.is_nil() {
            next.graph_val = next.graph_val.remove(&key);
        } else {
            next.graph_val = next.graph_val.insert(key, value);
        }
        next
    }

    /// Iterates over all graph-level attributes.
    pub fn iter_graph_val(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.graph_val.iter()
    }

    // -- nodes ----------------------------------------------------------

    /// Returns true if the node currently exists.
    #[must_use]
    pub fn has_node(&self, node: &NodeKey) -> bool {
        self.nodes.contains(node)
    }

    /// Returns a new state with the node added. A no-op if it already exists.
    #[must_use]
    pub fn add_node(&self, node: NodeKey) -> Self {
        let mut next = self.clone();
        next.nodes = next.nodes.insert(node);
        next
    }

    /// Returns a new state with the node removed, cascading the removal into
    /// `node_val` and into every incident edge (and that edge's `edge_val`).
    #[must_use]
    pub fn del_node(&self, node: &NodeKey) -> Self {
        let mut next = self.clone();
        next.nodes = next.nodes.remove(node);

        let stale_attrs: Vec<(NodeKey, Value)> = next
            .node_val
            .keys()
            .filter(|(n, _)| n == node)
            .cloned()
            .collect();
        for key in stale_attrs {
            next.node_val = next.node_val.remove(&key);
        }

        let incident: Vec<EdgeKey> = next
            .edges
            .iter()
            .filter(|(orig, dest, _)| orig == node || dest == node)
            .cloned()
            .collect();
        for edge in incident {
            next = next.del_edge(&edge.0, &edge.1, edge.2);
        }

        next
    }

    /// Iterates over all existing nodes.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &NodeKey> {
        self.nodes.iter()
    }

    // -- node-val ---------------------------------------------------------

    /// Reads a per-node attribute.
    #[must_use]
    pub fn node_val(&self, node: &NodeKey, key: &Value) -> Option<&Value> {
        self.node_val.get(&(node.clone(), key.clone()))
    }

    /// Returns a new state with a node attribute set, or removed if `value`
    /// is `Value::Nil`. Setting an attribute on a node that does not exist is
    /// a caller error at the ORM layer (invariant 1); storage itself simply
    /// refuses to create the orphaned entry.
    #[must_use]
    pub fn set_node_val(&self, node: NodeKey, key: Value, value: Value) -> Self {
        if !self.has_node(&node) {
            return self.clone();
        }
        let mut next = self.clone();
        if value.is_nil() {
            next.node_val = next.node_val.remove(&(node, key));
        } else {
            next.node_val = next.node_val.insert((node, key), value);
        }
        next
    }

    /// Iterates over every `(node, key, value)` attribute triple.
    pub fn iter_node_val(&self) -> impl Iterator<Item = (&(NodeKey, Value), &Value)> {
        self.node_val.iter()
    }

    // -- edges ------------------------------------------------------------

    /// Returns true if the edge currently exists.
    #[must_use]
    pub fn has_edge(&self, orig: &Value, dest: &Value, idx: u64) -> bool {
        self.edges.contains(&(orig.clone(), dest.clone(), idx))
    }

    /// Returns a new state with the edge added. Both endpoints must already
    /// exist as nodes; if either doesn't, this is a no-op (the ORM facade is
    /// responsible for surfacing that as a `KeyError` before calling down).
    #[must_use]
    pub fn add_edge(&self, orig: NodeKey, dest: NodeKey, idx: u64) -> Self {
        if !self.has_node(&orig) || !self.has_node(&dest) {
            return self.clone();
        }
        let mut next = self.clone();
        next.edges = next.edges.insert((orig, dest, idx));
        next
    }

    /// Returns a new state with the edge removed, cascading into its
    /// `edge_val` entries.
    #[must_use]
    pub fn del_edge(&self, orig: &Value, dest: &Value, idx: u64) -> Self {
        let key = (orig.clone(), dest.clone(), idx);
        let mut next = self.clone();
        next.edges = next.edges.remove(&key);

        let stale_attrs: Vec<(EdgeKey, Value)> = next
            .edge_val
            .keys()
            .filter(|(e, _)| e == &key)
            .cloned()
            .collect();
        for attr_key in stale_attrs {
            next.edge_val = next.edge_val.remove(&attr_key);
        }

        next
    }

    /// Iterates over all existing edges.
    pub fn iter_edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter()
    }

    // -- edge-val -----------------------------------------------------------

    /// Reads a per-edge attribute.
    #[must_use]
    pub fn edge_val(&self, edge: &EdgeKey, key: &Value) -> Option<&Value> {
        self.edge_val.get(&(edge.clone(), key.clone()))
    }

    /// Returns a new state with an edge attribute set, or removed if `value`
    /// is `Value::Nil`.
    #[must_use]
    pub fn set_edge_val(&self, edge: EdgeKey, key: Value, value: Value) -> Self {
        if !self.edges.contains(&edge) {
            return self.clone();
        }
        let mut next = self.clone();
        if value.is_nil() {
            next.edge_val = next.edge_val.remove(&(edge, key));
        } else {
            next.edge_val = next.edge_val.insert((edge, key), value);
        }
        next
    }

    /// Iterates over every `(edge, key, value)` attribute triple.
    pub fn iter_edge_val(&self) -> impl Iterator<Item = (&(EdgeKey, Value), &Value)> {
        self.edge_val.iter()
    }

    /// A commutative digest of this snapshot: XORs together a digest of each
    /// entry so the combined hash does not depend on iteration order. Used by
    /// the keyframe manager's content-hash check (two keyframes with the same
    /// hash are assumed, not proven, identical — this is a sanity check, not
    /// the equality test itself). 512 bits wide, drawn from blake3's XOF.
    #[must_use]
    pub fn commutative_digest(&self) -> [u8; 64] {
        let mut acc = [0u8; 64];
        let mut xor_in = |bytes: [u8; 64]| {
            for (a, b) in acc.iter_mut().zip(bytes.iter()) {
                *a ^= b;
            }
        };

        for (k, v) in self.graph_val.iter() {
            xor_in(digest_entry("gv", &[k, v]));
        }
        for n in self.nodes.iter() {
            xor_in(digest_entry("n", &[n]));
        }
        for ((n, k), v) in self.node_val.iter() {
            xor_in(digest_entry("nv", &[n, k, v]));
        }
        for (orig, dest, idx) in self.edges.iter() {
            xor_in(digest_entry("e", &[orig, dest, &Value::Int(*idx as i64)]));
        }
        for (key, v) in self.edge_val.iter() {
            let ((orig, dest, idx), k) = key;
            xor_in(digest_entry(
                "ev",
                &[orig, dest, &Value::Int(*idx as i64), k, v],
            ));
        }

        acc
    }
}

fn digest_entry(tag: &str, parts: &[&Value]) -> [u8; 64] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(tag.as_bytes());
    for part in parts {
        hasher.update(format!("{part:?}").as_bytes());
    }
    let mut out = [0u8; 64];
    hasher.finalize_xof().fill(&mut out);
    out
}
