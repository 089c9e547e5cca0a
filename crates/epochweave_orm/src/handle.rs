//! [`GraphHandle`]: a capability view scoped to one graph.
//!
//! Nodes and edges never hold a live reference to their graph or to each
//! other — every access goes back through [`Orm`], keyed by
//! `(graph_name, node_or_edge_key)`. That's what keeps the data model free of
//! the cyclic-reference problem a naive node/edge object graph would run
//! into (spec §9 "Cyclic references").

use epochweave_foundation::{Result, Value};
use epochweave_storage::{EdgeKey, GraphName, NodeKey};

use crate::orm::Orm;

/// Which attribute family an [`AttrView`] reads and writes through.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrScope {
    Graph,
    Node(NodeKey),
    Edge(EdgeKey),
}

/// A capability view scoped to one graph: node/edge/graph-val access, all
/// going through the owning [`Orm`] rather than holding any state of its
/// own.
pub struct GraphHandle<'a> {
    orm: &'a Orm,
    name: GraphName,
}

impl<'a> GraphHandle<'a> {
    pub(crate) fn new(orm: &'a Orm, name: GraphName) -> Self {
        Self { orm, name }
    }

    /// This graph's name.
    #[must_use]
    pub fn name(&self) -> &GraphName {
        &self.name
    }

    /// The graph-level attribute view.
    #[must_use]
    pub fn attrs(&self) -> AttrView<'_> {
        AttrView {
            orm: self.orm,
            graph: self.name.clone(),
            scope: AttrScope::Graph,
        }
    }

    /// Whether `node` exists at the current cursor.
    pub fn exists_node(&self, node: &NodeKey) -> Result<bool> {
        self.orm.exists_node(&self.name, node)
    }

    /// Adds `node` at the current cursor (a no-op if it already exists).
    pub fn add_node(&self, node: NodeKey) -> Result<()> {
        self.orm.set_node(&self.name, node, true)
    }

    /// Removes `node` at the current cursor, cascading into its attributes
    /// and incident edges.
    pub fn del_node(&self, node: NodeKey) -> Result<()> {
        self.orm.set_node(&self.name, node, false)
    }

    /// The attribute view for `node`.
    #[must_use]
    pub fn node(&self, node: NodeKey) -> AttrView<'_> {
        AttrView {
            orm: self.orm,
            graph: self.name.clone(),
            scope: AttrScope::Node(node),
        }
    }

    /// Whether `edge` exists at the current cursor.
    pub fn exists_edge(&self, edge: &EdgeKey) -> Result<bool> {
        self.orm.exists_edge(&self.name, edge)
    }

    /// Adds the edge `orig -> dest` (multigraph index `idx`) at the current
    /// cursor. Both endpoints must already exist.
    pub fn add_edge(&self, orig: Value, dest: Value, idx: u64) -> Result<()> {
        self.orm.set_edge(&self.name, (orig, dest, idx), true)
    }

    /// Removes the edge `orig -> dest` at the current cursor, cascading
    /// into its attributes.
    pub fn del_edge(&self, orig: Value, dest: Value, idx: u64) -> Result<()> {
        self.orm.set_edge(&self.name, (orig, dest, idx), false)
    }

    /// The attribute view for the edge `orig -> dest` (multigraph index
    /// `idx`).
    #[must_use]
    pub fn edge(&self, orig: Value, dest: Value, idx: u64) -> AttrView<'_> {
        AttrView {
            orm: self.orm,
            graph: self.name.clone(),
            scope: AttrScope::Edge((orig, dest, idx)),
        }
    }
}

/// A read/write view onto one entity's attributes, scoped to a graph, a
/// node, or an edge. Implemented once and shared across all three families
/// (spec §9).
pub struct AttrView<'a> {
    orm: &'a Orm,
    graph: GraphName,
    scope: AttrScope,
}

impl AttrView<'_> {
    /// Reads `key`, or `Value::Nil` if it was never set.
    pub fn read(&self, key: &Value) -> Result<Value> {
        match &self.scope {
            AttrScope::Graph => self.orm.graph_val(&self.graph, key),
            AttrScope::Node(node) => self.orm.node_val(&self.graph, node, key),
            AttrScope::Edge(edge) => self.orm.edge_val(&self.graph, edge, key),
        }
    }

    /// Writes `key` to `value` at the current cursor.
    pub fn write(&self, key: Value, value: Value) -> Result<()> {
        match &self.scope {
            AttrScope::Graph => self.orm.set_graph_val(&self.graph, key, value),
            AttrScope::Node(node) => self.orm.set_node_val(&self.graph, node.clone(), key, value),
            AttrScope::Edge(edge) => self.orm.set_edge_val(&self.graph, edge.clone(), key, value),
        }
    }

    /// Deletes `key` (a `Value::Nil` write, per spec §3's attribute
    /// lifecycle).
    pub fn delete(&self, key: Value) -> Result<()> {
        self.write(key, Value::Nil)
    }

    /// Every key currently set in this scope, at the current cursor.
    pub fn iter_keys(&self) -> Result<Vec<Value>> {
        self.orm.with_state(|state| {
            let snapshot = state.snapshot(&self.graph)?;
            Ok(match &self.scope {
                AttrScope::Graph => snapshot.iter_graph_val().map(|(k, _)| k.clone()).collect(),
                AttrScope::Node(node) => snapshot
                    .iter_node_val()
                    .filter(|((n, _), _)| n == node)
                    .map(|((_, k), _)| k.clone())
                    .collect(),
                AttrScope::Edge(edge) => snapshot
                    .iter_edge_val()
                    .filter(|((e, _), _)| e == edge)
                    .map(|((_, k), _)| k.clone())
                    .collect(),
            })
        })
    }
}
