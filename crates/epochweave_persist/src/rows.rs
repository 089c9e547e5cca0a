//! Row types crossing the persistence boundary.
//!
//! Deliberately plain: branch names are `String` and times are bare `u64`
//! pairs rather than this codebase's `BranchId`/`Turn`/`Tick` newtypes, so
//! that a real adapter (SQL, a flat file, whatever) never has to depend on
//! the in-memory domain crates to describe its own rows.

use epochweave_foundation::Value;
use epochweave_storage::{GraphKind, GraphState};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One row of the branch table: a branch's parent and its `(turn, tick)`
/// fork point and committed extent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BranchRow {
    /// This branch's name.
    pub branch: String,
    /// The branch this one forked from; `None` only for the root.
    pub parent: Option<String>,
    /// Turn at which this branch diverged from its parent.
    pub turn_start: u64,
    /// Tick at which this branch diverged from its parent.
    pub tick_start: u64,
    /// Furthest committed turn.
    pub turn_end: u64,
    /// Furthest committed tick within `turn_end`.
    pub tick_end: u64,
}

/// One row of the turn table: how far one turn was written to on one
/// branch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TurnRow {
    /// Branch this turn belongs to.
    pub branch: String,
    /// Turn number.
    pub turn: u64,
    /// Furthest committed tick within this turn.
    pub end_tick: u64,
    /// Furthest tick within this turn including tentative plan writes.
    pub plan_end_tick: u64,
}

/// One row of the graph table: a graph's name and kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphRow {
    /// The graph's name.
    pub graph: Value,
    /// Directed or undirected.
    pub kind: GraphKind,
}

/// One row of the keyframe table: a full graph snapshot at a point in time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyframeRow {
    /// The graph this keyframe belongs to.
    pub graph: Value,
    /// Branch the keyframe was taken on.
    pub branch: String,
    /// Turn the keyframe was taken at.
    pub turn: u64,
    /// Tick the keyframe was taken at.
    pub tick: u64,
    /// The snapshot itself.
    pub state: GraphState,
}

/// One row of the node-existence journal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRow {
    /// Graph the node belongs to.
    pub graph: Value,
    /// Node identifier.
    pub node: Value,
    /// Branch this write happened on.
    pub branch: String,
    /// Turn of the write.
    pub turn: u64,
    /// Tick of the write.
    pub tick: u64,
    /// Whether the node exists as of this write.
    pub exists: bool,
}

/// One row of the edge-existence journal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeRow {
    /// Graph the edge belongs to.
    pub graph: Value,
    /// Origin node.
    pub orig: Value,
    /// Destination node.
    pub dest: Value,
    /// Multigraph edge index (always 0 for a simple graph).
    pub idx: u64,
    /// Branch this write happened on.
    pub branch: String,
    /// Turn of the write.
    pub turn: u64,
    /// Tick of the write.
    pub tick: u64,
    /// Whether the edge exists as of this write.
    pub exists: bool,
}

/// One row of the graph-attribute journal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GraphValRow {
    /// Graph the attribute belongs to.
    pub graph: Value,
    /// Attribute key.
    pub key: Value,
    /// Branch this write happened on.
    pub branch: String,
    /// Turn of the write.
    pub turn: u64,
    /// Tick of the write.
    pub tick: u64,
    /// Attribute value; `Value::Nil` means deleted.
    pub value: Value,
}

/// One row of the node-attribute journal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeValRow {
    /// Graph the node belongs to.
    pub graph: Value,
    /// Node identifier.
    pub node: Value,
    /// Attribute key.
    pub key: Value,
    /// Branch this write happened on.
    pub branch: String,
    /// Turn of the write.
    pub turn: u64,
    /// Tick of the write.
    pub tick: u64,
    /// Attribute value; `Value::Nil` means deleted.
    pub value: Value,
}

/// One row of the edge-attribute journal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EdgeValRow {
    /// Graph the edge belongs to.
    pub graph: Value,
    /// Origin node.
    pub orig: Value,
    /// Destination node.
    pub dest: Value,
    /// Multigraph edge index.
    pub idx: u64,
    /// Attribute key.
    pub key: Value,
    /// Branch this write happened on.
    pub branch: String,
    /// Turn of the write.
    pub turn: u64,
    /// Tick of the write.
    pub tick: u64,
    /// Attribute value; `Value::Nil` means deleted.
    pub value: Value,
}

/// One row of the plan table: a plan's id and the time it originated at.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanRow {
    /// The plan's id.
    pub plan_id: u64,
    /// Branch the plan originated on.
    pub branch: String,
    /// Turn the plan originated at.
    pub turn: u64,
    /// Tick the plan originated at.
    pub tick: u64,
}

/// One row of the plan-ticks table: a single tick a plan wrote to.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlanTickRow {
    /// The owning plan's id.
    pub plan_id: u64,
    /// Turn written to.
    pub turn: u64,
    /// Tick written to.
    pub tick: u64,
}
