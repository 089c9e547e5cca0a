//! Branch identifiers and per-branch bookkeeping.

use std::fmt;
use std::sync::Arc;

/// The name of the root branch. Fixed, per the data model: the root has no
/// parent and is the ancestor of every other branch.
pub const TRUNK: &str = "trunk";

/// A branch name. Cheaply cloneable (`Arc<str>` under the hood) since every
/// `Time` triple carries one.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BranchId(Arc<str>);

impl BranchId {
    /// The root branch.
    #[must_use]
    pub fn trunk() -> Self {
        Self(Arc::from(TRUNK))
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BranchId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for BranchId {
    fn from(s: String) -> Self {
        Self(Arc::from(s.as_str()))
    }
}

impl fmt::Debug for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-branch timeline bookkeeping.
///
/// `turn_end`/`tick_end` track the committed extent of the branch (the
/// furthest point any non-planning write has reached). `turn_end_plan` and
/// `branch_end_plan` track the furthest point reached *including* tentative
/// plan writes, per the data model's distinction between committed and
/// planned extent.
#[derive(Debug, Clone)]
pub struct BranchInfo {
    /// The branch this one was forked from; `None` only for trunk.
    pub parent: Option<BranchId>,
    /// Turn at which this branch diverged from its parent.
    pub turn_start: u64,
    /// Tick at which this branch diverged from its parent.
    pub tick_start: u64,
    /// Furthest committed turn.
    pub turn_end: u64,
    /// Furthest committed tick within `turn_end`.
    pub tick_end: u64,
    /// Furthest turn reached including plan writes.
    pub branch_end_plan: u64,
    /// Per-turn furthest tick reached including plan writes.
    pub turn_end_plan: im::HashMap<u64, u64>,
}

impl BranchInfo {
    /// Creates the root branch's bookkeeping record.
    #[must_use]
    pub fn root() -> Self {
        Self {
            parent: None,
            turn_start: 0,
            tick_start: 0,
            turn_end: 0,
            tick_end: 0,
            branch_end_plan: 0,
            turn_end_plan: im::HashMap::new(),
        }
    }

    /// Creates a child branch forked from `parent` at `(turn_start,
    /// tick_start)`.
    #[must_use]
    pub fn forked_from(parent: BranchId, turn_start: u64, tick_start: u64) -> Self {
        Self {
            parent: Some(parent),
            turn_start,
            tick_start,
            turn_end: turn_start,
            tick_end: tick_start,
            branch_end_plan: turn_start,
            turn_end_plan: im::HashMap::new(),
        }
    }
}
