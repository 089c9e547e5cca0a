//! The [`Backend`] trait: the storage-agnostic boundary between the engine
//! and wherever its history actually lives.

use epochweave_foundation::{Error, Value};

use crate::rows::{
    BranchRow, EdgeRow, EdgeValRow, GraphRow, GraphValRow, KeyframeRow, NodeRow, NodeValRow,
    PlanRow, PlanTickRow, TurnRow,
};

/// A persistence adapter for the temporal graph store.
///
/// Every method is a direct row-level operation; none of them know about
/// branches' parent chains, keyframe synthesis, or delta computation — that
/// logic lives above this boundary, in the cache and loader crates. An
/// implementation only has to store and return rows faithfully.
pub trait Backend: Send {
    /// Every branch ever created, in no particular order.
    fn all_branches(&self) -> Result<Vec<BranchRow>, Error>;

    /// Registers a new branch. Errors if the branch already exists.
    fn new_branch(&mut self, row: BranchRow) -> Result<(), Error>;

    /// Updates a branch's committed extent.
    fn set_branch_extent(&mut self, branch: &str, turn_end: u64, tick_end: u64)
        -> Result<(), Error>;

    /// Every turn row recorded for `branch`, in ascending turn order.
    fn turns_dump(&self, branch: &str) -> Result<Vec<TurnRow>, Error>;

    /// Records a new turn row.
    fn new_turn(&mut self, row: TurnRow) -> Result<(), Error>;

    /// Updates a turn's recorded extent.
    fn set_turn(&mut self, branch: &str, turn: u64, end_tick: u64, plan_end_tick: u64)
        -> Result<(), Error>;

    /// Every graph ever created.
    fn all_graphs(&self) -> Result<Vec<GraphRow>, Error>;

    /// Registers a new graph. Errors if the name is already taken or
    /// reserved.
    fn new_graph(&mut self, row: GraphRow) -> Result<(), Error>;

    /// Removes a graph and everything recorded under it.
    fn del_graph(&mut self, graph: &Value) -> Result<(), Error>;

    /// The `(turn, tick)` of every keyframe taken for `graph` on `branch`,
    /// in ascending order.
    fn keyframes_list(&self, graph: &Value, branch: &str) -> Result<Vec<(u64, u64)>, Error>;

    /// The keyframe at the exact time, if one was taken there.
    fn get_keyframe(
        &self,
        graph: &Value,
        branch: &str,
        turn: u64,
        tick: u64,
    ) -> Result<Option<KeyframeRow>, Error>;

    /// Stores a keyframe, overwriting any existing one at the same
    /// `(graph, branch, turn, tick)`.
    fn keyframes_insert(&mut self, row: KeyframeRow) -> Result<(), Error>;

    /// Node-existence rows for `graph` on `branch` in the half-open forward
    /// window `(from, to]`.
    fn load_nodes(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<NodeRow>, Error>;

    /// Edge-existence rows for `graph` on `branch` in `(from, to]`.
    fn load_edges(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<EdgeRow>, Error>;

    /// Graph-attribute rows for `graph` on `branch` in `(from, to]`.
    fn load_graph_val(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<GraphValRow>, Error>;

    /// Node-attribute rows for `graph` on `branch` in `(from, to]`.
    fn load_node_val(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<NodeValRow>, Error>;

    /// Edge-attribute rows for `graph` on `branch` in `(from, to]`.
    fn load_edge_val(
        &self,
        graph: &Value,
        branch: &str,
        from: (u64, u64),
        to: (u64, u64),
    ) -> Result<Vec<EdgeValRow>, Error>;

    /// Appends a node-existence write. Errors if the exact `(branch, turn,
    /// tick)` already has an entry for this node (data-model invariant 5).
    fn set_node(&mut self, row: NodeRow) -> Result<(), Error>;

    /// Appends an edge-existence write.
    fn set_edge(&mut self, row: EdgeRow) -> Result<(), Error>;

    /// Appends a graph-attribute write.
    fn set_graph_val(&mut self, row: GraphValRow) -> Result<(), Error>;

    /// Appends a node-attribute write.
    fn set_node_val(&mut self, row: NodeValRow) -> Result<(), Error>;

    /// Appends an edge-attribute write.
    fn set_edge_val(&mut self, row: EdgeValRow) -> Result<(), Error>;

    /// Every plan row ever recorded.
    fn plans_dump(&self) -> Result<Vec<PlanRow>, Error>;

    /// Records a new plan row.
    fn plans_insert(&mut self, row: PlanRow) -> Result<(), Error>;

    /// Every tick `plan_id` has written to, in ascending order.
    fn plan_ticks_dump(&self, plan_id: u64) -> Result<Vec<PlanTickRow>, Error>;

    /// Records a plan-tick row.
    fn plan_ticks_insert(&mut self, row: PlanTickRow) -> Result<(), Error>;

    /// Flushes any buffered writes durably. A no-op for backends with no
    /// write buffering.
    fn commit(&mut self) -> Result<(), Error>;

    /// Releases any held resources (file handles, connections). After this
    /// call the backend must not be used again.
    fn close(&mut self) -> Result<(), Error>;
}
