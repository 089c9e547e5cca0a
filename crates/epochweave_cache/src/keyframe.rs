//! `KeyframeManager`: full-graph-state snapshots, spec §4.4's C4.
//!
//! Each keyframe is a complete [`GraphState`], not the five separate
//! per-family maps the distilled model describes: `GraphState` already
//! clones in O(1) thanks to structural sharing, which removes the reason
//! the per-family split existed in the first place, and it sidesteps a
//! subtle bug class that split model had around edge-value deletion
//! (checking existence in one nested map before touching another) — here
//! that cascade lives once, in [`epochweave_storage::GraphState::del_edge`],
//! and every keyframe operation inherits it for free.

use epochweave_foundation::{Error, PMap};
use epochweave_storage::{GraphName, GraphState};
use epochweave_timeline::{BranchId, BranchInfo, Tick, Turn, WindowDict};

use crate::delta::GraphDelta;
use crate::graph_caches::GraphCaches;

/// Stores and synthesizes keyframes: full `GraphState` snapshots taken at
/// particular times, one `WindowDict` per `(graph, branch)` pair.
#[derive(Debug, Clone)]
pub struct KeyframeManager {
    keyframes: PMap<(GraphName, BranchId), WindowDict<GraphState>>,
}

impl Default for KeyframeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyframeManager {
    /// An empty keyframe store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyframes: PMap::new(),
        }
    }

    /// The keyframe at the exact time, if one was taken there.
    #[must_use]
    pub fn get_exact(
        &self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
    ) -> Option<&GraphState> {
        self.keyframes
            .get(&(graph.clone(), branch.clone()))?
            .get_exact(turn, tick)
    }

    /// The nearest keyframe at or before the given time, along with the
    /// time it was taken at.
    #[must_use]
    pub fn nearest_at_or_before(
        &self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
    ) -> Option<((Turn, Tick), &GraphState)> {
        self.keyframes
            .get(&(graph.clone(), branch.clone()))?
            .retrieve_with_key(turn, tick)
    }

    /// Stores `state` as the keyframe for `graph` on `branch` at `(turn,
    /// tick)`, overwriting any keyframe already there.
    pub fn store(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        state: GraphState,
    ) {
        let key = (graph.clone(), branch.clone());
        let mut window = self.keyframes.get(&key).cloned().unwrap_or_default();
        window.set(turn, tick, state);
        self.keyframes = self.keyframes.insert(key, window);
    }

    /// Takes a keyframe directly, with no reference to any prior keyframe
    /// or journal. Used when ingesting a keyframe row loaded straight from
    /// persistence (spec §4.7), and for the implicit empty keyframe every
    /// new graph starts with.
    pub fn snap_keyframe_de_novo(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        state: GraphState,
    ) {
        self.store(graph, branch, turn, tick, state);
    }

    /// Takes a keyframe by applying a precomputed delta to the keyframe
    /// already sitting at `from`. Used when a delta has been loaded
    /// straight from persistence rather than recomputed from journals;
    /// `from` and `to` must be on the same branch — a keyframe never
    /// splices across a branch fork directly, since the two sides of a fork
    /// point share no `GraphDelta` (the caller should recurse through
    /// [`KeyframeManager::snap_keyframe`] instead if the base lives on a
    /// parent branch).
    pub fn snap_keyframe_from_delta(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
        delta: &GraphDelta,
    ) -> Result<GraphState, Error> {
        let base = self
            .get_exact(graph, branch, from.0, from.1)
            .ok_or_else(|| {
                Error::internal(format!(
                    "no keyframe for {graph:?} on {branch} at {from:?} to apply delta onto"
                ))
            })?
            .clone();
        let state = delta.apply(&base);
        self.store(graph, branch, to.0, to.1, state.clone());
        Ok(state)
    }

    /// Synthesizes (and caches) the keyframe for `graph` on `branch` at
    /// `(turn, tick)`, recursing into the branch's parent chain if no
    /// keyframe exists anywhere on this branch yet.
    ///
    /// `branch_info` resolves a `BranchId` to its `BranchInfo`, standing in
    /// for a full `Timeline` reference so this can be tested without
    /// constructing one.
    pub fn snap_keyframe<F>(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        caches: &GraphCaches,
        branch_info: &F,
    ) -> Result<GraphState, Error>
    where
        F: Fn(&BranchId) -> Option<BranchInfo>,
    {
        if let Some(state) = self.get_exact(graph, branch, turn, tick) {
            return Ok(state.clone());
        }

        if let Some(((base_turn, base_tick), base_state)) =
            self.nearest_at_or_before(graph, branch, turn, tick)
        {
            let base_state = base_state.clone();
            let delta = caches.build_delta(branch, (base_turn, base_tick), (turn, tick));
            let state = delta.apply(&base_state);
            self.store(graph, branch, turn, tick, state.clone());
            return Ok(state);
        }

        let info = branch_info(branch).ok_or_else(|| {
            Error::internal(format!("no branch info for {branch} while snapping a keyframe"))
        })?;

        // The queried time predates this branch's own start, so this
        // branch's journal has nothing to contribute (it cannot have
        // written anything before it existed) — recurse straight into the
        // parent at the time actually queried rather than at the fork
        // point, or the result would silently be `parent@fork_start`
        // instead of `parent@query` (spec §3 invariant 4).
        if (turn, tick) < (info.turn_start, info.tick_start) {
            return match &info.parent {
                Some(parent) => self.snap_keyframe(graph, parent, turn, tick, caches, branch_info),
                None => Ok(GraphState::new()),
            };
        }

        let base_state = match &info.parent {
            Some(parent) => self.snap_keyframe(
                graph,
                parent,
                info.turn_start,
                info.tick_start,
                caches,
                branch_info,
            )?,
            None => GraphState::new(),
        };

        let delta = caches.build_delta(branch, (info.turn_start, info.tick_start), (turn, tick));
        let state = delta.apply(&base_state);
        self.store(graph, branch, turn, tick, state.clone());
        Ok(state)
    }

    /// Returns true if any keyframe has ever been taken for `graph` on any
    /// branch. Unload is a no-op when this is false: with nothing to
    /// bracket against, truncating a journal would make some past state
    /// unreconstructable.
    #[must_use]
    pub fn has_any(&self, graph: &GraphName) -> bool {
        self.keyframes.keys().any(|(g, _)| g == graph)
    }

    /// Drops every keyframe entry after `(turn, tick)` for `graph` on
    /// `branch` (spec §4.7 unload).
    pub fn truncate_forward(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        keep_at: bool,
    ) {
        let key = (graph.clone(), branch.clone());
        if let Some(mut window) = self.keyframes.get(&key).cloned() {
            window.truncate_forward(turn, tick, keep_at);
            self.keyframes = self.keyframes.insert(key, window);
        }
    }

    /// Drops every keyframe entry before `(turn, tick)` for `graph` on
    /// `branch`.
    pub fn truncate_backward(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        keep_at: bool,
    ) {
        let key = (graph.clone(), branch.clone());
        if let Some(mut window) = self.keyframes.get(&key).cloned() {
            window.truncate_backward(turn, tick, keep_at);
            self.keyframes = self.keyframes.insert(key, window);
        }
    }

    /// Drops every keyframe for `graph` on `branch` entirely.
    pub fn drop_branch(&mut self, graph: &GraphName, branch: &BranchId) {
        self.keyframes = self.keyframes.remove(&(graph.clone(), branch.clone()));
    }

    /// A commutative content hash of the keyframe at the exact time, for the
    /// sanity check described in [`epochweave_storage::GraphState::commutative_digest`].
    #[must_use]
    pub fn kf_hash(
        &self,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
    ) -> Option<[u8; 64]> {
        self.get_exact(graph, branch, turn, tick)
            .map(GraphState::commutative_digest)
    }
}
