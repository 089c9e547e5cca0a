//! `Loader`: windowed on-demand loading and eviction.

use std::collections::HashMap;

use epochweave_cache::{GraphCaches, KeyframeManager};
use epochweave_foundation::{Error, Value};
use epochweave_persist::Backend;
use epochweave_storage::{EdgeKey, GraphName, GraphState, NodeKey};
use epochweave_timeline::{BranchId, BranchInfo, Tick, Turn};

/// Tracks, per branch, the `(turn, tick)` window currently loaded into the
/// in-memory caches, and moves that window by streaming rows in from a
/// [`Backend`] or dropping them.
#[derive(Debug, Default)]
pub struct Loader {
    loaded: HashMap<BranchId, (Turn, Tick, Turn, Tick)>,
}

impl Loader {
    /// Creates a loader with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The `(turn, tick)` window currently loaded for `branch`, if any.
    #[must_use]
    pub fn loaded_window(&self, branch: &BranchId) -> Option<(Turn, Tick, Turn, Tick)> {
        self.loaded.get(branch).copied()
    }

    /// Ensures `(turn, tick)` on `branch` is covered by the loaded window
    /// for `graph`, loading whatever is missing.
    ///
    /// If no keyframe exists anywhere on `branch`, recurses into the
    /// parent branch at its fork point first (via `branch_info`), so the
    /// parent's state is loaded and keyframed before this branch's own
    /// journal is streamed in on top of it — unless `batch` is set, in
    /// which case that eager synthesis is skipped (spec §4.2: batch mode
    /// disables keyframe synthesis on load) and deferred to whenever a
    /// read actually asks `KeyframeManager::snap_keyframe` for it.
    pub fn load_at<F>(
        &mut self,
        backend: &dyn Backend,
        caches: &mut GraphCaches,
        keyframes: &mut KeyframeManager,
        graph: &GraphName,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        batch: bool,
        branch_info: &F,
    ) -> Result<(), Error>
    where
        F: Fn(&BranchId) -> Option<BranchInfo>,
    {
        if let Some((lt, lk, ut, uk)) = self.loaded.get(branch).copied() {
            if (lt, lk) <= (turn, tick) && (turn, tick) <= (ut, uk) {
                return Ok(());
            }
        }

        let persisted = backend.keyframes_list(graph, branch.as_str())?;
        let lower = persisted
            .into_iter()
            .filter(|&(t, k)| (t, k) <= (turn, tick))
            .max();

        let (base_turn, base_tick) = if let Some((kt, kk)) = lower {
            let row = backend
                .get_keyframe(graph, branch.as_str(), kt, kk)?
                .ok_or_else(|| {
                    Error::internal(format!("keyframe listed but not found at {kt}:{kk}"))
                })?;
            keyframes.snap_keyframe_de_novo(graph, branch, kt, kk, row.state);
            (kt, kk)
        } else {
            let info = branch_info(branch)
                .ok_or_else(|| Error::internal(format!("no branch info for {branch}")))?;
            match &info.parent {
                Some(parent) => {
                    self.load_at(
                        backend,
                        caches,
                        keyframes,
                        graph,
                        parent,
                        info.turn_start,
                        info.tick_start,
                        batch,
                        branch_info,
                    )?;
                    if !batch {
                        let state = keyframes.snap_keyframe(
                            graph,
                            parent,
                            info.turn_start,
                            info.tick_start,
                            caches,
                            branch_info,
                        )?;
                        keyframes.snap_keyframe_de_novo(
                            graph,
                            branch,
                            info.turn_start,
                            info.tick_start,
                            state,
                        );
                    }
                }
                None => {
                    if !batch {
                        keyframes.snap_keyframe_de_novo(graph, branch, 0, 0, GraphState::new());
                    }
                }
            }
            (info.turn_start, info.tick_start)
        };

        self.stream_rows(backend, caches, graph, branch, (base_turn, base_tick), (turn, tick))?;

        let merged = match self.loaded.get(branch) {
            Some(&(elt, elk, eut, euk)) => (
                elt.min(base_turn).max(0),
                if elt <= base_turn { elk } else { base_tick },
                eut.max(turn),
                if eut >= turn { euk } else { tick },
            ),
            None => (base_turn, base_tick, turn, tick),
        };
        self.loaded.insert(branch.clone(), merged);

        Ok(())
    }

    fn stream_rows(
        &self,
        backend: &dyn Backend,
        caches: &mut GraphCaches,
        graph: &GraphName,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> Result<(), Error> {
        let mut prev_graph_val: HashMap<Value, Value> = HashMap::new();
        for row in backend.load_graph_val(graph, branch.as_str(), from, to)? {
            let old = prev_graph_val.get(&row.key).cloned();
            caches
                .graph_val
                .record(branch, row.turn, row.tick, row.key.clone(), row.value.clone(), old);
            prev_graph_val.insert(row.key, row.value);
        }

        let mut prev_nodes: HashMap<NodeKey, bool> = HashMap::new();
        for row in backend.load_nodes(graph, branch.as_str(), from, to)? {
            let old = prev_nodes.get(&row.node).copied();
            caches
                .nodes
                .record(branch, row.turn, row.tick, row.node.clone(), row.exists, old);
            prev_nodes.insert(row.node, row.exists);
        }

        let mut prev_node_val: HashMap<(NodeKey, Value), Value> = HashMap::new();
        for row in backend.load_node_val(graph, branch.as_str(), from, to)? {
            let key = (row.node, row.key);
            let old = prev_node_val.get(&key).cloned();
            caches
                .node_val
                .record(branch, row.turn, row.tick, key.clone(), row.value.clone(), old);
            prev_node_val.insert(key, row.value);
        }

        let mut prev_edges: HashMap<EdgeKey, bool> = HashMap::new();
        for row in backend.load_edges(graph, branch.as_str(), from, to)? {
            let key = (row.orig, row.dest, row.idx);
            let old = prev_edges.get(&key).copied();
            caches
                .edges
                .record(branch, row.turn, row.tick, key.clone(), row.exists, old);
            prev_edges.insert(key, row.exists);
        }

        let mut prev_edge_val: HashMap<(EdgeKey, Value), Value> = HashMap::new();
        for row in backend.load_edge_val(graph, branch.as_str(), from, to)? {
            let key = ((row.orig, row.dest, row.idx), row.key);
            let old = prev_edge_val.get(&key).cloned();
            caches
                .edge_val
                .record(branch, row.turn, row.tick, key.clone(), row.value.clone(), old);
            prev_edge_val.insert(key, row.value);
        }

        Ok(())
    }

    /// Widens the loaded window's upper edge for `branch` to include `(turn,
    /// tick)`, without touching the backend (spec §4.1 rule 6: "nudge the
    /// loaded interval's bracket" once a live write lands at a freshly
    /// minted tick). A write only ever happens at or past wherever the
    /// cursor was already loaded, so this never needs to seed the lower
    /// edge or touch any branch but the one just written to.
    pub fn note_write(&mut self, branch: &BranchId, turn: Turn, tick: Tick) {
        match self.loaded.get_mut(branch) {
            Some((_, _, ut, uk)) if (turn, tick) > (*ut, *uk) => {
                *ut = turn;
                *uk = tick;
            }
            Some(_) => {}
            None => {
                self.loaded.insert(branch.clone(), (turn, tick, turn, tick));
            }
        }
    }

    /// Shrinks loaded state for `graph` down to `[retain_from, retain_to]`
    /// on `retain_branch`, dropping every other loaded branch entirely.
    ///
    /// A no-op if no keyframe has ever been taken for `graph` anywhere:
    /// with nothing to bracket against, truncating a journal risks making
    /// some already-visited time unreconstructable.
    pub fn unload(
        &mut self,
        caches: &mut GraphCaches,
        keyframes: &mut KeyframeManager,
        graph: &GraphName,
        retain_branch: &BranchId,
        retain_from: (Turn, Tick),
        retain_to: (Turn, Tick),
        other_loaded_branches: &[BranchId],
    ) {
        if !keyframes.has_any(graph) {
            return;
        }

        let lower = keyframes
            .nearest_at_or_before(graph, retain_branch, retain_from.0, retain_from.1)
            .map_or(retain_from, |(t, _)| t);

        caches.truncate_backward(retain_branch, lower.0, lower.1, true);
        keyframes.truncate_backward(graph, retain_branch, lower.0, lower.1, true);
        caches.truncate_forward(retain_branch, retain_to.0, retain_to.1, true);
        keyframes.truncate_forward(graph, retain_branch, retain_to.0, retain_to.1, true);

        for branch in other_loaded_branches {
            if branch != retain_branch {
                caches.drop_branch(branch);
                keyframes.drop_branch(graph, branch);
                self.loaded.remove(branch);
            }
        }

        self.loaded
            .insert(retain_branch.clone(), (lower.0, lower.1, retain_to.0, retain_to.1));
    }
}
