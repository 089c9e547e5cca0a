//! `OrmState`: everything the world lock guards, and the six-tuple the
//! time-change signal fires with.

use std::collections::HashMap;

use epochweave_cache::{GraphCaches, GraphDelta, KeyframeManager};
use epochweave_foundation::{Error, Result, Value};
use epochweave_loader::Loader;
use epochweave_persist::{
    Backend, EdgeRow, EdgeValRow, GraphRow, GraphValRow, KeyframeRow, NodeRow, NodeValRow,
};
use epochweave_plan::{PlanId, PlanManager};
use epochweave_storage::{is_reserved_graph_name, EdgeKey, GraphKind, GraphName, GraphState, NodeKey};
use epochweave_timeline::{BranchId, BranchInfo, Tick, Time, Timeline, Turn};

/// The six-tuple fired to every listener registered via `Orm::on_time_change`,
/// emitted only after all cursor bookkeeping for the triggering call has
/// completed (spec §5's ordering guarantee).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeChange {
    /// Branch before the move.
    pub branch_then: BranchId,
    /// Turn before the move.
    pub turn_then: Turn,
    /// Tick before the move.
    pub tick_then: Tick,
    /// Branch after the move.
    pub branch_now: BranchId,
    /// Turn after the move.
    pub turn_now: Turn,
    /// Tick after the move.
    pub tick_now: Tick,
}

impl TimeChange {
    pub(crate) fn between(then: &Time, now: &Time) -> Self {
        Self {
            branch_then: then.branch.clone(),
            turn_then: then.turn,
            tick_then: then.tick,
            branch_now: now.branch.clone(),
            turn_now: now.turn,
            tick_now: now.tick,
        }
    }
}

/// Bookkeeping a single write needs after `Timeline::nbtt` mints its tick.
struct AdvancedWrite {
    branch: BranchId,
    turn: Turn,
    tick: Tick,
}

/// Everything the world lock guards: the cursor, every graph's caches and
/// keyframes, the plan manager, the loader, and the persistence backend.
pub(crate) struct OrmState {
    pub(crate) timeline: Timeline,
    kinds: HashMap<GraphName, GraphKind>,
    caches: HashMap<GraphName, GraphCaches>,
    keyframes: KeyframeManager,
    plans: PlanManager,
    loader: Loader,
    backend: Box<dyn Backend>,
    pub(crate) active_plan: Option<PlanId>,
    pub(crate) listeners: Vec<Box<dyn FnMut(&TimeChange) + Send>>,
}

/// Resolves a `BranchId` to its `BranchInfo` without borrowing all of
/// `OrmState`, so it can be held alongside a disjoint mutable borrow of
/// `caches`/`keyframes`/`loader` in the same expression.
fn branch_info_fn(timeline: &Timeline) -> impl Fn(&BranchId) -> Option<BranchInfo> + '_ {
    move |branch: &BranchId| timeline.branch_info(branch).ok().cloned()
}

impl OrmState {
    pub(crate) fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            timeline: Timeline::new(),
            kinds: HashMap::new(),
            caches: HashMap::new(),
            keyframes: KeyframeManager::new(),
            plans: PlanManager::new(),
            loader: Loader::new(),
            backend,
            active_plan: None,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn ensure_graph(&self, graph: &GraphName) -> Result<()> {
        if self.kinds.contains_key(graph) {
            Ok(())
        } else {
            Err(Error::key_not_found(format!("no such graph: {graph:?}")))
        }
    }

    pub(crate) fn graph_kind(&self, graph: &GraphName) -> Result<GraphKind> {
        self.kinds
            .get(graph)
            .copied()
            .ok_or_else(|| Error::key_not_found(format!("no such graph: {graph:?}")))
    }

    pub(crate) fn new_graph(&mut self, name: GraphName, kind: GraphKind) -> Result<()> {
        if let Some(label) = name.as_str() {
            if is_reserved_graph_name(label) {
                return Err(Error::graph_name(format!("{label} is reserved")));
            }
        }
        if self.kinds.contains_key(&name) {
            return Err(Error::graph_name(format!("{name:?} already exists")));
        }
        if kind == GraphKind::Undirected {
            return Err(Error::graph_name(
                "only directed graphs are implemented".to_string(),
            ));
        }

        self.backend.new_graph(GraphRow {
            graph: name.clone(),
            kind,
        })?;
        self.kinds.insert(name.clone(), kind);
        self.caches.insert(name.clone(), GraphCaches::new());
        self.keyframes.snap_keyframe_de_novo(
            &name,
            self.timeline.branch(),
            self.timeline.turn(),
            self.timeline.tick(),
            GraphState::new(),
        );
        Ok(())
    }

    pub(crate) fn del_graph(&mut self, graph: &GraphName) -> Result<()> {
        self.ensure_graph(graph)?;
        self.backend.del_graph(graph)?;
        self.kinds.remove(graph);
        self.caches.remove(graph);
        let branches: Vec<BranchId> = self
            .timeline
            .iter_branches()
            .map(|(branch, _)| branch.clone())
            .collect();
        for branch in branches {
            self.keyframes.drop_branch(graph, &branch);
        }
        Ok(())
    }

    fn ensure_loaded(&mut self, graph: &GraphName) -> Result<()> {
        let time = self.timeline.time();
        let batch = self.timeline.is_batch();
        let info = branch_info_fn(&self.timeline);
        let caches = self.caches.get_mut(graph).expect("ensure_graph called first");
        self.loader.load_at(
            self.backend.as_ref(),
            caches,
            &mut self.keyframes,
            graph,
            &time.branch,
            time.turn,
            time.tick,
            batch,
            &info,
        )
    }

    /// The full graph snapshot at the current cursor, loading and
    /// memoizing a keyframe there if one isn't already cached.
    pub(crate) fn snapshot(&mut self, graph: &GraphName) -> Result<GraphState> {
        self.ensure_graph(graph)?;
        self.ensure_loaded(graph)?;
        let time = self.timeline.time();
        let info = branch_info_fn(&self.timeline);
        let caches = self.caches.get(graph).expect("ensure_graph called first");
        self.keyframes
            .snap_keyframe(graph, &time.branch, time.turn, time.tick, caches, &info)
    }

    /// Warms the cache for `graph` at `(branch, turn, tick)` without moving
    /// the cursor, for `CacheArranger`'s background prefetch (spec §10).
    pub(crate) fn prefetch(&mut self, graph: &GraphName, branch: &BranchId, turn: Turn, tick: Tick) -> Result<()> {
        self.ensure_graph(graph)?;
        let batch = self.timeline.is_batch();
        let info = branch_info_fn(&self.timeline);
        let caches = self.caches.get_mut(graph).expect("ensure_graph called first");
        self.loader
            .load_at(self.backend.as_ref(), caches, &mut self.keyframes, graph, branch, turn, tick, batch, &info)?;
        let caches = self.caches.get(graph).expect("ensure_graph called first");
        self.keyframes
            .snap_keyframe(graph, branch, turn, tick, caches, &info)?;
        Ok(())
    }

    /// Builds the delta carrying `graph` from `from` to `to` on `branch`,
    /// per spec §4.6; used by `Orm::get_delta`.
    pub(crate) fn get_delta(
        &mut self,
        graph: &GraphName,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> Result<GraphDelta> {
        self.ensure_graph(graph)?;
        let batch = self.timeline.is_batch();
        let info = branch_info_fn(&self.timeline);
        let caches = self.caches.get_mut(graph).expect("ensure_graph called first");
        self.loader.load_at(
            self.backend.as_ref(),
            caches,
            &mut self.keyframes,
            graph,
            branch,
            to.0,
            to.1,
            batch,
            &info,
        )?;
        Ok(self.caches[graph].build_delta(branch, from, to))
    }

    /// Advances the cursor past the current write, extending plan and
    /// loader bookkeeping (spec §4.1 rules 4 and 6, the caller's
    /// responsibility per `Timeline::nbtt`'s own doc comment).
    ///
    /// A non-planning write at or after a point some plan already wrote to
    /// contradicts that plan from there forward (spec §3, §4.5): this is
    /// the automatic trigger, distinct from `contradict_from`'s explicit,
    /// still-planning one.
    fn advance(&mut self) -> Result<AdvancedWrite> {
        let branch = self.timeline.branch().clone();
        let outcome = self.timeline.nbtt()?;
        if outcome.planning {
            let plan = self
                .active_plan
                .ok_or_else(|| Error::internal("planning mode active with no active plan"))?;
            let time = Time::new(branch.clone(), outcome.time_turn, outcome.time_tick);
            self.plans.record_write(plan, &time)?;
        } else {
            self.contradict_future_plans(&branch, outcome.time_turn, outcome.time_tick);
        }
        self.loader.note_write(&branch, outcome.time_turn, outcome.time_tick);
        Ok(AdvancedWrite {
            branch,
            turn: outcome.time_turn,
            tick: outcome.time_tick,
        })
    }

    /// Invalidates every plan on `branch` that holds a write at or after
    /// `(turn, tick)`, the automatic half of spec §4.5 "Contradiction".
    /// Shares `contradict_from`'s whole-cache-forward-truncation
    /// approximation (see `DESIGN.md`) since there is no reverse
    /// `where_cached` index to target the exact keys touched.
    fn contradict_future_plans(&mut self, branch: &BranchId, turn: Turn, tick: Tick) {
        let mut earliest: Option<(Turn, Tick)> = None;
        for (plan, _) in self.plans.plans_at_or_after(branch, (turn, tick)) {
            let removed = self.plans.invalidate_from(plan, branch, (turn, tick));
            let plan_earliest = removed.iter().map(|t| (t.turn, t.tick)).min();
            earliest = match (earliest, plan_earliest) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, None) => a,
                (None, b) => b,
            };
        }
        let Some(earliest) = earliest else {
            return;
        };
        for caches in self.caches.values_mut() {
            caches.truncate_forward(branch, earliest.0, earliest.1, false);
        }
    }

    pub(crate) fn set_graph_val(&mut self, graph: &GraphName, key: Value, value: Value) -> Result<()> {
        self.ensure_graph(graph)?;
        let old = self.snapshot(graph)?.graph_val(&key).cloned();
        let w = self.advance()?;
        self.caches
            .get_mut(graph)
            .expect("ensured above")
            .graph_val
            .record(&w.branch, w.turn, w.tick, key.clone(), value.clone(), old);
        self.backend.set_graph_val(GraphValRow {
            graph: graph.clone(),
            key,
            branch: w.branch.as_str().to_string(),
            turn: w.turn,
            tick: w.tick,
            value,
        })?;
        Ok(())
    }

    pub(crate) fn exists_node(&mut self, graph: &GraphName, node: &NodeKey) -> Result<bool> {
        Ok(self.snapshot(graph)?.has_node(node))
    }

    pub(crate) fn node_val(&mut self, graph: &GraphName, node: &NodeKey, key: &Value) -> Result<Value> {
        let state = self.snapshot(graph)?;
        if !state.has_node(node) {
            return Err(Error::key_not_found(format!("no such node: {node:?}")));
        }
        Ok(state.node_val(node, key).cloned().unwrap_or(Value::Nil))
    }

    pub(crate) fn set_node(&mut self, graph: &GraphName, node: NodeKey, exists: bool) -> Result<()> {
        self.ensure_graph(graph)?;
        let had = self.snapshot(graph)?.has_node(&node);
        let w = self.advance()?;
        self.caches
            .get_mut(graph)
            .expect("ensured above")
            .nodes
            .record(&w.branch, w.turn, w.tick, node.clone(), exists, Some(had));
        self.backend.set_node(NodeRow {
            graph: graph.clone(),
            node,
            branch: w.branch.as_str().to_string(),
            turn: w.turn,
            tick: w.tick,
            exists,
        })?;
        Ok(())
    }

    pub(crate) fn set_node_val(
        &mut self,
        graph: &GraphName,
        node: NodeKey,
        key: Value,
        value: Value,
    ) -> Result<()> {
        self.ensure_graph(graph)?;
        let state = self.snapshot(graph)?;
        if !state.has_node(&node) {
            return Err(Error::key_not_found(format!("no such node: {node:?}")));
        }
        let old = state.node_val(&node, &key).cloned();
        let w = self.advance()?;
        self.caches.get_mut(graph).expect("ensured above").node_val.record(
            &w.branch,
            w.turn,
            w.tick,
            (node.clone(), key.clone()),
            value.clone(),
            old,
        );
        self.backend.set_node_val(NodeValRow {
            graph: graph.clone(),
            node,
            key,
            branch: w.branch.as_str().to_string(),
            turn: w.turn,
            tick: w.tick,
            value,
        })?;
        Ok(())
    }

    pub(crate) fn exists_edge(&mut self, graph: &GraphName, edge: &EdgeKey) -> Result<bool> {
        Ok(self.snapshot(graph)?.has_edge(&edge.0, &edge.1, edge.2))
    }

    pub(crate) fn edge_val(&mut self, graph: &GraphName, edge: &EdgeKey, key: &Value) -> Result<Value> {
        let state = self.snapshot(graph)?;
        if !state.has_edge(&edge.0, &edge.1, edge.2) {
            return Err(Error::key_not_found(format!("no such edge: {edge:?}")));
        }
        Ok(state.edge_val(edge, key).cloned().unwrap_or(Value::Nil))
    }

    pub(crate) fn set_edge(&mut self, graph: &GraphName, edge: EdgeKey, exists: bool) -> Result<()> {
        self.ensure_graph(graph)?;
        let state = self.snapshot(graph)?;
        if exists && (!state.has_node(&edge.0) || !state.has_node(&edge.1)) {
            return Err(Error::key_not_found(format!(
                "edge endpoints must exist: {:?} -> {:?}",
                edge.0, edge.1
            )));
        }
        let had = state.has_edge(&edge.0, &edge.1, edge.2);
        let w = self.advance()?;
        self.caches
            .get_mut(graph)
            .expect("ensured above")
            .edges
            .record(&w.branch, w.turn, w.tick, edge.clone(), exists, Some(had));
        self.backend.set_edge(EdgeRow {
            graph: graph.clone(),
            orig: edge.0.clone(),
            dest: edge.1.clone(),
            idx: edge.2,
            branch: w.branch.as_str().to_string(),
            turn: w.turn,
            tick: w.tick,
            exists,
        })?;
        Ok(())
    }

    pub(crate) fn set_edge_val(
        &mut self,
        graph: &GraphName,
        edge: EdgeKey,
        key: Value,
        value: Value,
    ) -> Result<()> {
        self.ensure_graph(graph)?;
        let state = self.snapshot(graph)?;
        if !state.has_edge(&edge.0, &edge.1, edge.2) {
            return Err(Error::key_not_found(format!("no such edge: {edge:?}")));
        }
        let old = state.edge_val(&edge, &key).cloned();
        let w = self.advance()?;
        self.caches.get_mut(graph).expect("ensured above").edge_val.record(
            &w.branch,
            w.turn,
            w.tick,
            (edge.clone(), key.clone()),
            value.clone(),
            old,
        );
        self.backend.set_edge_val(EdgeValRow {
            graph: graph.clone(),
            orig: edge.0.clone(),
            dest: edge.1.clone(),
            idx: edge.2,
            key,
            branch: w.branch.as_str().to_string(),
            turn: w.turn,
            tick: w.tick,
            value,
        })?;
        Ok(())
    }

    /// Switches the cursor's branch, copying plan bookkeeping (not cached
    /// values — see `DESIGN.md`) for any plan active at the fork point when
    /// the branch is freshly created.
    pub(crate) fn set_branch(&mut self, branch: BranchId) -> Result<()> {
        let from = self.timeline.time();
        if self.timeline.set_branch(branch.clone())?.is_some() {
            let _ = self.plans.fork(&from.branch, &from, branch);
        }
        Ok(())
    }

    pub(crate) fn set_turn(&mut self, turn: Turn) -> Result<()> {
        self.timeline.set_turn(turn)
    }

    pub(crate) fn set_tick(&mut self, tick: Tick) -> Result<()> {
        self.timeline.set_tick(tick)
    }

    pub(crate) fn new_plan(&mut self) -> PlanId {
        self.plans.new_plan(self.timeline.time())
    }

    /// Rolls a plan's writes back to before `(turn, tick)` on the current
    /// branch (spec §4.5 "Contradiction").
    ///
    /// `PlanManager` tracks which times a plan wrote to, not which keys —
    /// there is no reverse `where_cached` index from time to key in this
    /// engine (see `DESIGN.md`). So rather than re-deriving the exact keys
    /// touched, this truncates every journal's cache entries for the branch
    /// from the earliest invalidated time onward. That is exact as long as
    /// no other plan has tentative writes interleaved past the same point,
    /// which holds for the common single-plan-ahead-of-the-frontier case;
    /// a second plan racing past the same frontier would also lose its
    /// entries here.
    pub(crate) fn contradict_from(&mut self, plan: PlanId, turn: Turn, tick: Tick) -> Result<()> {
        let branch = self.timeline.branch().clone();
        let removed = self.plans.invalidate_from(plan, &branch, (turn, tick));
        let Some(earliest) = removed.iter().map(|t| (t.turn, t.tick)).min() else {
            return Ok(());
        };
        for caches in self.caches.values_mut() {
            caches.truncate_forward(&branch, earliest.0, earliest.1, false);
        }
        Ok(())
    }

    /// Takes (and persists) a keyframe for every known graph at the current
    /// cursor.
    pub(crate) fn snap_keyframe_all(&mut self) -> Result<()> {
        let graphs: Vec<GraphName> = self.kinds.keys().cloned().collect();
        for graph in graphs {
            let state = self.snapshot(&graph)?;
            let time = self.timeline.time();
            self.backend.keyframes_insert(KeyframeRow {
                graph,
                branch: time.branch.as_str().to_string(),
                turn: time.turn,
                tick: time.tick,
                state,
            })?;
        }
        Ok(())
    }

    pub(crate) fn commit(&mut self) -> Result<()> {
        self.backend.commit()
    }

    pub(crate) fn close(&mut self) -> Result<()> {
        self.backend.close()
    }
}
