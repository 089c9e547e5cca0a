//! [`Orm`]: the re-entrant-locked facade tying every other crate together.

use std::cell::RefCell;
use std::mem;

use parking_lot::ReentrantMutex;

use epochweave_cache::GraphDelta;
use epochweave_foundation::{Result, Value};
use epochweave_persist::{Backend, MemoryBackend};
use epochweave_plan::PlanId;
use epochweave_storage::{EdgeKey, GraphKind, GraphName, NodeKey};
use epochweave_timeline::{BranchId, Tick, Turn};

use crate::guards::{AdvancingGuard, BatchGuard, PlanGuard};
use crate::handle::GraphHandle;
use crate::state::{OrmState, TimeChange};

/// The world lock: a re-entrant mutex around a `RefCell`-wrapped [`OrmState`].
///
/// Re-entrant because a guard (`PlanGuard`, `AdvancingGuard`, `BatchGuard`)
/// held across a sequence of otherwise-independent `Orm` calls must not
/// deadlock the thread that's holding it; `RefCell` because re-entering on
/// the same thread only gives `&OrmState` back from the mutex itself, and
/// every mutating call needs `&mut OrmState`.
pub struct Orm {
    lock: ReentrantMutex<RefCell<OrmState>>,
}

impl Default for Orm {
    fn default() -> Self {
        Self::new(Box::new(MemoryBackend::new()))
    }
}

impl Orm {
    /// Builds an `Orm` over the given persistence backend.
    #[must_use]
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            lock: ReentrantMutex::new(RefCell::new(OrmState::new(backend))),
        }
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut OrmState) -> R) -> R {
        let guard = self.lock.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    /// Runs `f`, then fires every registered time-change listener if the
    /// cursor moved, after all of `f`'s own bookkeeping has completed (spec
    /// §5's ordering guarantee). Listeners are taken out of the state for
    /// the duration of the call: a listener that re-enters `Orm` would
    /// otherwise try to borrow the same `RefCell` twice and panic.
    fn with_time_change<R>(&self, f: impl FnOnce(&mut OrmState) -> Result<R>) -> Result<R> {
        let guard = self.lock.lock();
        let then = guard.borrow().timeline.time();
        let result = {
            let mut state = guard.borrow_mut();
            f(&mut state)?
        };
        let now = guard.borrow().timeline.time();

        if then != now {
            let mut listeners = {
                let mut state = guard.borrow_mut();
                mem::take(&mut state.listeners)
            };
            let change = TimeChange::between(&then, &now);
            for listener in &mut listeners {
                listener(&change);
            }
            guard.borrow_mut().listeners = listeners;
        }

        Ok(result)
    }

    // -- graph lifecycle ----------------------------------------------------

    /// Registers a new graph. Errors on a reserved or already-taken name.
    pub fn new_graph(&self, name: GraphName, kind: GraphKind) -> Result<()> {
        self.with_state(|state| state.new_graph(name, kind))
    }

    /// Removes a graph and everything recorded under it.
    pub fn del_graph(&self, graph: &GraphName) -> Result<()> {
        self.with_state(|state| state.del_graph(graph))
    }

    /// A capability view scoped to one graph.
    #[must_use]
    pub fn graph(&self, name: GraphName) -> GraphHandle<'_> {
        GraphHandle::new(self, name)
    }

    // -- attribute access -----------------------------------------------------

    pub(crate) fn graph_val(&self, graph: &GraphName, key: &Value) -> Result<Value> {
        self.with_state(|state| Ok(state.snapshot(graph)?.graph_val(key).cloned().unwrap_or(Value::Nil)))
    }

    pub(crate) fn set_graph_val(&self, graph: &GraphName, key: Value, value: Value) -> Result<()> {
        self.with_time_change(|state| state.set_graph_val(graph, key, value))
    }

    pub(crate) fn node_val(&self, graph: &GraphName, node: &NodeKey, key: &Value) -> Result<Value> {
        self.with_state(|state| state.node_val(graph, node, key))
    }

    pub(crate) fn set_node_val(&self, graph: &GraphName, node: NodeKey, key: Value, value: Value) -> Result<()> {
        self.with_time_change(|state| state.set_node_val(graph, node, key, value))
    }

    pub(crate) fn edge_val(&self, graph: &GraphName, edge: &EdgeKey, key: &Value) -> Result<Value> {
        self.with_state(|state| state.edge_val(graph, edge, key))
    }

    pub(crate) fn set_edge_val(&self, graph: &GraphName, edge: EdgeKey, key: Value, value: Value) -> Result<()> {
        self.with_time_change(|state| state.set_edge_val(graph, edge, key, value))
    }

    /// Whether `node` exists on `graph` at the current cursor.
    pub fn exists_node(&self, graph: &GraphName, node: &NodeKey) -> Result<bool> {
        self.with_state(|state| state.exists_node(graph, node))
    }

    /// Creates or removes `node` on `graph` at the current cursor.
    pub fn set_node(&self, graph: &GraphName, node: NodeKey, exists: bool) -> Result<()> {
        self.with_time_change(|state| state.set_node(graph, node, exists))
    }

    /// Whether `edge` exists on `graph` at the current cursor.
    pub fn exists_edge(&self, graph: &GraphName, edge: &EdgeKey) -> Result<bool> {
        self.with_state(|state| state.exists_edge(graph, edge))
    }

    /// Creates or removes `edge` on `graph` at the current cursor.
    pub fn set_edge(&self, graph: &GraphName, edge: EdgeKey, exists: bool) -> Result<()> {
        self.with_time_change(|state| state.set_edge(graph, edge, exists))
    }

    // -- cursor ---------------------------------------------------------------

    /// The current branch.
    #[must_use]
    pub fn branch(&self) -> BranchId {
        self.with_state(|state| state.timeline.branch().clone())
    }

    /// Switches (or forks) the current branch.
    pub fn set_branch(&self, branch: BranchId) -> Result<()> {
        self.with_time_change(|state| state.set_branch(branch))
    }

    /// The current turn.
    #[must_use]
    pub fn turn(&self) -> Turn {
        self.with_state(|state| state.timeline.turn())
    }

    /// Moves the cursor to `turn`.
    pub fn set_turn(&self, turn: Turn) -> Result<()> {
        self.with_time_change(|state| state.set_turn(turn))
    }

    /// The current tick.
    #[must_use]
    pub fn tick(&self) -> Tick {
        self.with_state(|state| state.timeline.tick())
    }

    /// Moves the cursor to `tick` within the current turn.
    pub fn set_tick(&self, tick: Tick) -> Result<()> {
        self.with_time_change(|state| state.set_tick(tick))
    }

    /// The current `(branch, turn)`, the coarse-grained position most
    /// callers care about.
    #[must_use]
    pub fn time(&self) -> (BranchId, Turn) {
        self.with_state(|state| {
            let time = state.timeline.time();
            (time.branch, time.turn)
        })
    }

    // -- mode guards ------------------------------------------------------------

    /// Enters forward (`advancing`) mode for the returned guard's lifetime.
    #[must_use]
    pub fn advancing(&self) -> AdvancingGuard<'_> {
        AdvancingGuard::enter(self)
    }

    /// Enters planning mode, minting a fresh plan for the returned guard's
    /// writes. `reset` restores the cursor to its pre-guard position when
    /// the guard drops.
    #[must_use]
    pub fn plan(&self, reset: bool) -> PlanGuard<'_> {
        PlanGuard::enter(self, reset)
    }

    /// Enters batch mode for the returned guard's lifetime.
    #[must_use]
    pub fn batch(&self) -> BatchGuard<'_> {
        BatchGuard::enter(self)
    }

    pub(crate) fn contradict_plan_from(&self, plan: PlanId, turn: Turn, tick: Tick) -> Result<()> {
        self.with_state(|state| state.contradict_from(plan, turn, tick))
    }

    // -- persistence lifecycle -------------------------------------------------

    /// Takes a keyframe for every known graph at the current cursor.
    pub fn snap_keyframe(&self) -> Result<()> {
        self.with_state(OrmState::snap_keyframe_all)
    }

    /// Flushes any buffered backend writes durably.
    pub fn commit(&self) -> Result<()> {
        self.with_state(OrmState::commit)
    }

    /// Releases the backend. The `Orm` must not be used again afterward.
    pub fn close(&self) -> Result<()> {
        self.with_state(OrmState::close)
    }

    /// The delta carrying `graph` from `from` to `to` on `branch` (spec
    /// §4.6).
    pub fn get_delta(
        &self,
        graph: &GraphName,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> Result<GraphDelta> {
        self.with_state(|state| state.get_delta(graph, branch, from, to))
    }

    /// Registers a callback fired after every cursor move with the
    /// before/after six-tuple.
    pub fn on_time_change(&self, callback: impl FnMut(&TimeChange) + Send + 'static) {
        self.with_state(|state| state.listeners.push(Box::new(callback)));
    }

    /// Warms the cache for `graph` at `(branch, turn, tick)` without moving
    /// the cursor. Used by [`crate::CacheArranger`]; harmless to call
    /// directly.
    pub fn prefetch(&self, graph: &GraphName, branch: &BranchId, turn: Turn, tick: Tick) -> Result<()> {
        self.with_state(|state| state.prefetch(graph, branch, turn, tick))
    }
}
