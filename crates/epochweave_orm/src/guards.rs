//! RAII mode guards for the world lock.
//!
//! `epochweave_timeline::guards` models `ForwardGuard`/`PlanningGuard`/
//! `BatchGuard` as borrowing `&mut Timeline` directly. `Orm` can't hand out a
//! borrow like that — its state lives behind a `RefCell` inside a re-entrant
//! mutex, and holding a `RefMut` across the guard's lifetime would make every
//! other `Orm` call through the guard's scope panic on a second borrow. These
//! guards instead re-enter the lock on every call and replicate the same
//! enter/restore behavior using `Timeline::set_forward`/`set_planning`/
//! `set_batch`, which are `pub` for exactly this reason.

use epochweave_foundation::Result;
use epochweave_plan::PlanId;
use epochweave_timeline::{BranchId, Tick, Turn};

use crate::orm::Orm;

/// Scopes forward (`advancing`) mode: while held, the cursor may only move
/// turn-then-tick forward, never branch or rewind (spec §4.2).
#[must_use = "the guard restores the previous mode when dropped"]
pub struct AdvancingGuard<'a> {
    orm: &'a Orm,
    previously: bool,
}

impl<'a> AdvancingGuard<'a> {
    pub(crate) fn enter(orm: &'a Orm) -> Self {
        let previously = orm.with_state(|state| {
            let was = state.timeline.is_forward();
            state.timeline.set_forward(true);
            was
        });
        Self { orm, previously }
    }
}

impl Drop for AdvancingGuard<'_> {
    fn drop(&mut self) {
        let previously = self.previously;
        self.orm.with_state(|state| state.timeline.set_forward(previously));
    }
}

/// Scopes planning mode: writes made while held are tentative, recorded
/// against a freshly minted plan rather than the branch's committed extent
/// (spec §4.5). `reset` mirrors `epochweave_timeline::guards::PlanningGuard`'s
/// `reset` flag: when true, the cursor is restored to wherever it was when
/// the guard was entered, bypassing forward-mode gates since this is a
/// restoration rather than an advance.
#[must_use = "the guard restores the previous mode (and plan) when dropped"]
pub struct PlanGuard<'a> {
    orm: &'a Orm,
    plan: PlanId,
    previously: bool,
    previous_plan: Option<PlanId>,
    reset_to: Option<(BranchId, Turn, Tick)>,
}

impl<'a> PlanGuard<'a> {
    pub(crate) fn enter(orm: &'a Orm, reset: bool) -> Self {
        let (plan, previously, previous_plan, reset_to) = orm.with_state(|state| {
            let reset_to = reset.then(|| {
                let time = state.timeline.time();
                (time.branch, time.turn, time.tick)
            });
            let previously = state.timeline.is_planning();
            let previous_plan = state.active_plan;
            let plan = state.new_plan();
            state.timeline.set_planning(true);
            state.active_plan = Some(plan);
            (plan, previously, previous_plan, reset_to)
        });
        Self {
            orm,
            plan,
            previously,
            previous_plan,
            reset_to,
        }
    }

    /// The plan this guard's writes are recorded against.
    #[must_use]
    pub fn plan_id(&self) -> PlanId {
        self.plan
    }

    /// Rolls back every write this guard's plan has made at or after
    /// `(turn, tick)` on the current branch, per spec §4.5 "Contradiction".
    pub fn contradict_from(&self, turn: Turn, tick: Tick) -> Result<()> {
        self.orm.contradict_plan_from(self.plan, turn, tick)
    }
}

impl Drop for PlanGuard<'_> {
    fn drop(&mut self) {
        let previously = self.previously;
        let previous_plan = self.previous_plan;
        let reset_to = self.reset_to.take();
        self.orm.with_state(|state| {
            state.timeline.set_planning(previously);
            state.active_plan = previous_plan;
            if let Some((branch, turn, tick)) = reset_to {
                let _ = state.timeline.set_branch(branch);
                state.timeline.force_time(turn, tick);
            }
        });
    }
}

/// Scopes batch mode: suppresses per-write keyframe/loader bookkeeping that
/// would otherwise happen eagerly, so a long run of writes can be flushed
/// once at the end instead (spec §4.2).
#[must_use = "the guard restores the previous mode when dropped"]
pub struct BatchGuard<'a> {
    orm: &'a Orm,
    previously: bool,
}

impl<'a> BatchGuard<'a> {
    pub(crate) fn enter(orm: &'a Orm) -> Self {
        let previously = orm.with_state(|state| {
            let was = state.timeline.is_batch();
            state.timeline.set_batch(true);
            was
        });
        Self { orm, previously }
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        let previously = self.previously;
        self.orm.with_state(|state| state.timeline.set_batch(previously));
    }
}
