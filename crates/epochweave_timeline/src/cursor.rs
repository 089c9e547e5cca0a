//! The time cursor and branch tree: spec §3's `Timeline` and §4.1/§4.2's
//! `_nbtt`/`TimeSignalDescriptor` state machine.

use std::collections::HashMap;

use epochweave_foundation::{Error, Result, Time as ErrTime};

use crate::branch::{BranchId, BranchInfo, TRUNK};
use crate::window::{Tick, Turn};

/// A `(branch, turn, tick)` position. Cheap to clone; carried around freely.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Time {
    /// The branch this time is on.
    pub branch: BranchId,
    /// The turn.
    pub turn: Turn,
    /// The tick within the turn.
    pub tick: Tick,
}

impl Time {
    /// Builds a `(branch, turn, tick)` triple.
    #[must_use]
    pub fn new(branch: BranchId, turn: Turn, tick: Tick) -> Self {
        Self { branch, turn, tick }
    }

    /// Converts to the branch-agnostic error-reporting `Time` type that
    /// `epochweave_foundation` error variants carry (so error types don't
    /// need to depend on this crate).
    #[must_use]
    pub fn to_error_time(&self) -> ErrTime {
        ErrTime::new(self.branch.as_str(), self.turn, self.tick)
    }
}

/// What to do with pending bookkeeping once a write has been journalled at
/// the time `nbtt` just minted. The timeline crate does not know about plans
/// or the loaded-interval tracker, so it reports just enough for
/// `epochweave_plan`/`epochweave_loader` (driven from `epochweave_orm`) to do
/// their part (spec §4.1 steps 4 and 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NbttOutcome {
    /// The newly minted write time.
    pub time_turn: Turn,
    /// ... and its tick.
    pub time_tick: Tick,
    /// Whether planning mode is currently active (the caller should record
    /// this `(turn, tick)` into the active plan).
    pub planning: bool,
}

/// Process-wide cursor plus branch tree. Owns every `BranchInfo` and the
/// mode flags (`forward`, `planning`, `batch`) spec §4.2 describes. Nothing
/// here is global state: an `Orm` instance owns exactly one `Timeline`.
#[derive(Debug, Clone)]
pub struct Timeline {
    branches: HashMap<BranchId, BranchInfo>,
    branch: BranchId,
    turn: Turn,
    tick: Tick,
    forward: bool,
    planning: bool,
    batch: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Creates a fresh timeline with only the root branch (`trunk`),
    /// cursor at `(trunk, 0, 0)`.
    #[must_use]
    pub fn new() -> Self {
        let mut branches = HashMap::new();
        branches.insert(BranchId::trunk(), BranchInfo::root());
        Self {
            branches,
            branch: BranchId::trunk(),
            turn: 0,
            tick: 0,
            forward: false,
            planning: false,
            batch: false,
        }
    }

    /// The current cursor position.
    #[must_use]
    pub fn time(&self) -> Time {
        Time::new(self.branch.clone(), self.turn, self.tick)
    }

    /// Current branch.
    #[must_use]
    pub fn branch(&self) -> &BranchId {
        &self.branch
    }

    /// Current turn.
    #[must_use]
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Current tick.
    #[must_use]
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Whether forward mode (`advancing()`) is active.
    #[must_use]
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Whether planning mode (`plan()`) is active.
    #[must_use]
    pub fn is_planning(&self) -> bool {
        self.planning
    }

    /// Whether batch mode is active.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// Looks up a branch's bookkeeping record.
    pub fn branch_info(&self, branch: &BranchId) -> Result<&BranchInfo> {
        self.branches
            .get(branch)
            .ok_or_else(|| Error::key_not_found(format!("no such branch: {branch}")))
    }

    /// Returns true if `branch` has ever been created.
    #[must_use]
    pub fn has_branch(&self, branch: &BranchId) -> bool {
        self.branches.contains_key(branch)
    }

    /// Iterates every known branch name alongside its bookkeeping record.
    pub fn iter_branches(&self) -> impl Iterator<Item = (&BranchId, &BranchInfo)> {
        self.branches.iter()
    }

    /// Directly flips forward mode. `pub` (not `pub(crate)`) so a caller
    /// that cannot hold a borrowed [`crate::guards::ForwardGuard`] across a
    /// re-entrant lock boundary (`epochweave_orm`'s world lock wraps this
    /// timeline behind a `RefCell`, which forbids storing a second mutable
    /// borrow alongside it) can still replicate the guard's enter/restore
    /// behavior itself.
    pub fn set_forward(&mut self, value: bool) {
        self.forward = value;
    }

    /// Directly flips planning mode; see [`Timeline::set_forward`] for why
    /// this is public.
    pub fn set_planning(&mut self, value: bool) {
        self.planning = value;
    }

    /// Directly flips batch mode; see [`Timeline::set_forward`] for why this
    /// is public.
    pub fn set_batch(&mut self, value: bool) {
        self.batch = value;
    }

    /// Advances the cursor's tick per spec §4.1 `_nbtt`: the sole entry
    /// point every write goes through before journalling.
    ///
    /// Implements rules 1 (tick bump against the plan frontier), 2/3
    /// (historical-write / out-of-timeline rejection), and 5 (extend the
    /// branch's committed or planned extent). Rules 4 (plan-tick duplicate
    /// check) and 6 (loaded-interval bracket nudge) are the caller's
    /// responsibility — `epochweave_orm` drives both `epochweave_plan` and
    /// `epochweave_loader` using the [`NbttOutcome`] this returns.
    pub fn nbtt(&mut self) -> Result<NbttOutcome> {
        let branch = self.branch.clone();
        let turn = self.turn;

        let info = self.branch_info(&branch)?;
        let plan_frontier = info.turn_end_plan.get(&turn).copied();
        let tick_prime = match plan_frontier {
            Some(t) => (self.tick + 1).max(t + 1),
            None => self.tick + 1,
        };

        if turn < info.turn_end {
            return Err(Error::out_of_timeline(
                Time::new(branch.clone(), turn, self.tick).to_error_time(),
                Time::new(branch, turn, tick_prime).to_error_time(),
            ));
        }
        if turn == info.turn_end && info.tick_end > tick_prime {
            return Err(Error::historical_write(
                Time::new(branch.clone(), turn, tick_prime).to_error_time(),
                Time::new(branch, info.turn_end, info.tick_end).to_error_time(),
            ));
        }

        let info = self
            .branches
            .get_mut(&branch)
            .expect("branch existence already checked above");
        info.turn_end_plan.insert(turn, tick_prime);
        info.branch_end_plan = info.branch_end_plan.max(turn);
        if !self.planning {
            info.turn_end = turn;
            info.tick_end = tick_prime;
        }

        self.tick = tick_prime;

        Ok(NbttOutcome {
            time_turn: turn,
            time_tick: tick_prime,
            planning: self.planning,
        })
    }

    /// Sets the current branch, implementing spec §4.2's branch-switch
    /// rules: forward mode forbids it outright; otherwise the branch is
    /// created on first use (forked from the current branch at the current
    /// cursor) or simply switched to if it already exists.
    ///
    /// Returns the `(turn, tick)` the new branch starts at when the branch
    /// is freshly created, so the caller can copy active plans and load the
    /// starting interval (spec §4.2's "copy all plans active at the switch
    /// point... and load the range").
    pub fn set_branch(&mut self, new_branch: BranchId) -> Result<Option<(Turn, Tick)>> {
        if new_branch == self.branch {
            return Ok(None);
        }
        if self.forward {
            return Err(Error::time_error(format!(
                "cannot change branch from {} to {new_branch} while advancing",
                self.branch
            )));
        }

        if let Some(existing) = self.branches.get(&new_branch) {
            // Switching to an already-known branch: no parent-time check is
            // needed (it was validated when the branch was created), we
            // simply move the cursor to its current extent... but spec
            // §4.2 says "load if not already loaded", which implies the
            // cursor moves to wherever the caller explicitly sets turn/tick
            // next. We leave turn/tick untouched here and let the caller
            // (the `branch()` setter at the ORM layer) decide whether to
            // reposition; the important invariant enforced here is parent-
            // time ordering, already satisfied since the branch exists.
            let _ = existing;
            self.branch = new_branch;
            return Ok(None);
        }

        let parent = self.branch.clone();
        let (turn_start, tick_start) = (self.turn, self.tick);
        let info = BranchInfo::forked_from(parent, turn_start, tick_start);
        self.branches.insert(new_branch.clone(), info);
        self.branch = new_branch;
        Ok(Some((turn_start, tick_start)))
    }

    /// Sets the current turn, implementing forward-mode's "turn may only
    /// increase by 0 or 1" rule (spec §4.2) when active.
    pub fn set_turn(&mut self, turn: Turn) -> Result<()> {
        if self.forward && (turn < self.turn || turn > self.turn + 1) {
            return Err(Error::time_error(format!(
                "forward mode: cannot move turn from {} to {turn}",
                self.turn
            )));
        }
        if turn != self.turn {
            self.turn = turn;
            self.tick = 0;
        }
        let info = self.branches.get_mut(&self.branch).expect("current branch always exists");
        info.turn_end = info.turn_end.max(turn);
        Ok(())
    }

    /// Sets the current tick within the current turn, implementing forward
    /// mode's "tick may only increase" rule.
    pub fn set_tick(&mut self, tick: Tick) -> Result<()> {
        if self.forward && tick < self.tick {
            return Err(Error::time_error(format!(
                "forward mode: cannot move tick from {} to {tick}",
                self.tick
            )));
        }
        self.tick = tick;
        Ok(())
    }

    /// Directly sets turn and tick without any forward-mode checks. Used by
    /// [`crate::guards::PlanningGuard`] to restore the cursor to its entry
    /// point on exit, which is a restoration, not an advance, and so must
    /// bypass the forward-mode gate that an ordinary `set_turn`/`set_tick`
    /// call would apply.
    pub fn force_time(&mut self, turn: Turn, tick: Tick) {
        self.turn = turn;
        self.tick = tick;
    }

    /// A restartable, finite lazy sequence of `(branch, turn, tick)` splice
    /// points walking up the parent chain from `from`, stopping at `stop`
    /// (or the root if `stop` is `None`). This is the Rust shape of
    /// `_iter_parent_btt`: both the delta engine's cross-branch composition
    /// note and the loader's window-splitting rely on it, and both re-walk
    /// it repeatedly, so it must not consume any shared state.
    #[must_use]
    pub fn iter_parent_btt(&self, from: Time, stop: Option<Time>) -> ParentBttIter<'_> {
        ParentBttIter {
            timeline: self,
            current: Some(from),
            stop,
        }
    }
}

/// Iterator returned by [`Timeline::iter_parent_btt`].
pub struct ParentBttIter<'a> {
    timeline: &'a Timeline,
    current: Option<Time>,
    stop: Option<Time>,
}

impl Iterator for ParentBttIter<'_> {
    type Item = Time;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current.take()?;
        if let Some(stop) = &self.stop {
            if &current == stop {
                return None;
            }
        }

        let info = self.timeline.branches.get(&current.branch)?;
        let yielded = current.clone();

        self.current = info.parent.clone().map(|parent| {
            Time::new(parent, info.turn_start, info.tick_start)
        });

        Some(yielded)
    }
}
