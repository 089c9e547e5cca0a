//! RAII scope guards for the cursor's mode flags (spec §4.2, §9 "Exceptions
//! for control flow... use scoped guards").
//!
//! Each guard flips a flag on construction and restores the prior value on
//! `Drop`, so an early return or unwinding panic inside the guarded scope
//! can never leave the timeline stuck in forward/planning/batch mode.

use crate::cursor::{Time, Timeline};

/// Enters forward mode: branch changes are forbidden and turn/tick may only
/// move forward, for as long as this guard is alive.
pub struct ForwardGuard<'a> {
    timeline: &'a mut Timeline,
    previously: bool,
}

impl<'a> ForwardGuard<'a> {
    /// Enters forward mode on `timeline`, remembering whether it was
    /// already active (nested `advancing()` calls are then a no-op on
    /// exit, matching re-entrant context-manager semantics).
    pub fn enter(timeline: &'a mut Timeline) -> Self {
        let previously = timeline.is_forward();
        timeline.set_forward(true);
        Self {
            timeline,
            previously,
        }
    }

    /// Borrows the guarded timeline.
    #[must_use]
    pub fn timeline(&mut self) -> &mut Timeline {
        self.timeline
    }
}

impl Drop for ForwardGuard<'_> {
    fn drop(&mut self) {
        self.timeline.set_forward(self.previously);
    }
}

/// Enters planning mode: writes made while this guard is alive are tagged
/// with a plan id by the caller (`epochweave_orm`, which owns the plan
/// manager); this guard itself only tracks the cursor mode flag and the
/// optional reset-on-exit cursor position.
pub struct PlanningGuard<'a> {
    timeline: &'a mut Timeline,
    previously: bool,
    reset_to: Option<Time>,
}

impl<'a> PlanningGuard<'a> {
    /// Enters planning mode. If `reset` is true, the cursor is restored to
    /// its entry position when the guard drops (spec §4.2 "on exit, cursor
    /// optionally resets to entry point").
    pub fn enter(timeline: &'a mut Timeline, reset: bool) -> Self {
        let previously = timeline.is_planning();
        let reset_to = reset.then(|| timeline.time());
        timeline.set_planning(true);
        Self {
            timeline,
            previously,
            reset_to,
        }
    }

    /// Borrows the guarded timeline.
    #[must_use]
    pub fn timeline(&mut self) -> &mut Timeline {
        self.timeline
    }
}

impl Drop for PlanningGuard<'_> {
    fn drop(&mut self) {
        self.timeline.set_planning(self.previously);
        if let Some(time) = self.reset_to.take() {
            // Planning mode is being torn down; these resets operate below
            // the forward-mode gate (we are restoring, not advancing), so
            // call the cursor fields directly rather than through
            // `set_branch`/`set_turn`/`set_tick`'s mode-sensitive checks.
            let _ = self.timeline.set_branch(time.branch.clone());
            self.timeline.force_time(time.turn, time.tick);
        }
    }
}

/// Enters batch mode: keyframe synthesis on load is disabled for as long as
/// this guard is alive, trading read latency for write/load throughput.
pub struct BatchGuard<'a> {
    timeline: &'a mut Timeline,
    previously: bool,
}

impl<'a> BatchGuard<'a> {
    /// Enters batch mode.
    pub fn enter(timeline: &'a mut Timeline) -> Self {
        let previously = timeline.is_batch();
        timeline.set_batch(true);
        Self {
            timeline,
            previously,
        }
    }

    /// Borrows the guarded timeline.
    #[must_use]
    pub fn timeline(&mut self) -> &mut Timeline {
        self.timeline
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.timeline.set_batch(self.previously);
    }
}
