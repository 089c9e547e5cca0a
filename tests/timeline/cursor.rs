//! Cross-cutting cursor/branch/guard scenarios not already covered by each
//! module's own unit tests.

use epochweave_timeline::guards::{ForwardGuard, PlanningGuard};
use epochweave_timeline::{BranchId, Timeline};

#[test]
fn each_branch_tracks_its_own_committed_extent() {
    let mut tl = Timeline::new();
    tl.nbtt().unwrap();
    tl.nbtt().unwrap();
    tl.set_branch(BranchId::from("alt")).unwrap();
    tl.nbtt().unwrap();

    let trunk_info = tl.branch_info(&BranchId::trunk()).unwrap();
    let alt_info = tl.branch_info(&BranchId::from("alt")).unwrap();
    assert_eq!(trunk_info.tick_end, 2);
    assert_eq!(alt_info.tick_end, 1);
}

#[test]
fn planning_mode_writes_do_not_advance_committed_extent() {
    let mut tl = Timeline::new();
    {
        let mut guard = PlanningGuard::enter(&mut tl, false);
        guard.timeline().nbtt().unwrap();
    }
    let info = tl.branch_info(&BranchId::trunk()).unwrap();
    // Planned extent moved, committed extent did not.
    assert_eq!(info.tick_end, 0);
    assert_eq!(info.turn_end_plan.get(&0), Some(&1));
}

#[test]
fn forward_guard_blocks_branch_switch_during_a_write_sequence() {
    let mut tl = Timeline::new();
    let mut guard = ForwardGuard::enter(&mut tl);
    let err = guard.timeline().set_branch(BranchId::from("alt"));
    assert!(err.is_err());
    drop(guard);
    assert!(tl.set_branch(BranchId::from("alt")).is_ok());
}

#[test]
fn nbtt_rejects_plan_frontier_collision() {
    let mut tl = Timeline::new();
    {
        let mut guard = PlanningGuard::enter(&mut tl, true);
        guard.timeline().set_tick(5).unwrap();
        guard.timeline().nbtt().unwrap();
    }
    // Planning pushed turn_end_plan for turn 0 to tick 6; a live write on
    // the same turn must mint a tick past that frontier, not reuse it.
    let out = tl.nbtt().unwrap();
    assert!(out.time_tick > 5);
}

#[test]
fn branching_twice_preserves_the_full_ancestry_chain() {
    let mut tl = Timeline::new();
    tl.set_turn(1).unwrap();
    tl.set_branch(BranchId::from("alt")).unwrap();
    tl.set_turn(2).unwrap();
    tl.set_branch(BranchId::from("alt2")).unwrap();

    let alt2 = tl.branch_info(&BranchId::from("alt2")).unwrap();
    assert_eq!(alt2.parent, Some(BranchId::from("alt")));
    let alt = tl.branch_info(&BranchId::from("alt")).unwrap();
    assert_eq!(alt.parent, Some(BranchId::trunk()));
}
