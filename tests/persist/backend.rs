use epochweave_persist::{Backend, BranchRow, MemoryBackend, TurnRow};

#[test]
fn branch_extent_updates_are_visible_in_all_branches() {
    let mut be = MemoryBackend::new();
    be.new_branch(BranchRow {
        branch: "trunk".into(),
        parent: None,
        turn_start: 0,
        tick_start: 0,
        turn_end: 0,
        tick_end: 0,
    })
    .unwrap();

    be.set_branch_extent("trunk", 5, 2).unwrap();

    let row = be
        .all_branches()
        .unwrap()
        .into_iter()
        .find(|r| r.branch == "trunk")
        .unwrap();
    assert_eq!(row.turn_end, 5);
    assert_eq!(row.tick_end, 2);
}

#[test]
fn set_branch_extent_on_unknown_branch_errors() {
    let mut be = MemoryBackend::new();
    assert!(be.set_branch_extent("nope", 1, 1).is_err());
}

#[test]
fn turns_dump_is_sorted_and_scoped_to_one_branch() {
    let mut be = MemoryBackend::new();
    for (branch, turn) in [("trunk", 2), ("trunk", 0), ("trunk", 1), ("alt", 0)] {
        be.new_turn(TurnRow {
            branch: branch.into(),
            turn,
            end_tick: 0,
            plan_end_tick: 0,
        })
        .unwrap();
    }

    let rows = be.turns_dump("trunk").unwrap();
    assert_eq!(rows.iter().map(|r| r.turn).collect::<Vec<_>>(), vec![0, 1, 2]);
}

#[test]
fn set_turn_updates_its_own_row_only() {
    let mut be = MemoryBackend::new();
    be.new_turn(TurnRow {
        branch: "trunk".into(),
        turn: 0,
        end_tick: 0,
        plan_end_tick: 0,
    })
    .unwrap();
    be.set_turn("trunk", 0, 9, 12).unwrap();

    let row = be.turns_dump("trunk").unwrap().into_iter().next().unwrap();
    assert_eq!(row.end_tick, 9);
    assert_eq!(row.plan_end_tick, 12);
}

#[test]
fn commit_is_a_no_op_on_an_open_backend() {
    let mut be = MemoryBackend::new();
    assert!(be.commit().is_ok());
    assert!(be.commit().is_ok());
}
