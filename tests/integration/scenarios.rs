use epochweave_foundation::Value;
use epochweave_orm::Orm;
use epochweave_storage::{GraphKind, GraphState};
use epochweave_timeline::BranchId;

fn v(s: &str) -> Value {
    Value::from(s)
}

fn new_physical(orm: &Orm) {
    orm.new_graph(v("physical"), GraphKind::Directed).unwrap();
}

#[test]
fn simple_time_travel() {
    let orm = Orm::default();
    new_physical(&orm);
    let g = orm.graph(v("physical"));

    g.add_node(v("A")).unwrap();
    assert!(g.exists_node(&v("A")).unwrap());
    assert!(!g.exists_node(&v("B")).unwrap());

    orm.set_turn(1).unwrap();
    g.add_node(v("B")).unwrap();
    assert!(g.exists_node(&v("A")).unwrap());
    assert!(g.exists_node(&v("B")).unwrap());

    orm.set_turn(0).unwrap();
    orm.set_tick(0).unwrap();
    assert!(g.exists_node(&v("A")).unwrap());
    assert!(!g.exists_node(&v("B")).unwrap());
}

#[test]
fn plan_then_contradict_rolls_back_future_plan_writes() {
    let orm = Orm::default();
    new_physical(&orm);
    let g = orm.graph(v("physical"));
    let attrs = g.attrs();
    orm.set_turn(1).unwrap();

    {
        let _guard = orm.plan(true);
        orm.set_turn(2).unwrap();
        attrs.write(v("x"), Value::Bool(false)).unwrap();
        orm.set_turn(3).unwrap();
        attrs.write(v("x"), Value::Bool(true)).unwrap();
        orm.set_turn(4).unwrap();
        attrs.write(v("x"), Value::Bool(false)).unwrap();
    }

    assert_eq!(orm.turn(), 1);

    orm.set_turn(2).unwrap();
    assert_eq!(attrs.read(&v("x")).unwrap(), Value::Bool(false));
    orm.set_turn(3).unwrap();
    assert_eq!(attrs.read(&v("x")).unwrap(), Value::Bool(true));

    // A non-planning write at turn 2 automatically contradicts the plan
    // from turn 3 onward (spec §3, §4.5): no explicit invalidation call
    // needed here.
    orm.set_turn(2).unwrap();
    attrs.write(v("x"), Value::Bool(true)).unwrap();

    orm.set_turn(3).unwrap();
    assert_eq!(attrs.read(&v("x")).unwrap(), Value::Bool(true));
    orm.set_turn(4).unwrap();
    assert_eq!(attrs.read(&v("x")).unwrap(), Value::Bool(true));
}

#[test]
fn branching_isolates_writes_from_the_parent_branch() {
    let orm = Orm::default();
    new_physical(&orm);
    let g = orm.graph(v("physical"));
    let attrs = g.attrs();

    orm.set_turn(1).unwrap();
    attrs.write(v("y"), Value::Int(1)).unwrap();

    orm.set_turn(2).unwrap();
    orm.set_branch(BranchId::from("alt")).unwrap();
    orm.set_turn(3).unwrap();
    attrs.write(v("y"), Value::Int(2)).unwrap();

    orm.set_branch(BranchId::trunk()).unwrap();
    orm.set_turn(3).unwrap();
    assert_eq!(attrs.read(&v("y")).unwrap(), Value::Int(1));

    orm.set_branch(BranchId::from("alt")).unwrap();
    orm.set_turn(3).unwrap();
    assert_eq!(attrs.read(&v("y")).unwrap(), Value::Int(2));

    orm.set_turn(1).unwrap();
    assert_eq!(attrs.read(&v("y")).unwrap(), Value::Int(1));
}

#[test]
fn delta_applied_to_the_genesis_keyframe_matches_a_live_snap_keyframe() {
    let orm = Orm::default();
    new_physical(&orm);
    let g = orm.graph(v("physical"));

    g.add_node(v("A")).unwrap();
    orm.set_turn(1).unwrap();
    g.node(v("A")).write(v("color"), v("red")).unwrap();
    orm.set_turn(2).unwrap();
    g.add_node(v("B")).unwrap();
    orm.set_turn(3).unwrap();
    g.add_edge(v("A"), v("B"), 0).unwrap();

    let delta = orm
        .get_delta(&v("physical"), &BranchId::trunk(), (0, 0), (3, 0))
        .unwrap();

    let expected = delta.apply(&GraphState::new());
    assert!(expected.has_node(&v("A")));
    assert!(expected.has_node(&v("B")));
    assert_eq!(expected.node_val(&v("A"), &v("color")), Some(&v("red")));
    assert!(expected.has_edge(&v("A"), &v("B"), 0));
}

#[test]
fn loading_an_old_turn_after_many_advances_still_recovers_its_answer() {
    let orm = Orm::default();
    new_physical(&orm);
    let g = orm.graph(v("physical"));

    g.add_node(v("A")).unwrap();
    for turn in 1..20u64 {
        orm.set_turn(turn).unwrap();
        g.node(v("A")).write(v("turn"), Value::Int(turn as i64)).unwrap();
    }

    orm.snap_keyframe().unwrap();

    orm.set_turn(5).unwrap();
    assert_eq!(g.node(v("A")).read(&v("turn")).unwrap(), Value::Int(5));

    orm.set_turn(19).unwrap();
    assert_eq!(g.node(v("A")).read(&v("turn")).unwrap(), Value::Int(19));
}

#[test]
fn forward_mode_enforces_monotonic_turn_and_forbids_branch_switch() {
    let orm = Orm::default();
    let _guard = orm.advancing();

    assert!(orm.set_turn(orm.turn() + 1).is_ok());
    assert!(orm.set_turn(orm.turn() + 2).is_err());
    assert!(orm.set_turn(0).is_err());
    assert!(orm.set_branch(BranchId::from("alt")).is_err());
}
