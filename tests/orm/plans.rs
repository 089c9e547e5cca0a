use epochweave_foundation::Value;
use epochweave_orm::Orm;
use epochweave_storage::GraphKind;

fn v(s: &str) -> Value {
    Value::from(s)
}

#[test]
fn plan_guard_writes_do_not_advance_the_committed_branch_extent() {
    let orm = Orm::default();
    orm.new_graph(v("physical"), GraphKind::Directed).unwrap();
    let g = orm.graph(v("physical"));

    {
        let guard = orm.plan(false);
        g.add_node(v("A")).unwrap();
        drop(guard);
    }

    assert!(g.exists_node(&v("A")).unwrap());
}

#[test]
fn plan_guard_reset_restores_the_cursor_on_drop() {
    let orm = Orm::default();
    orm.set_turn(4).unwrap();

    {
        let guard = orm.plan(true);
        drop(guard);
    }

    assert_eq!(orm.turn(), 4);
}

#[test]
fn contradict_from_rolls_back_a_plans_write() {
    let orm = Orm::default();
    orm.new_graph(v("physical"), GraphKind::Directed).unwrap();
    let g = orm.graph(v("physical"));

    let guard = orm.plan(false);
    g.add_node(v("A")).unwrap();
    let (turn, tick) = (orm.turn(), orm.tick());
    guard.contradict_from(turn, tick).unwrap();

    assert!(!g.exists_node(&v("A")).unwrap());
}

#[test]
fn nested_plan_guards_restore_the_outer_plan_on_inner_drop() {
    let orm = Orm::default();
    let outer = orm.plan(false);
    let outer_plan = outer.plan_id();
    {
        let inner = orm.plan(false);
        assert_ne!(inner.plan_id(), outer_plan);
    }
    assert_eq!(outer.plan_id(), outer_plan);
}
