use epochweave_orm::Orm;
use epochweave_timeline::BranchId;

#[test]
fn set_turn_then_set_tick_moves_the_reported_cursor() {
    let orm = Orm::default();
    orm.set_turn(3).unwrap();
    orm.set_tick(2).unwrap();
    assert_eq!(orm.turn(), 3);
    assert_eq!(orm.tick(), 2);
    assert_eq!(orm.time(), (BranchId::trunk(), 3));
}

#[test]
fn set_branch_forks_off_the_current_position() {
    let orm = Orm::default();
    orm.set_turn(2).unwrap();
    orm.set_branch(BranchId::from("alt")).unwrap();
    assert_eq!(orm.branch(), BranchId::from("alt"));
}

#[test]
fn advancing_mode_rejects_a_branch_switch() {
    let orm = Orm::default();
    let _guard = orm.advancing();
    assert!(orm.set_branch(BranchId::from("alt")).is_err());
}

#[test]
fn advancing_mode_restores_on_drop() {
    let orm = Orm::default();
    {
        let _guard = orm.advancing();
        assert!(orm.set_branch(BranchId::from("alt")).is_err());
    }
    assert!(orm.set_branch(BranchId::from("alt")).is_ok());
}

#[test]
fn on_time_change_fires_once_per_cursor_move() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let orm = Orm::default();
    let count = Arc::new(AtomicUsize::new(0));
    let count_in_closure = count.clone();
    orm.on_time_change(move |_| {
        count_in_closure.fetch_add(1, Ordering::SeqCst);
    });

    orm.set_turn(1).unwrap();
    orm.set_turn(2).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn listener_reentering_the_orm_does_not_panic() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let orm = Arc::new(Orm::default());
    let fired = Arc::new(AtomicBool::new(false));
    let orm_in_closure = orm.clone();
    let fired_in_closure = fired.clone();
    orm.on_time_change(move |_| {
        // Re-entering a read through the world lock from inside a listener
        // must not deadlock or panic against the `RefCell` borrow.
        let _ = orm_in_closure.turn();
        fired_in_closure.store(true, Ordering::SeqCst);
    });

    orm.set_turn(1).unwrap();
    assert!(fired.load(Ordering::SeqCst));
}
