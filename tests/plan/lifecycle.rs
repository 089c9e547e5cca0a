use epochweave_plan::PlanManager;
use epochweave_timeline::{BranchId, Tick, Time, Turn};

fn t(branch: &str, turn: Turn, tick: Tick) -> Time {
    Time::new(BranchId::from(branch), turn, tick)
}

#[test]
fn invalidated_time_can_be_rewritten_by_a_later_plan() {
    let mut plans = PlanManager::new();
    let p1 = plans.new_plan(t("trunk", 0, 0));
    plans.record_write(p1, &t("trunk", 5, 1)).unwrap();

    plans.invalidate_from(p1, &BranchId::from("trunk"), (5, 1));

    let p2 = plans.new_plan(t("trunk", 0, 0));
    assert!(plans.record_write(p2, &t("trunk", 5, 1)).is_ok());
    assert_eq!(plans.plan_at(&t("trunk", 5, 1)), Some(p2));
}

#[test]
fn forking_twice_carries_plan_bookkeeping_down_the_chain() {
    let mut plans = PlanManager::new();
    let p1 = plans.new_plan(t("trunk", 0, 0));
    plans.record_write(p1, &t("trunk", 1, 1)).unwrap();
    plans.record_write(p1, &t("trunk", 2, 1)).unwrap();

    let forked1 = plans.fork(&BranchId::from("trunk"), &t("trunk", 1, 0), BranchId::from("alt"));
    assert_eq!(forked1.len(), 1);
    let alt_plan = forked1[0].new_plan;

    let forked2 = plans.fork(&BranchId::from("alt"), &t("alt", 2, 0), BranchId::from("alt2"));
    assert_eq!(forked2.len(), 1);
    assert_ne!(forked2[0].new_plan, alt_plan);

    assert!(plans.plans_on_branch(&BranchId::from("alt2")).contains(&forked2[0].new_plan));
}

#[test]
fn plans_on_branch_reflects_every_active_plan() {
    let mut plans = PlanManager::new();
    let p1 = plans.new_plan(t("trunk", 0, 0));
    let p2 = plans.new_plan(t("trunk", 0, 0));
    plans.record_write(p1, &t("trunk", 1, 1)).unwrap();
    plans.record_write(p2, &t("trunk", 1, 2)).unwrap();

    let on_trunk = plans.plans_on_branch(&BranchId::trunk());
    assert!(on_trunk.contains(&p1));
    assert!(on_trunk.contains(&p2));
}
