//! Plan manager (spec §4.5): tentative future writes grouped into plans,
//! contradiction handling, and plan copy across branch forks.

use std::collections::BTreeMap;

use epochweave_foundation::{Error, PMap, PSet, Result};
use epochweave_timeline::{BranchId, Tick, Time, Turn};

/// Identifies one plan. Strictly increasing as plans are minted (spec §3
/// "Plans are integer-identified, strictly increasing").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanId(u64);

impl PlanId {
    /// The raw integer id, for callers that need to persist or log it.
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// The result of [`PlanManager::fork`] for one plan that had entries at or
/// after the fork point: the originating plan, the freshly minted plan in
/// the child branch, and the times that must be replayed there with the
/// same values the original plan held.
#[derive(Debug, Clone)]
pub struct ForkedPlan {
    /// The plan in the parent branch this was copied from.
    pub old_plan: PlanId,
    /// The freshly minted plan in the child branch.
    pub new_plan: PlanId,
    /// The `(child_branch, turn, tick)` times to replay, in ascending order.
    pub times: Vec<Time>,
}

/// Per-branch plan sets, per-plan creation points and tick journals, and the
/// reverse time -> plan index, implementing spec §4.5 in full.
#[derive(Debug, Clone, Default)]
pub struct PlanManager {
    next_id: u64,
    branches_plans: PMap<BranchId, PSet<PlanId>>,
    plans: PMap<PlanId, Time>,
    plan_ticks: PMap<PlanId, BTreeMapTicks>,
    time_plan: PMap<Time, PlanId>,
}

/// `Turn -> Vec<Tick>`, wrapped so it can live inside a `PMap` value slot.
pub type BTreeMapTicks = BTreeMap<Turn, Vec<Tick>>;

impl PlanManager {
    /// Creates an empty plan manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh plan id starting at `origin`, registering it under the
    /// origin branch's plan set.
    pub fn new_plan(&mut self, origin: Time) -> PlanId {
        let id = PlanId(self.next_id);
        self.next_id += 1;
        self.plans = self.plans.insert(id, origin.clone());
        self.plan_ticks = self.plan_ticks.insert(id, BTreeMap::new());
        let existing = self
            .branches_plans
            .get(&origin.branch)
            .cloned()
            .unwrap_or_default();
        self.branches_plans = self
            .branches_plans
            .insert(origin.branch, existing.insert(id));
        id
    }

    /// Records that `plan` wrote at `time`. Rejects a duplicate write at the
    /// same time (spec §4.1 rule 4: "fail with `OutOfTimeline` if
    /// `(turn,tick')` already appears in the current plan").
    pub fn record_write(&mut self, plan: PlanId, time: &Time) -> Result<()> {
        if self.time_plan.contains_key(time) {
            return Err(Error::out_of_timeline(
                time.to_error_time(),
                time.to_error_time(),
            ));
        }
        let mut ticks = self.plan_ticks.get(&plan).cloned().unwrap_or_default();
        ticks.entry(time.turn).or_default().push(time.tick);
        self.plan_ticks = self.plan_ticks.insert(plan, ticks);
        self.time_plan = self.time_plan.insert(time.clone(), plan);
        Ok(())
    }

    /// Looks up which plan, if any, wrote at `time`.
    #[must_use]
    pub fn plan_at(&self, time: &Time) -> Option<PlanId> {
        self.time_plan.get(time).copied()
    }

    /// The plan ids active on `branch`.
    #[must_use]
    pub fn plans_on_branch(&self, branch: &BranchId) -> Vec<PlanId> {
        self.branches_plans
            .get(branch)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// For every plan on `branch` with at least one recorded write at or
    /// after `from`, the earliest such write. Drives the automatic
    /// contradiction spec §3/§4.5 require of a non-planning write: "a
    /// non-planning write at or after a planned point invalidates that plan
    /// from that point forward".
    #[must_use]
    pub fn plans_at_or_after(&self, branch: &BranchId, from: (Turn, Tick)) -> Vec<(PlanId, (Turn, Tick))> {
        let mut hits = Vec::new();
        for plan in self.plans_on_branch(branch) {
            let Some(ticks) = self.plan_ticks.get(&plan) else {
                continue;
            };
            let earliest = ticks.range(from.0..).find_map(|(&turn, list)| {
                let mut candidates: Vec<Tick> = if turn == from.0 {
                    list.iter().copied().filter(|&tick| tick >= from.1).collect()
                } else {
                    list.clone()
                };
                candidates.sort_unstable();
                candidates.first().map(|&tick| (turn, tick))
            });
            if let Some(time) = earliest {
                hits.push((plan, time));
            }
        }
        hits
    }

    /// Strips every entry of `plan` at or after `from`, returning the
    /// removed times so the caller can scrub them from `where_cached` and
    /// the affected caches (spec §4.5 "Contradiction": "Earlier portions of
    /// the plan survive").
    pub fn invalidate_from(&mut self, plan: PlanId, branch: &BranchId, from: (Turn, Tick)) -> Vec<Time> {
        let Some(mut ticks) = self.plan_ticks.get(&plan).cloned() else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        let turns_at_or_after: Vec<Turn> = ticks.range(from.0..).map(|(t, _)| *t).collect();
        for turn in turns_at_or_after {
            let list = ticks.get_mut(&turn).expect("turn came from this map's own keys");
            let (keep, drop): (Vec<Tick>, Vec<Tick>) = if turn == from.0 {
                list.iter().partition(|&&tick| tick < from.1)
            } else {
                (Vec::new(), std::mem::take(list))
            };
            *list = keep;
            for tick in drop {
                let time = Time::new(branch.clone(), turn, tick);
                self.time_plan = self.time_plan.remove(&time);
                removed.push(time);
            }
            if list.is_empty() {
                ticks.remove(&turn);
            }
        }

        if ticks.is_empty() {
            self.plan_ticks = self.plan_ticks.remove(&plan);
            self.plans = self.plans.remove(&plan);
            if let Some(set) = self.branches_plans.get(branch) {
                self.branches_plans = self
                    .branches_plans
                    .insert(branch.clone(), set.remove(&plan));
            }
        } else {
            self.plan_ticks = self.plan_ticks.insert(plan, ticks);
        }

        removed
    }

    /// Copies every plan on `parent` whose origin is at or before `at`
    /// into `child`, re-issuing the entries at or after `at` under fresh
    /// plan ids (spec §4.5 "Plan copy across branches").
    pub fn fork(&mut self, parent: &BranchId, at: &Time, child: BranchId) -> Vec<ForkedPlan> {
        let mut result = Vec::new();
        for old_plan in self.plans_on_branch(parent) {
            let origin = self.plans.get(&old_plan).cloned().expect("plan id came from branches_plans");
            if (origin.turn, origin.tick) > (at.turn, at.tick) {
                continue;
            }

            let Some(ticks) = self.plan_ticks.get(&old_plan) else {
                continue;
            };
            let mut copy_times: Vec<(Turn, Tick)> = Vec::new();
            for (&turn, list) in ticks.range(at.turn..) {
                for &tick in list {
                    if (turn, tick) >= (at.turn, at.tick) {
                        copy_times.push((turn, tick));
                    }
                }
            }
            if copy_times.is_empty() {
                continue;
            }
            copy_times.sort_unstable();

            let new_plan = self.new_plan(Time::new(child.clone(), at.turn, at.tick));
            let mut times = Vec::with_capacity(copy_times.len());
            for (turn, tick) in copy_times {
                let time = Time::new(child.clone(), turn, tick);
                self.record_write(new_plan, &time)
                    .expect("freshly minted plan cannot already hold this time");
                times.push(time);
            }

            result.push(ForkedPlan {
                old_plan,
                new_plan,
                times,
            });
        }
        result
    }
}
