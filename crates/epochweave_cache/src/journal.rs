//! `EntityJournal`: the per-entity-family forward (`settings`) and backward
//! (`presettings`) change journal spec §4.3 describes, one instantiated per
//! graph per entity family (`graph_val`, `nodes`, `node_val`, `edges`,
//! `edge_val`).
//!
//! Each tick's entry is a small batch (`Vec<(K, V)>`) rather than a single
//! pair: a live write always touches exactly one key at its freshly minted
//! tick, but the loader (spec §4.7) feeds rows in from persistence in
//! batches that may legitimately share a tick, so the journal has to hold
//! more than one entry per `(turn, tick)`.

use epochweave_foundation::PMap;
use epochweave_timeline::{BranchId, Tick, Turn, WindowDict};

/// Forward and backward change journals for one entity family of one graph.
///
/// `settings` records the new value of each write; `presettings` records the
/// value that was overwritten (or `None` if the key had never been written
/// before), which is what lets the delta engine walk backward without
/// replaying the whole forward journal first.
#[derive(Debug, Clone)]
pub struct EntityJournal<K, V> {
    settings: PMap<BranchId, WindowDict<Vec<(K, V)>>>,
    presettings: PMap<BranchId, WindowDict<Vec<(K, Option<V>)>>>,
}

impl<K, V> Default for EntityJournal<K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EntityJournal<K, V>
where
    K: Clone + PartialEq,
    V: Clone,
{
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: PMap::new(),
            presettings: PMap::new(),
        }
    }

    /// Records a write: `key` took on `new_value` at `(turn, tick)` on
    /// `branch`, having previously held `old_value` (`None` if it had never
    /// been written on this branch before).
    pub fn record(
        &mut self,
        branch: &BranchId,
        turn: Turn,
        tick: Tick,
        key: K,
        new_value: V,
        old_value: Option<V>,
    ) {
        let mut fwd = self.settings.get(branch).cloned().unwrap_or_default();
        let mut batch = fwd.get_exact(turn, tick).cloned().unwrap_or_default();
        batch.push((key.clone(), new_value));
        fwd.set(turn, tick, batch);
        self.settings = self.settings.insert(branch.clone(), fwd);

        let mut bwd = self.presettings.get(branch).cloned().unwrap_or_default();
        let mut pbatch = bwd.get_exact(turn, tick).cloned().unwrap_or_default();
        pbatch.push((key, old_value));
        bwd.set(turn, tick, pbatch);
        self.presettings = self.presettings.insert(branch.clone(), bwd);
    }

    /// The most recent write of `key` on `branch` at or before `(turn,
    /// tick)`, scanning this branch's own journal only (never the parent
    /// chain — that composition is the caller's job, per spec §4.6's note
    /// that cross-branch delta composition isn't built into the engine
    /// itself).
    #[must_use]
    pub fn latest_write(&self, branch: &BranchId, turn: Turn, tick: Tick, key: &K) -> Option<V> {
        let journal = self.settings.get(branch)?;
        journal.find_backward(turn, tick, |batch| {
            batch
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        })
    }

    /// Iterates every `(key, value)` change recorded on `branch` in the
    /// half-open forward window `(from, to]`, in chronological order. Used
    /// by the delta engine's forward projection.
    pub fn iter_forward(
        &self,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> impl Iterator<Item = (K, V)> + '_ {
        self.settings
            .get(branch)
            .into_iter()
            .flat_map(move |journal| journal.iter_window(from, to))
            .flat_map(|(_, batch)| batch.iter().cloned())
    }

    /// Iterates every `(key, previous_value)` change recorded on `branch` in
    /// the half-open backward window `(to, from]`, most recent first. Used
    /// by the delta engine's backward projection.
    pub fn iter_backward(
        &self,
        branch: &BranchId,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> impl Iterator<Item = (K, Option<V>)> + '_ {
        self.presettings
            .get(branch)
            .into_iter()
            .flat_map(move |journal| journal.iter_window_backward(from, to))
            .flat_map(|(_, batch)| batch.iter().cloned())
    }

    /// Removes every recorded entry of `key` on `branch` at or after
    /// `from`, from both journals. Used to scrub a contradicted plan's tail
    /// (spec §4.5); the plan manager already knows exactly which `(turn,
    /// tick)` pairs to strip, so this is driven one time at a time rather
    /// than through a separate `where_cached` reverse index.
    pub fn invalidate_from(&mut self, branch: &BranchId, key: &K, from: (Turn, Tick)) {
        if let Some(mut journal) = self.settings.get(branch).cloned() {
            Self::strip_key(&mut journal, key, from);
            self.settings = self.settings.insert(branch.clone(), journal);
        }
        if let Some(mut journal) = self.presettings.get(branch).cloned() {
            Self::strip_key_opt(&mut journal, key, from);
            self.presettings = self.presettings.insert(branch.clone(), journal);
        }
    }

    fn strip_key(journal: &mut WindowDict<Vec<(K, V)>>, key: &K, from: (Turn, Tick)) {
        let hits: Vec<(Turn, Tick)> = journal
            .iter_up_to((Turn::MAX, Tick::MAX))
            .filter(|(k, _)| *k >= from)
            .map(|(k, _)| k)
            .collect();
        for (turn, tick) in hits {
            if let Some(mut batch) = journal.remove_exact(turn, tick) {
                batch.retain(|(k, _)| k != key);
                if !batch.is_empty() {
                    journal.set(turn, tick, batch);
                }
            }
        }
    }

    fn strip_key_opt(journal: &mut WindowDict<Vec<(K, Option<V>)>>, key: &K, from: (Turn, Tick)) {
        let hits: Vec<(Turn, Tick)> = journal
            .iter_up_to((Turn::MAX, Tick::MAX))
            .filter(|(k, _)| *k >= from)
            .map(|(k, _)| k)
            .collect();
        for (turn, tick) in hits {
            if let Some(mut batch) = journal.remove_exact(turn, tick) {
                batch.retain(|(k, _)| k != key);
                if !batch.is_empty() {
                    journal.set(turn, tick, batch);
                }
            }
        }
    }

    /// Drops every journal entry for `branch` after `(turn, tick)` (spec
    /// §4.7 unload: truncate forward around the retained window).
    pub fn truncate_forward(&mut self, branch: &BranchId, turn: Turn, tick: Tick, keep_at: bool) {
        if let Some(mut journal) = self.settings.get(branch).cloned() {
            journal.truncate_forward(turn, tick, keep_at);
            self.settings = self.settings.insert(branch.clone(), journal);
        }
        if let Some(mut journal) = self.presettings.get(branch).cloned() {
            journal.truncate_forward(turn, tick, keep_at);
            self.presettings = self.presettings.insert(branch.clone(), journal);
        }
    }

    /// Drops every journal entry for `branch` before `(turn, tick)` (spec
    /// §4.7 unload: truncate backward around the retained window).
    pub fn truncate_backward(&mut self, branch: &BranchId, turn: Turn, tick: Tick, keep_at: bool) {
        if let Some(mut journal) = self.settings.get(branch).cloned() {
            journal.truncate_backward(turn, tick, keep_at);
            self.settings = self.settings.insert(branch.clone(), journal);
        }
        if let Some(mut journal) = self.presettings.get(branch).cloned() {
            journal.truncate_backward(turn, tick, keep_at);
            self.presettings = self.presettings.insert(branch.clone(), journal);
        }
    }

    /// Drops every journal entry for `branch` entirely. Used by unload when
    /// a branch other than the retained one is dropped outright.
    pub fn drop_branch(&mut self, branch: &BranchId) {
        self.settings = self.settings.remove(branch);
        self.presettings = self.presettings.remove(branch);
    }
}
