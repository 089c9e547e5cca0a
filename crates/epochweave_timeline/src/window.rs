//! `WindowDict`: an ordered map from `(Turn, Tick)` to a value, supporting
//! "value at or before this time" lookup and forward/backward truncation.
//!
//! This is the leaf data structure the rest of the timeline, cache, and delta
//! layers are built on (`allegedb/window.py`'s `WindowDict`), generalized to
//! any value type so it can hold either a single historical value (a
//! keyframe pointer) or a batch of changes recorded at one tick (a journal
//! entry).

use std::collections::BTreeMap;
use std::ops::Bound;

/// A turn number: a coarse, non-negative integer time unit.
pub type Turn = u64;
/// A tick number: fine-grained time within a turn, auto-incremented by
/// every write.
pub type Tick = u64;

/// Ordered map keyed by `(Turn, Tick)`, supporting "latest entry at or
/// before" retrieval and windowed forward/backward iteration.
///
/// Backed by `BTreeMap` rather than any external ordered-map crate: this is
/// squarely `BTreeMap`'s sweet spot (ordered, range-queryable, no need for
/// concurrent access), and nothing in this codebase's lineage reaches for
/// anything fancier for this shape.
#[derive(Debug, Clone, Default)]
pub struct WindowDict<V> {
    entries: BTreeMap<(Turn, Tick), V>,
}

impl<V> WindowDict<V> {
    /// Creates an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Inserts a value at `(turn, tick)`.
    ///
    /// Rejects inserting over an existing key: data-model invariant 5 says
    /// no two writes share a `(branch, turn, tick)`, and within one branch's
    /// window that means no two entries share a key. Returns `false` (and
    /// leaves the window unchanged) if the key was already present.
    #[must_use]
    pub fn insert(&mut self, turn: Turn, tick: Tick, value: V) -> bool {
        if self.entries.contains_key(&(turn, tick)) {
            return false;
        }
        self.entries.insert((turn, tick), value);
        true
    }

    /// Inserts a value at `(turn, tick)`, overwriting any existing entry.
    ///
    /// Used by presettings journals and keyframe delta replay, where the
    /// same time may legitimately be written more than once during
    /// reconstruction (as opposed to a live write, which must go through
    /// [`WindowDict::insert`]).
    pub fn set(&mut self, turn: Turn, tick: Tick, value: V) {
        self.entries.insert((turn, tick), value);
    }

    /// The value at the exact key, if any.
    #[must_use]
    pub fn get_exact(&self, turn: Turn, tick: Tick) -> Option<&V> {
        self.entries.get(&(turn, tick))
    }

    /// Removes and returns the entry at the exact key, if any. Used to
    /// scrub a single tick's worth of journal data when a contradicted
    /// plan's tail is invalidated (spec §4.5).
    pub fn remove_exact(&mut self, turn: Turn, tick: Tick) -> Option<V> {
        self.entries.remove(&(turn, tick))
    }

    /// The value effective at `(turn, tick)`: the entry at the latest key
    /// less than or equal to `(turn, tick)`, or `None` if the window has no
    /// entry that early.
    #[must_use]
    pub fn retrieve(&self, turn: Turn, tick: Tick) -> Option<&V> {
        self.entries
            .range((Bound::Unbounded, Bound::Included(&(turn, tick))))
            .next_back()
            .map(|(_, v)| v)
    }

    /// Same as [`WindowDict::retrieve`] but also returns the key it found,
    /// useful when the caller needs to know exactly which time the value
    /// was recorded at (e.g. keyframe lookups).
    #[must_use]
    pub fn retrieve_with_key(&self, turn: Turn, tick: Tick) -> Option<((Turn, Tick), &V)> {
        self.entries
            .range((Bound::Unbounded, Bound::Included(&(turn, tick))))
            .next_back()
            .map(|(k, v)| (*k, v))
    }

    /// The latest entry in the window, regardless of time.
    #[must_use]
    pub fn last(&self) -> Option<((Turn, Tick), &V)> {
        self.entries.iter().next_back().map(|(k, v)| (*k, v))
    }

    /// Drops every entry after `(turn, tick)`, inclusive or exclusive per
    /// `keep_at`. Used by unload (spec §4.7) to shrink a journal down to the
    /// retained window's upper edge.
    pub fn truncate_forward(&mut self, turn: Turn, tick: Tick, keep_at: bool) {
        let bound = if keep_at {
            Bound::Excluded((turn, tick))
        } else {
            Bound::Included((turn, tick))
        };
        self.entries
            .retain(|&k, _| !matches!(bound, Bound::Excluded(b) if k > b)
                && !matches!(bound, Bound::Included(b) if k >= b));
    }

    /// Drops every entry before `(turn, tick)`, inclusive or exclusive per
    /// `keep_at`. Used by unload to shrink a journal down to the retained
    /// window's lower edge.
    pub fn truncate_backward(&mut self, turn: Turn, tick: Tick, keep_at: bool) {
        let bound = if keep_at {
            Bound::Excluded((turn, tick))
        } else {
            Bound::Included((turn, tick))
        };
        self.entries
            .retain(|&k, _| !matches!(bound, Bound::Excluded(b) if k < b)
                && !matches!(bound, Bound::Included(b) if k <= b));
    }

    /// Iterates entries in the half-open forward range `(from, to]`,
    /// matching `update_window` from `allegedb/window.py`: the delta engine
    /// uses this to project a forward journal into a diff.
    pub fn iter_window(
        &self,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> impl Iterator<Item = ((Turn, Tick), &V)> {
        self.entries
            .range((Bound::Excluded(from), Bound::Included(to)))
            .map(|(k, v)| (*k, v))
    }

    /// Iterates entries in the half-open backward range `(to, from]`, most
    /// recent first, matching `update_backward_window`: the delta engine's
    /// backward traversal when `t0 > t1`.
    pub fn iter_window_backward(
        &self,
        from: (Turn, Tick),
        to: (Turn, Tick),
    ) -> impl Iterator<Item = ((Turn, Tick), &V)> {
        self.entries
            .range((Bound::Excluded(to), Bound::Included(from)))
            .rev()
            .map(|(k, v)| (*k, v))
    }

    /// Iterates every entry at or before `to`, in ascending order. Used as
    /// the degenerate case of [`WindowDict::iter_window`] when there is no
    /// lower bound to exclude (e.g. no keyframe exists yet anywhere in the
    /// branch chain, so reconstruction must replay from the dawn of time).
    pub fn iter_up_to(&self, to: (Turn, Tick)) -> impl Iterator<Item = ((Turn, Tick), &V)> {
        self.entries
            .range((Bound::Unbounded, Bound::Included(to)))
            .map(|(k, v)| (*k, v))
    }

    /// Scans entries at or before `(turn, tick)` in descending order,
    /// applying `f` to each and returning the first `Some`. Used to find
    /// the latest write of a particular key within a batched journal
    /// without requiring a separate per-key index.
    pub fn find_backward<F, R>(&self, turn: Turn, tick: Tick, mut f: F) -> Option<R>
    where
        F: FnMut(&V) -> Option<R>,
    {
        for (_, v) in self
            .entries
            .range((Bound::Unbounded, Bound::Included(&(turn, tick))))
            .rev()
        {
            if let Some(r) = f(v) {
                return Some(r);
            }
        }
        None
    }

    /// Iterates every entry in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ((Turn, Tick), &V)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}
