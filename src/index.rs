//! Per-ruleset index over filter entries, partitioned by event type.
//!
//! Dispatch resolves an event's type code to one bucket and evaluates only
//! that bucket's predicates; entries carrying the catch-all sentinel live in
//! a separate list consulted only when no type-specific entry matched.

use crate::event::{EventTypeCode, OpCode, SystemEvent};
use crate::filter::{FilterEntry, FilterId};
use crate::rule::Rule;
use std::collections::{BTreeSet, HashSet};

/// Index over the entries enabled in one ruleset.
///
/// Holds handles into the registry's entry arena, never entries themselves.
/// Insertion order within a bucket is dispatch order.
#[derive(Debug, Default)]
pub struct RulesetIndex {
    /// Event-type code -> entries that can fire on it, dense-grown so any
    /// observed code is addressable. Unused slots are empty buckets.
    by_event_type: Vec<Vec<FilterId>>,
    /// Entries carrying the catch-all sentinel, in insertion order.
    catch_all: Vec<FilterId>,
    /// Every entry currently enabled in this ruleset.
    members: HashSet<FilterId>,
}

impl RulesetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry into the bucket of every event type it can fire on,
    /// or into the catch-all list if it carries the sentinel.
    ///
    /// Inserting an already-present entry is a no-op. The per-bucket
    /// membership scan is linear, which is fine because this only runs
    /// while rule sets are being configured, never on the dispatch path.
    pub fn add_filter(&mut self, id: FilterId, entry: &FilterEntry) {
        if entry.matches_any_event_type() {
            push_unique(&mut self.catch_all, id);
        } else {
            for &etype in entry.event_types() {
                let slot = etype as usize;
                if self.by_event_type.len() <= slot {
                    self.by_event_type.resize_with(slot + 1, Vec::new);
                }
                push_unique(&mut self.by_event_type[slot], id);
            }
        }

        self.members.insert(id);
    }

    /// Mirror of [`add_filter`](Self::add_filter); removing an absent entry
    /// is a no-op.
    pub fn remove_filter(&mut self, id: FilterId, entry: &FilterEntry) {
        if entry.matches_any_event_type() {
            remove_item(&mut self.catch_all, id);
        } else {
            for &etype in entry.event_types() {
                if let Some(bucket) = self.by_event_type.get_mut(etype as usize) {
                    remove_item(bucket, id);
                }
            }
        }

        self.members.remove(&id);
    }

    pub fn contains(&self, id: FilterId) -> bool {
        self.members.contains(&id)
    }

    /// Number of entries enabled in this ruleset.
    pub fn num_filters(&self) -> usize {
        self.members.len()
    }

    /// Handles of every enabled entry, in no particular order.
    pub fn member_ids(&self) -> impl Iterator<Item = FilterId> + '_ {
        self.members.iter().copied()
    }

    /// Evaluate one event and return the first matching rule.
    ///
    /// The event's type bucket is tried first, in insertion order, and the
    /// first true predicate wins. Catch-all entries are a pure fallback:
    /// they are consulted only when the type bucket produced no match.
    pub fn run_first<'a>(
        &self,
        event: &SystemEvent,
        entries: &'a [FilterEntry],
    ) -> Option<&'a Rule> {
        if let Some(bucket) = self.by_event_type.get(event.event_type() as usize) {
            for &id in bucket {
                // Handles are only ever minted by the owning registry, so
                // they stay within the arena until clear() resets both.
                let entry = &entries[id as usize];
                if entry.evaluate(event) {
                    return Some(entry.rule());
                }
            }
        }

        for &id in &self.catch_all {
            let entry = &entries[id as usize];
            if entry.evaluate(event) {
                return Some(entry.rule());
            }
        }

        None
    }

    /// Evaluate one event and return every matching rule.
    ///
    /// The type bucket is evaluated fully, in insertion order. If it yielded
    /// any match at all, catch-all entries are never consulted; they only
    /// run as a fallback when no type-specific entry matched.
    pub fn run_all<'a>(&self, event: &SystemEvent, entries: &'a [FilterEntry]) -> Vec<&'a Rule> {
        let mut matches = Vec::new();

        if let Some(bucket) = self.by_event_type.get(event.event_type() as usize) {
            for &id in bucket {
                let entry = &entries[id as usize];
                if entry.evaluate(event) {
                    matches.push(entry.rule());
                }
            }
        }

        if !matches.is_empty() {
            return matches;
        }

        for &id in &self.catch_all {
            let entry = &entries[id as usize];
            if entry.evaluate(event) {
                matches.push(entry.rule());
            }
        }

        matches
    }

    /// Union of event-type codes over every enabled entry.
    pub fn event_type_codes(&self, entries: &[FilterEntry]) -> BTreeSet<EventTypeCode> {
        let mut codes = BTreeSet::new();
        for &id in &self.members {
            codes.extend(entries[id as usize].event_types().iter().copied());
        }
        codes
    }

    /// Union of operation codes over every enabled entry.
    pub fn operation_codes(&self, entries: &[FilterEntry]) -> BTreeSet<OpCode> {
        let mut codes = BTreeSet::new();
        for &id in &self.members {
            codes.extend(entries[id as usize].operation_codes().iter().copied());
        }
        codes
    }
}

fn push_unique(list: &mut Vec<FilterId>, id: FilterId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

fn remove_item(list: &mut Vec<FilterId>, id: FilterId) {
    if let Some(pos) = list.iter().position(|&x| x == id) {
        list.remove(pos);
    }
}
