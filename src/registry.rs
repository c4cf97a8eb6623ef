//! Global filter registry and the per-ruleset enable/disable/run surface.
//!
//! The registry owns every filter entry ever registered (an insertion
//! ordered arena addressed by [`FilterId`] handles) and a growable sequence
//! of [`RulesetIndex`] views over it, one per ruleset id. Rule loading
//! populates the arena through [`RulesetRegistry::add`], enable/disable
//! operations select subsets into indexes, and detection-time dispatch goes
//! through the `run_*` methods.
//!
//! The registry has two disjoint phases of use: configuration (`add`,
//! `enable*`, `disable*`, `clear`) takes `&mut self`, dispatch and queries
//! take `&self`. There is no internal locking; concurrent dispatch over a
//! configured registry is safe because entries and indexes are read-only
//! behind a shared reference.

use crate::condition::ConditionInfo;
use crate::error::Result;
use crate::event::{EventTypeCode, OpCode, SystemEvent};
use crate::filter::{FilterEntry, FilterId, PredicateFn};
use crate::index::RulesetIndex;
use crate::rule::Rule;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Identifier of one independently enable/disable-able rule subset.
pub type RulesetId = u16;

/// Ruleset used when the loader does not ask for a specific one.
pub const DEFAULT_RULESET_ID: RulesetId = 0;

/// How an enable/disable pattern is tested against rule names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Whole-name equality; an empty pattern matches every rule.
    Exact,
    /// Occurrence anywhere in the name; an empty pattern matches every rule.
    Substring,
    /// Shell-glob semantics (`*` and `?`); an empty pattern matches only
    /// empty names.
    Wildcard,
}

/// Pattern resolved to a concrete matcher once per enable/disable call.
enum NameMatcher {
    Exact(String),
    Substring(String),
    Wildcard(Option<Regex>),
}

impl NameMatcher {
    fn new(pattern: &str, mode: MatchMode) -> Self {
        match mode {
            MatchMode::Exact => NameMatcher::Exact(pattern.to_string()),
            MatchMode::Substring => NameMatcher::Substring(pattern.to_string()),
            MatchMode::Wildcard => NameMatcher::Wildcard(Regex::new(&glob_to_regex(pattern)).ok()),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Exact(pattern) => pattern.is_empty() || name == pattern,
            NameMatcher::Substring(pattern) => pattern.is_empty() || name.contains(pattern),
            // Translation escapes everything except the glob metacharacters,
            // so the pattern always compiles; a failure matches nothing.
            NameMatcher::Wildcard(regex) => regex.as_ref().is_some_and(|re| re.is_match(name)),
        }
    }
}

/// Translate a shell glob into an anchored regex.
fn glob_to_regex(pattern: &str) -> String {
    let mut translated = String::with_capacity(pattern.len() + 2);
    let mut buf = [0u8; 4];
    translated.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            other => translated.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    translated.push('$');
    translated
}

/// The event-type-indexed ruleset registry.
///
/// # Examples
///
/// ```rust,ignore
/// use ruleset_engine::{MatchMode, RulesetRegistry, DEFAULT_RULESET_ID};
///
/// let mut registry = RulesetRegistry::new();
/// registry.add(rule, predicate, &condition)?;
/// registry.enable("*", MatchMode::Wildcard, DEFAULT_RULESET_ID);
///
/// if let Some(rule) = registry.run_first(&event, DEFAULT_RULESET_ID) {
///     println!("matched {}", rule.name);
/// }
/// ```
#[derive(Debug, Default)]
pub struct RulesetRegistry {
    /// Every entry ever registered, in insertion order. Insertion order is
    /// dispatch order within a type bucket.
    entries: Vec<FilterEntry>,
    /// One index per ruleset id, grown on demand by mutation operations.
    rulesets: Vec<RulesetIndex>,
}

impl RulesetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one rule with its compiled predicate.
    ///
    /// Derives the entry's event-type and operation codes from `condition`
    /// per the rule's source, inserts it into the global collection, and
    /// returns its handle. No ruleset index is touched; the entry stays
    /// dormant until enabled.
    ///
    /// Fails atomically if condition analysis fails: the entry is not
    /// inserted and no state changes.
    pub fn add(
        &mut self,
        rule: Rule,
        predicate: PredicateFn,
        condition: &dyn ConditionInfo,
    ) -> Result<FilterId> {
        let entry = FilterEntry::new(rule, predicate, condition)?;
        let id = self.entries.len() as FilterId;
        self.entries.push(entry);
        Ok(id)
    }

    /// Number of entries in the global collection.
    pub fn num_entries(&self) -> usize {
        self.entries.len()
    }

    pub fn entry(&self, id: FilterId) -> Option<&FilterEntry> {
        self.entries.get(id as usize)
    }

    /// Discard every ruleset index and empty the global collection.
    ///
    /// Each index slot is replaced with a fresh empty one, so previously
    /// observed ruleset ids keep reporting zero enabled rules.
    pub fn clear(&mut self) {
        for index in self.rulesets.iter_mut() {
            *index = RulesetIndex::new();
        }
        self.entries.clear();
    }

    /// Enable every rule whose name matches `pattern` under `mode` in the
    /// given ruleset.
    pub fn enable(&mut self, pattern: &str, mode: MatchMode, ruleset_id: RulesetId) {
        self.enable_disable(pattern, mode, true, ruleset_id);
    }

    /// Disable every rule whose name matches `pattern` under `mode` in the
    /// given ruleset.
    pub fn disable(&mut self, pattern: &str, mode: MatchMode, ruleset_id: RulesetId) {
        self.enable_disable(pattern, mode, false, ruleset_id);
    }

    fn enable_disable(
        &mut self,
        pattern: &str,
        mode: MatchMode,
        enabled: bool,
        ruleset_id: RulesetId,
    ) {
        self.ensure_ruleset(ruleset_id);
        let matcher = NameMatcher::new(pattern, mode);
        let index = &mut self.rulesets[ruleset_id as usize];

        for (id, entry) in self.entries.iter().enumerate() {
            if matcher.matches(&entry.rule().name) {
                if enabled {
                    index.add_filter(id as FilterId, entry);
                } else {
                    index.remove_filter(id as FilterId, entry);
                }
            }
        }
    }

    /// Enable every rule carrying at least one of the given tags.
    pub fn enable_tags(&mut self, tags: &BTreeSet<String>, ruleset_id: RulesetId) {
        self.enable_disable_tags(tags, true, ruleset_id);
    }

    /// Disable every rule carrying at least one of the given tags.
    pub fn disable_tags(&mut self, tags: &BTreeSet<String>, ruleset_id: RulesetId) {
        self.enable_disable_tags(tags, false, ruleset_id);
    }

    fn enable_disable_tags(&mut self, tags: &BTreeSet<String>, enabled: bool, ruleset_id: RulesetId) {
        self.ensure_ruleset(ruleset_id);
        let index = &mut self.rulesets[ruleset_id as usize];

        for (id, entry) in self.entries.iter().enumerate() {
            if entry.rule().has_any_tag(tags) {
                if enabled {
                    index.add_filter(id as FilterId, entry);
                } else {
                    index.remove_filter(id as FilterId, entry);
                }
            }
        }
    }

    /// Enable one rule by exact name.
    pub fn enable_rule(&mut self, rule: &Rule, ruleset_id: RulesetId) {
        self.enable(&rule.name, MatchMode::Exact, ruleset_id);
    }

    /// Disable one rule by exact name.
    pub fn disable_rule(&mut self, rule: &Rule, ruleset_id: RulesetId) {
        self.disable(&rule.name, MatchMode::Exact, ruleset_id);
    }

    /// Number of rules enabled in the given ruleset, growing the ruleset
    /// sequence if needed.
    pub fn enabled_count(&mut self, ruleset_id: RulesetId) -> usize {
        self.ensure_ruleset(ruleset_id);
        self.rulesets[ruleset_id as usize].num_filters()
    }

    /// Evaluate one event against a ruleset, returning the first matching
    /// rule.
    ///
    /// An unknown ruleset id reads as empty; this path never grows the
    /// ruleset sequence.
    pub fn run_first(&self, event: &SystemEvent, ruleset_id: RulesetId) -> Option<&Rule> {
        self.rulesets
            .get(ruleset_id as usize)?
            .run_first(event, &self.entries)
    }

    /// Evaluate one event against a ruleset, returning every matching rule.
    ///
    /// Catch-all rules are only reported when no type-specific rule matched.
    pub fn run_all(&self, event: &SystemEvent, ruleset_id: RulesetId) -> Vec<&Rule> {
        match self.rulesets.get(ruleset_id as usize) {
            Some(index) => index.run_all(event, &self.entries),
            None => Vec::new(),
        }
    }

    /// Evaluate a batch of events in parallel, returning the first match per
    /// event.
    ///
    /// Dispatch is a pure read over the configured registry, so events can
    /// fan out across threads.
    pub fn run_batch(&self, events: &[SystemEvent], ruleset_id: RulesetId) -> Vec<Option<&Rule>> {
        events
            .par_iter()
            .map(|event| self.run_first(event, ruleset_id))
            .collect()
    }

    /// Union of event-type codes over every rule enabled in the ruleset.
    pub fn enabled_event_types(&self, ruleset_id: RulesetId) -> BTreeSet<EventTypeCode> {
        self.rulesets
            .get(ruleset_id as usize)
            .map(|index| index.event_type_codes(&self.entries))
            .unwrap_or_default()
    }

    /// Union of operation codes over every rule enabled in the ruleset.
    pub fn enabled_operation_codes(&self, ruleset_id: RulesetId) -> BTreeSet<OpCode> {
        self.rulesets
            .get(ruleset_id as usize)
            .map(|index| index.operation_codes(&self.entries))
            .unwrap_or_default()
    }

    /// Report the currently enabled rules once rule loading has finished.
    ///
    /// Purely observational: logs each enabled rule name across every
    /// ruleset and the total count at debug level.
    pub fn on_loading_complete(&self) {
        debug!("enabled rules:");
        let mut total = 0;
        for index in &self.rulesets {
            for id in index.member_ids() {
                total += 1;
                debug!("   {}", self.entries[id as usize].rule().name);
            }
        }
        debug!("({total}) enabled rules in total");
    }

    fn ensure_ruleset(&mut self, ruleset_id: RulesetId) {
        let needed = ruleset_id as usize + 1;
        if self.rulesets.len() < needed {
            self.rulesets.resize_with(needed, RulesetIndex::new);
        }
    }
}
