//! Compiled filter entries: one rule bound to its predicate and the codes
//! it can fire on.

use crate::condition::ConditionInfo;
use crate::error::{Result, RulesetError};
use crate::event::{EventTypeCode, OpCode, SystemEvent, ASYNC_EVENT, PLUGIN_EVENT};
use crate::rule::{Rule, RuleSource};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Stable handle into the registry's entry arena.
///
/// Every ruleset index stores handles, never entries; handle equality is the
/// identity used for deduplication.
pub type FilterId = u32;

/// Compiled boolean test over one event, produced by the external predicate
/// compiler.
pub type PredicateFn = Arc<dyn Fn(&SystemEvent) -> bool + Send + Sync>;

/// One rule bound to its compiled predicate plus the derived code sets.
///
/// Built exactly once at registration and never mutated afterward; only set
/// membership in ruleset indexes changes. An empty `event_types` set is a
/// sentinel meaning the entry matches regardless of event type, not that it
/// matches nothing.
pub struct FilterEntry {
    rule: Rule,
    predicate: PredicateFn,
    event_types: BTreeSet<EventTypeCode>,
    operation_codes: BTreeSet<OpCode>,
}

impl FilterEntry {
    /// Build an entry, deriving its code sets from the rule's condition.
    ///
    /// Syscall-origin rules take both code sets from static condition
    /// analysis; plugin-origin rules reference no operations and are pinned
    /// to the plugin event type. Either way the async event type is added,
    /// since every rule is reachable by asynchronous events.
    ///
    /// Analysis failures surface as [`RulesetError::RuleRegistration`] and
    /// no entry is constructed.
    pub fn new(rule: Rule, predicate: PredicateFn, condition: &dyn ConditionInfo) -> Result<Self> {
        let (operation_codes, event_types) = match rule.source {
            RuleSource::Syscall => {
                let ops = condition
                    .operation_codes()
                    .map_err(|e| registration_error(&rule, &e))?;
                let types = condition
                    .event_type_codes()
                    .map_err(|e| registration_error(&rule, &e))?;
                (ops, types)
            }
            RuleSource::Plugin => (BTreeSet::new(), BTreeSet::from([PLUGIN_EVENT])),
        };

        Ok(Self::from_parts(rule, predicate, event_types, operation_codes))
    }

    /// Build an entry from already-derived code sets.
    ///
    /// The async event type is still added unconditionally.
    pub fn from_parts(
        rule: Rule,
        predicate: PredicateFn,
        mut event_types: BTreeSet<EventTypeCode>,
        operation_codes: BTreeSet<OpCode>,
    ) -> Self {
        event_types.insert(ASYNC_EVENT);
        Self {
            rule,
            predicate,
            event_types,
            operation_codes,
        }
    }

    /// Build an entry whose `event_types` is the catch-all sentinel.
    ///
    /// Such an entry is evaluated for every event type, after all
    /// type-specific entries have been tried and none matched.
    pub fn catch_all(rule: Rule, predicate: PredicateFn) -> Self {
        Self {
            rule,
            predicate,
            event_types: BTreeSet::new(),
            operation_codes: BTreeSet::new(),
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn event_types(&self) -> &BTreeSet<EventTypeCode> {
        &self.event_types
    }

    pub fn operation_codes(&self) -> &BTreeSet<OpCode> {
        &self.operation_codes
    }

    /// True if this entry carries the catch-all sentinel.
    pub fn matches_any_event_type(&self) -> bool {
        self.event_types.is_empty()
    }

    /// Run the compiled predicate against one event.
    pub fn evaluate(&self, event: &SystemEvent) -> bool {
        (self.predicate)(event)
    }
}

impl fmt::Debug for FilterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterEntry")
            .field("rule", &self.rule)
            .field("event_types", &self.event_types)
            .field("operation_codes", &self.operation_codes)
            .finish()
    }
}

fn registration_error(rule: &Rule, cause: &RulesetError) -> RulesetError {
    RulesetError::RuleRegistration {
        rule: rule.name.clone(),
        reason: cause.to_string(),
    }
}
