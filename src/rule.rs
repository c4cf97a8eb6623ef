//! Immutable descriptive record for one detection rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Origin of a rule's events.
///
/// Syscall-origin rules have their event-type and operation codes derived
/// from their condition; plugin-origin rules are reachable only through the
/// plugin event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Syscall,
    Plugin,
}

/// A named detection policy with tags and a source category.
///
/// Owned by the rule loader; the dispatch core holds copies and never
/// mutates them. Name uniqueness is a loader concern and is not enforced
/// here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub tags: BTreeSet<String>,
    pub source: RuleSource,
}

impl Rule {
    pub fn new(name: impl Into<String>, source: RuleSource) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
            source,
        }
    }

    pub fn with_tags<I, S>(name: impl Into<String>, tags: I, source: RuleSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            source,
        }
    }

    /// True if this rule carries at least one of the given tags.
    pub fn has_any_tag(&self, tags: &BTreeSet<String>) -> bool {
        !self.tags.is_disjoint(tags)
    }
}
