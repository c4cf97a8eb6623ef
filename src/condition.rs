//! Static-analysis boundary to the external rule compiler.
//!
//! The compiler that turns a rule's textual condition into a predicate also
//! exposes which event-type and operation codes the condition can reference.
//! This module captures that capability as a trait so the dispatch core never
//! depends on the compiler's AST representation.

use crate::error::Result;
use crate::event::{EventTypeCode, OpCode};
use std::collections::BTreeSet;

/// Static analysis surface of one compiled condition.
///
/// Implementations must be deterministic and pure: the same condition always
/// reports the same code sets, and reporting has no side effects.
pub trait ConditionInfo {
    /// Event-type codes the condition can match.
    ///
    /// An empty set means the condition is not restricted to specific event
    /// types, not that it matches nothing.
    fn event_type_codes(&self) -> Result<BTreeSet<EventTypeCode>>;

    /// Operation codes the condition references.
    fn operation_codes(&self) -> Result<BTreeSet<OpCode>>;
}

/// A condition whose code sets are already known.
///
/// Loaders that precompute analysis results, and tests, use this instead of
/// carrying a full compiler AST.
#[derive(Debug, Clone, Default)]
pub struct StaticCondition {
    event_types: BTreeSet<EventTypeCode>,
    op_codes: BTreeSet<OpCode>,
}

impl StaticCondition {
    pub fn new<E, O>(event_types: E, op_codes: O) -> Self
    where
        E: IntoIterator<Item = EventTypeCode>,
        O: IntoIterator<Item = OpCode>,
    {
        Self {
            event_types: event_types.into_iter().collect(),
            op_codes: op_codes.into_iter().collect(),
        }
    }

    /// A condition unrestricted by event type, referencing no operations.
    pub fn any_event_type() -> Self {
        Self::default()
    }
}

impl ConditionInfo for StaticCondition {
    fn event_type_codes(&self) -> Result<BTreeSet<EventTypeCode>> {
        Ok(self.event_types.clone())
    }

    fn operation_codes(&self) -> Result<BTreeSet<OpCode>> {
        Ok(self.op_codes.clone())
    }
}
