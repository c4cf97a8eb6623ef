//! Event codes and the event record consumed by the dispatch path.
//!
//! Event-type codes classify an event's kind and are dense enough to index
//! an array without excessive sparsity; operation codes denote the lower
//! level system operations a rule condition can reference and are used only
//! for capability reporting, never for dispatch.

use serde_json::Value;

/// Numeric classification of an event's kind, used as the index key.
pub type EventTypeCode = u16;

/// Lower-level code denoting a specific system operation.
pub type OpCode = u32;

/// Event-type code carried by every plugin-sourced event.
pub const PLUGIN_EVENT: EventTypeCode = 322;

/// Event-type code carried by asynchronous events.
///
/// Every registered rule is considered reachable by asynchronous events,
/// even when its condition never mentions them.
pub const ASYNC_EVENT: EventTypeCode = 402;

/// One captured system-activity event.
///
/// The dispatch core only ever reads the numeric type code; the JSON payload
/// exists for predicates, which are compiled externally against the event
/// schema.
#[derive(Debug, Clone)]
pub struct SystemEvent {
    event_type: EventTypeCode,
    data: Value,
}

impl SystemEvent {
    pub fn new(event_type: EventTypeCode, data: Value) -> Self {
        Self { event_type, data }
    }

    /// Create an event with no payload, useful when only the type code
    /// matters.
    pub fn with_type(event_type: EventTypeCode) -> Self {
        Self {
            event_type,
            data: Value::Null,
        }
    }

    pub fn event_type(&self) -> EventTypeCode {
        self.event_type
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Look up a top-level payload field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}
