//! # Ruleset Engine
//!
//! Event-type-indexed rule dispatch core for runtime security detection.
//!
//! Given a stream of system-activity events, the registry determines for
//! each event which of potentially thousands of compiled detection rules can
//! possibly apply, evaluates only those, and reports the first (or all)
//! matches. Rules are partitioned by the event-type codes their conditions
//! can reference, so dispatch touches exactly one type bucket plus, as a
//! fallback, the rules that are not specific to any event type.
//!
//! Predicate compilation, event capture, and rule-file parsing live in
//! external collaborators; this crate indexes, selects, and runs the
//! compiled predicates.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ruleset_engine::{
//!     MatchMode, Rule, RuleSource, RulesetRegistry, StaticCondition, SystemEvent,
//!     DEFAULT_RULESET_ID,
//! };
//! use std::sync::Arc;
//!
//! let mut registry = RulesetRegistry::new();
//!
//! // Register a compiled rule: fires on event type 3 when proc.name is "nc".
//! let rule = Rule::with_tags("Netcat spawned", ["net"], RuleSource::Syscall);
//! let condition = StaticCondition::new([3], [42]);
//! registry.add(
//!     rule,
//!     Arc::new(|event| event.field("proc.name") == Some(&"nc".into())),
//!     &condition,
//! )?;
//!
//! // Select rules into the default ruleset and dispatch.
//! registry.enable("*", MatchMode::Wildcard, DEFAULT_RULESET_ID);
//! registry.on_loading_complete();
//!
//! let event = SystemEvent::new(3, serde_json::json!({"proc.name": "nc"}));
//! if let Some(rule) = registry.run_first(&event, DEFAULT_RULESET_ID) {
//!     println!("matched: {}", rule.name);
//! }
//! # Ok::<(), ruleset_engine::RulesetError>(())
//! ```
//!
//! ## Phases of use
//!
//! Configuration (`add`, `enable*`, `disable*`, `clear`) takes `&mut self`;
//! dispatch and queries take `&self`. No internal locking exists: the borrow
//! checker rules out mutation concurrent with dispatch, while concurrent
//! dispatch over a shared, already-configured registry is safe and is what
//! [`RulesetRegistry::run_batch`] does internally.

pub mod condition;
pub mod error;
pub mod event;
pub mod filter;
pub mod index;
pub mod registry;
pub mod rule;

pub use condition::{ConditionInfo, StaticCondition};
pub use error::{Result, RulesetError};
pub use event::{EventTypeCode, OpCode, SystemEvent, ASYNC_EVENT, PLUGIN_EVENT};
pub use filter::{FilterEntry, FilterId, PredicateFn};
pub use index::RulesetIndex;
pub use registry::{MatchMode, RulesetId, RulesetRegistry, DEFAULT_RULESET_ID};
pub use rule::{Rule, RuleSource};
