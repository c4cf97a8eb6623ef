//! Integration tests for the ruleset engine crate.
//!
//! These exercise the full loading-then-dispatch flow the detection pipeline
//! drives: register compiled rules, select them into rulesets, then run
//! events against the configured registry.

use ruleset_engine::{
    MatchMode, PredicateFn, Rule, RuleSource, RulesetRegistry, StaticCondition, SystemEvent,
    DEFAULT_RULESET_ID,
};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;

const EXEC_EVENT: u16 = 3;
const OPEN_EVENT: u16 = 5;
const CONNECT_EVENT: u16 = 9;

fn field_equals(field: &'static str, value: &'static str) -> PredicateFn {
    Arc::new(move |event| event.field(field).and_then(|v| v.as_str()) == Some(value))
}

fn load_sample_rules(registry: &mut RulesetRegistry) {
    registry
        .add(
            Rule::with_tags("Netcat spawned", ["net", "process"], RuleSource::Syscall),
            field_equals("proc.name", "nc"),
            &StaticCondition::new([EXEC_EVENT], [59]),
        )
        .unwrap();
    registry
        .add(
            Rule::with_tags("Write below etc", ["fs"], RuleSource::Syscall),
            field_equals("fd.directory", "/etc"),
            &StaticCondition::new([OPEN_EVENT], [2, 3]),
        )
        .unwrap();
    registry
        .add(
            Rule::with_tags("Outbound to c2", ["net"], RuleSource::Syscall),
            field_equals("fd.sip", "203.0.113.7"),
            &StaticCondition::new([CONNECT_EVENT], [42]),
        )
        .unwrap();
}

#[test]
fn test_crate_structure_compiles() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);
    assert_eq!(registry.num_entries(), 3);
}

#[test]
fn test_end_to_end_load_enable_dispatch() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);
    registry.enable("*", MatchMode::Wildcard, DEFAULT_RULESET_ID);
    registry.on_loading_complete();

    assert_eq!(registry.enabled_count(DEFAULT_RULESET_ID), 3);

    let exec = SystemEvent::new(EXEC_EVENT, json!({"proc.name": "nc"}));
    let matched = registry.run_first(&exec, DEFAULT_RULESET_ID);
    assert_eq!(matched.map(|r| r.name.as_str()), Some("Netcat spawned"));

    let benign = SystemEvent::new(EXEC_EVENT, json!({"proc.name": "ls"}));
    assert!(registry.run_first(&benign, DEFAULT_RULESET_ID).is_none());

    let open = SystemEvent::new(OPEN_EVENT, json!({"fd.directory": "/etc"}));
    let matched = registry.run_first(&open, DEFAULT_RULESET_ID);
    assert_eq!(matched.map(|r| r.name.as_str()), Some("Write below etc"));
}

#[test]
fn test_independent_rulesets() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);

    let net_tags: BTreeSet<String> = ["net".to_string()].into();
    let fs_tags: BTreeSet<String> = ["fs".to_string()].into();
    registry.enable_tags(&net_tags, 0);
    registry.enable_tags(&fs_tags, 1);

    assert_eq!(registry.enabled_count(0), 2);
    assert_eq!(registry.enabled_count(1), 1);

    // An /etc write only fires in the fs ruleset.
    let open = SystemEvent::new(OPEN_EVENT, json!({"fd.directory": "/etc"}));
    assert!(registry.run_first(&open, 0).is_none());
    assert!(registry.run_first(&open, 1).is_some());
}

#[test]
fn test_enabled_codes_drive_capture_configuration() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);
    let net_tags: BTreeSet<String> = ["net".to_string()].into();
    registry.enable_tags(&net_tags, DEFAULT_RULESET_ID);

    let types = registry.enabled_event_types(DEFAULT_RULESET_ID);
    assert!(types.contains(&EXEC_EVENT));
    assert!(types.contains(&CONNECT_EVENT));
    assert!(!types.contains(&OPEN_EVENT));

    let ops = registry.enabled_operation_codes(DEFAULT_RULESET_ID);
    assert_eq!(ops, BTreeSet::from([42, 59]));
}

#[test]
fn test_parallel_batch_dispatch() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);
    registry.enable("", MatchMode::Substring, DEFAULT_RULESET_ID);

    let events: Vec<SystemEvent> = (0..1000)
        .map(|i| {
            if i % 2 == 0 {
                SystemEvent::new(EXEC_EVENT, json!({"proc.name": "nc"}))
            } else {
                SystemEvent::new(EXEC_EVENT, json!({"proc.name": "ls"}))
            }
        })
        .collect();

    let results = registry.run_batch(&events, DEFAULT_RULESET_ID);
    let hits = results.iter().filter(|r| r.is_some()).count();
    assert_eq!(hits, 500);
}

#[test]
fn test_shared_registry_across_threads() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);
    registry.enable("", MatchMode::Substring, DEFAULT_RULESET_ID);
    let registry = Arc::new(registry);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                let event = SystemEvent::new(EXEC_EVENT, json!({"proc.name": "nc"}));
                for _ in 0..100 {
                    let matched = registry.run_first(&event, DEFAULT_RULESET_ID);
                    assert_eq!(matched.map(|r| r.name.as_str()), Some("Netcat spawned"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_reload_cycle() {
    let mut registry = RulesetRegistry::new();
    load_sample_rules(&mut registry);
    registry.enable("", MatchMode::Substring, DEFAULT_RULESET_ID);
    assert_eq!(registry.enabled_count(DEFAULT_RULESET_ID), 3);

    // Simulate a rules reload: clear, re-add, re-enable.
    registry.clear();
    assert_eq!(registry.num_entries(), 0);
    assert_eq!(registry.enabled_count(DEFAULT_RULESET_ID), 0);

    load_sample_rules(&mut registry);
    registry.enable("Netcat spawned", MatchMode::Exact, DEFAULT_RULESET_ID);
    registry.on_loading_complete();
    assert_eq!(registry.enabled_count(DEFAULT_RULESET_ID), 1);
}
