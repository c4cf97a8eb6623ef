//! Error types for the ruleset engine crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RulesetError>;

/// Errors surfaced by the rule registration path.
///
/// Everything outside of registration (enable/disable, dispatch, queries,
/// clear) is total over its input domain and does not fail; out-of-range
/// ruleset ids are treated as empty rulesets instead of raising an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesetError {
    /// Static analysis of a compiled condition failed.
    ///
    /// Produced by the condition analyzer the rule compiler exposes; the
    /// registry wraps it into [`RulesetError::RuleRegistration`] before
    /// surfacing it to the loader.
    #[error("condition analysis failed: {0}")]
    ConditionAnalysis(String),

    /// A rule could not be registered.
    ///
    /// The offending rule is not inserted anywhere; global and per-ruleset
    /// state are exactly as they were before the call.
    #[error("registration of rule '{rule}' failed: {reason}")]
    RuleRegistration { rule: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_analysis_display() {
        let err = RulesetError::ConditionAnalysis("unknown field 'evt.foo'".to_string());
        assert_eq!(
            err.to_string(),
            "condition analysis failed: unknown field 'evt.foo'"
        );
    }

    #[test]
    fn test_rule_registration_display() {
        let err = RulesetError::RuleRegistration {
            rule: "Terminal shell in container".to_string(),
            reason: "condition analysis failed: bad operator".to_string(),
        };
        assert!(err.to_string().contains("Terminal shell in container"));
        assert!(err.to_string().contains("bad operator"));
    }

    #[test]
    fn test_error_equality() {
        let a = RulesetError::ConditionAnalysis("x".to_string());
        let b = RulesetError::ConditionAnalysis("x".to_string());
        let c = RulesetError::ConditionAnalysis("y".to_string());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_result_type_alias() {
        fn registers() -> Result<u32> {
            Ok(7)
        }
        assert_eq!(registers().unwrap(), 7);
    }
}
