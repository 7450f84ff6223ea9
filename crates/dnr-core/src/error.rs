//! Structural rule construction errors

/// Error returned when a rule or modifier cannot be constructed from its
/// textual value. The rule must be left out of the conversion batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error("${modifier} value must not be empty")]
    EmptyModifierValue { modifier: &'static str },
    #[error("forbidden CSP directive: {0}")]
    ForbiddenCspDirective(String),
    #[error("rule can not combine ${first} and ${second}")]
    ConflictingModifiers {
        first: &'static str,
        second: &'static str,
    },
    #[error("unknown option: {0}")]
    UnknownOption(String),
}
