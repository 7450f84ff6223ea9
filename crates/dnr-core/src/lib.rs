//! DNR Core Library
//!
//! Data model shared by the declarative rule compiler and its front ends.
//!
//! # Modules
//!
//! - `types`: Option and request type bit masks
//! - `modifiers`: Advanced modifiers (`$removeheader`, `$csp`, `$removeparam`, `$redirect`)
//! - `rule`: Parsed network rules and their source positions
//! - `declarative`: Declarative rule wire format
//! - `error`: Structural construction errors

pub mod declarative;
pub mod error;
pub mod modifiers;
pub mod rule;
pub mod types;

// Re-export commonly used types
pub use declarative::{DeclarativeRule, RuleAction, RuleActionType, RuleCondition};
pub use error::RuleError;
pub use modifiers::{AdvancedModifier, RemoveHeaderModifier};
pub use rule::{IndexedRule, NetworkRule};
pub use types::{NetworkRuleOption, RequestType};
