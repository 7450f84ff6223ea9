//! Conversion and limitation diagnostics
//!
//! Neither kind aborts a run. Conversion errors describe single rules;
//! limitation errors describe what was cut to fit the engine's caps.

use serde::Serialize;

/// Problem converting one source rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ConversionError {
    /// The source rule produced no declarative rule.
    #[error("rule {source_rule_index} of filter {filter_id} can not be converted: {reason}")]
    #[serde(rename_all = "camelCase")]
    Unsupported {
        filter_id: u32,
        source_rule_index: u32,
        reason: String,
    },
    /// The source rule was converted, but part of it could not be expressed.
    #[error(
        "rule {source_rule_index} of filter {filter_id} was partially converted into \
         declarative rule {declarative_rule_id}: {reason}"
    )]
    #[serde(rename_all = "camelCase")]
    Degraded {
        declarative_rule_id: u32,
        filter_id: u32,
        source_rule_index: u32,
        reason: String,
    },
}

impl ConversionError {
    /// Id of the declarative rule this error belongs to, if any.
    pub fn declarative_rule_id(&self) -> Option<u32> {
        match self {
            Self::Unsupported { .. } => None,
            Self::Degraded { declarative_rule_id, .. } => Some(*declarative_rule_id),
        }
    }

    pub fn source_rule_index(&self) -> u32 {
        match self {
            Self::Unsupported { source_rule_index, .. } | Self::Degraded { source_rule_index, .. } => {
                *source_rule_index
            }
        }
    }
}

/// Output was trimmed to fit a configured limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LimitationError {
    #[error("too many declarative rules: {excess} over the limit of {limit}")]
    #[serde(rename_all = "camelCase")]
    TooManyRules {
        excluded_rule_indices: Vec<u32>,
        limit: usize,
        excess: usize,
    },
    #[error("too many regexp rules: {excess} over the limit of {limit}")]
    #[serde(rename_all = "camelCase")]
    TooManyRegexpRules {
        excluded_rule_indices: Vec<u32>,
        limit: usize,
        excess: usize,
    },
}

impl LimitationError {
    pub fn excluded_rule_indices(&self) -> &[u32] {
        match self {
            Self::TooManyRules { excluded_rule_indices, .. }
            | Self::TooManyRegexpRules { excluded_rule_indices, .. } => excluded_rule_indices,
        }
    }

    pub fn excess(&self) -> usize {
        match self {
            Self::TooManyRules { excess, .. } | Self::TooManyRegexpRules { excess, .. } => *excess,
        }
    }
}
