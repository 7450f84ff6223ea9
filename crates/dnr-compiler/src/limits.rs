//! Fits converted rules into the engine's rule count caps.
//!
//! Rules are cut in emission order. Whatever is cut also loses its source map
//! entries and id-tied errors, and the source indices it covered are reported
//! in one limitation error per cap.

use std::collections::HashMap;

use dnr_core::declarative::DeclarativeRule;
use log::warn;

use crate::converters::ConvertedRules;
use crate::error::{ConversionError, LimitationError};
use crate::source_map::Source;

/// Final result of a conversion run.
#[derive(Debug, Clone, Default)]
pub struct ConversionResult {
    pub declarative_rules: Vec<DeclarativeRule>,
    pub source_map: Vec<Source>,
    pub errors: Vec<ConversionError>,
    pub limitations: Vec<LimitationError>,
}

impl ConversionResult {
    pub fn regexp_rules_count(&self) -> usize {
        self.declarative_rules.iter().filter(|r| r.is_regex()).count()
    }
}

/// Scratch indices from declarative id to what depends on it.
struct RuleIndex {
    sources: HashMap<u32, Vec<Source>>,
    errors: HashMap<u32, Vec<ConversionError>>,
}

impl RuleIndex {
    /// Forgets a dropped rule and returns the source indices it covered.
    fn remove(&mut self, id: u32) -> Vec<u32> {
        self.errors.remove(&id);
        self.sources
            .remove(&id)
            .unwrap_or_default()
            .into_iter()
            .map(|source| source.source_rule_index)
            .collect()
    }
}

/// Applies the configured caps. A cap of zero is treated as unset.
pub fn enforce_limitations(
    converted: ConvertedRules,
    max_number_of_rules: Option<usize>,
    max_number_of_regexp_rules: Option<usize>,
) -> ConversionResult {
    let ConvertedRules {
        mut declarative_rules,
        source_map,
        errors,
    } = converted;

    let mut index = RuleIndex {
        sources: HashMap::new(),
        errors: HashMap::new(),
    };
    let mut untied_errors = Vec::new();
    for error in errors {
        match error.declarative_rule_id() {
            Some(id) => index.errors.entry(id).or_default().push(error),
            None => untied_errors.push(error),
        }
    }
    for source in source_map {
        index.sources.entry(source.declarative_rule_id).or_default().push(source);
    }

    let mut limitations = Vec::new();

    if let Some(limit) = max_number_of_rules.filter(|&limit| limit > 0) {
        if declarative_rules.len() > limit {
            let excess = declarative_rules.len() - limit;
            let excluded_rule_indices: Vec<u32> = declarative_rules
                .drain(limit..)
                .flat_map(|rule| index.remove(rule.id))
                .collect();

            warn!("Too many declarative rules: {} exceed the limit of {}", excess, limit);
            limitations.push(LimitationError::TooManyRules {
                excluded_rule_indices,
                limit,
                excess,
            });
        }
    }

    if let Some(limit) = max_number_of_regexp_rules.filter(|&limit| limit > 0) {
        let mut regexp_rules = 0usize;
        let mut excluded_rule_indices = Vec::new();

        declarative_rules.retain(|rule| {
            if !rule.is_regex() {
                return true;
            }
            regexp_rules += 1;
            if regexp_rules <= limit {
                return true;
            }
            excluded_rule_indices.extend(index.remove(rule.id));
            false
        });

        if regexp_rules > limit {
            let excess = regexp_rules - limit;
            warn!("Too many regexp rules: {} exceed the limit of {}", excess, limit);
            limitations.push(LimitationError::TooManyRegexpRules {
                excluded_rule_indices,
                limit,
                excess,
            });
        }
    }

    let mut source_map = Vec::new();
    let mut errors = Vec::new();
    for rule in &declarative_rules {
        source_map.extend(index.sources.remove(&rule.id).unwrap_or_default());
        errors.extend(index.errors.remove(&rule.id).unwrap_or_default());
    }
    errors.extend(untied_errors);

    ConversionResult {
        declarative_rules,
        source_map,
        errors,
        limitations,
    }
}
