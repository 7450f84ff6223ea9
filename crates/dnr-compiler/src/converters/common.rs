//! Helpers shared by the group converters: condition building, priorities,
//! id allocation and merging of rules with identical conditions.

use std::collections::HashMap;

use dnr_core::declarative::{DeclarativeRule, DomainType, RuleAction, RuleCondition};
use dnr_core::rule::NetworkRule;
use dnr_core::types::NetworkRuleOption;

use super::ConvertedRules;
use crate::error::ConversionError;
use crate::source_map::Source;

pub(crate) const BASE_PRIORITY: u32 = 1;
pub(crate) const ALLOWLIST_PRIORITY: u32 = 100;
pub(crate) const IMPORTANT_PRIORITY: u32 = 10_000;

/// Priority of the declarative rule produced from `rule`.
///
/// More specific rules win over generic ones, exceptions over blocks, and
/// `$important` over everything else of the same kind.
pub(crate) fn priority(rule: &NetworkRule) -> u32 {
    let mut priority = BASE_PRIORITY;
    if !rule.permitted_domains().is_empty() {
        priority += 1;
    }
    if !rule.permitted_request_types().is_empty() {
        priority += 1;
    }
    if rule.is_allowlist() {
        priority += ALLOWLIST_PRIORITY;
    }
    if rule.is_option_enabled(NetworkRuleOption::IMPORTANT) {
        priority += IMPORTANT_PRIORITY;
    }
    priority
}

/// Condition built from a rule, plus permitted domains that had to be left
/// out because the engine can not express them.
#[derive(Debug)]
pub(crate) struct BuiltCondition {
    pub condition: RuleCondition,
    pub dropped_domains: Vec<String>,
}

impl BuiltCondition {
    pub fn degradation(&self) -> Option<String> {
        if self.dropped_domains.is_empty() {
            None
        } else {
            Some(format!("unsupported domains dropped: {}", self.dropped_domains.join(", ")))
        }
    }
}

/// `example.*` matches any public suffix; the engine has no equivalent.
fn is_wildcard_tld(domain: &str) -> bool {
    domain.ends_with(".*")
}

pub(crate) fn build_condition(rule: &NetworkRule) -> Result<BuiltCondition, String> {
    let mut condition = RuleCondition::default();
    let pattern = rule.pattern();

    if rule.is_regex_pattern() {
        let source = &pattern[1..pattern.len() - 1];
        regex::Regex::new(source).map_err(|e| format!("unsupported regular expression: {e}"))?;
        condition.regex_filter = Some(source.to_string());
    } else if !pattern.is_empty() && pattern != "*" {
        if !pattern.is_ascii() {
            return Err("url filter must be ASCII".to_string());
        }
        if pattern.starts_with("||*") {
            return Err("url filter can not start with ||*".to_string());
        }
        condition.url_filter = Some(pattern.to_string());
    }

    if rule.is_option_enabled(NetworkRuleOption::MATCH_CASE) {
        condition.is_url_filter_case_sensitive = Some(true);
    }

    let (dropped_domains, permitted): (Vec<String>, Vec<String>) = rule
        .permitted_domains()
        .iter()
        .cloned()
        .partition(|domain| is_wildcard_tld(domain));
    if !rule.permitted_domains().is_empty() {
        if permitted.is_empty() {
            return Err("none of the permitted domains are supported".to_string());
        }
        condition.initiator_domains = Some(permitted);
    }

    if let Some(domain) = rule.restricted_domains().iter().find(|d| is_wildcard_tld(d)) {
        return Err(format!("unsupported restricted domain: {domain}"));
    }
    if !rule.restricted_domains().is_empty() {
        condition.excluded_initiator_domains = Some(rule.restricted_domains().to_vec());
    }

    let third_party = rule.is_option_enabled(NetworkRuleOption::THIRD_PARTY);
    let first_party = rule.is_option_enabled(NetworkRuleOption::FIRST_PARTY);
    condition.domain_type = match (third_party, first_party) {
        (true, false) => Some(DomainType::ThirdParty),
        (false, true) => Some(DomainType::FirstParty),
        _ => None,
    };

    let permitted_types = rule.permitted_request_types();
    let restricted_types = rule.restricted_request_types();
    if !permitted_types.is_empty() {
        let types = permitted_types.difference(restricted_types).resource_types();
        if types.is_empty() {
            return Err("rule matches no resource types".to_string());
        }
        condition.resource_types = Some(types);
    } else if !restricted_types.is_empty() {
        condition.excluded_resource_types = Some(restricted_types.resource_types());
    }

    Ok(BuiltCondition { condition, dropped_domains })
}

/// Hands out ids and records rules, source map entries and errors for one
/// converter call.
pub(crate) struct Emitter {
    filter_id: u32,
    next_id: u32,
    converted: ConvertedRules,
}

impl Emitter {
    pub fn new(filter_id: u32, start_id: u32) -> Self {
        Self {
            filter_id,
            next_id: start_id,
            converted: ConvertedRules::default(),
        }
    }

    /// Records a declarative rule produced from `sources` and returns its id.
    pub fn emit(&mut self, priority: u32, action: RuleAction, condition: RuleCondition, sources: &[u32]) -> u32 {
        let id = self.next_id;
        let filter_id = self.filter_id;
        self.next_id += 1;

        self.converted.declarative_rules.push(DeclarativeRule {
            id,
            priority,
            action,
            condition,
        });
        self.converted
            .source_map
            .extend(sources.iter().map(|&source_rule_index| Source {
                filter_id,
                source_rule_index,
                declarative_rule_id: id,
            }));

        id
    }

    /// Emits one rule for a merged bucket and ties its notes to the new id.
    pub fn emit_bucket<T>(&mut self, bucket: &Bucket<T>, action: RuleAction) -> u32 {
        let id = self.emit(bucket.priority, action, bucket.condition.clone(), &bucket.sources);
        for (source_rule_index, reason) in &bucket.notes {
            self.degraded(id, *source_rule_index, reason.clone());
        }
        id
    }

    pub fn unsupported(&mut self, source_rule_index: u32, reason: impl Into<String>) {
        self.converted.errors.push(ConversionError::Unsupported {
            filter_id: self.filter_id,
            source_rule_index,
            reason: reason.into(),
        });
    }

    pub fn degraded(&mut self, declarative_rule_id: u32, source_rule_index: u32, reason: impl Into<String>) {
        self.converted.errors.push(ConversionError::Degraded {
            declarative_rule_id,
            filter_id: self.filter_id,
            source_rule_index,
            reason: reason.into(),
        });
    }

    /// Returns the converted rules and the first id left unused.
    pub fn finish(self) -> (ConvertedRules, u32) {
        (self.converted, self.next_id)
    }
}

/// Source rules that share one condition and priority.
pub(crate) struct Bucket<T> {
    pub condition: RuleCondition,
    pub priority: u32,
    pub items: Vec<T>,
    pub sources: Vec<u32>,
    pub notes: Vec<(u32, String)>,
}

/// Collects source rules into buckets keyed by condition and priority,
/// keeping buckets in order of first appearance.
pub(crate) struct MergeBuckets<T> {
    index: HashMap<(RuleCondition, u32), usize>,
    buckets: Vec<Bucket<T>>,
}

impl<T> MergeBuckets<T> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    pub fn push(&mut self, built: BuiltCondition, priority: u32, item: T, source_rule_index: u32) {
        let note = built.degradation();
        let key = (built.condition, priority);

        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.buckets.len();
                self.buckets.push(Bucket {
                    condition: key.0.clone(),
                    priority,
                    items: Vec::new(),
                    sources: Vec::new(),
                    notes: Vec::new(),
                });
                self.index.insert(key, slot);
                slot
            }
        };

        let bucket = &mut self.buckets[slot];
        bucket.items.push(item);
        bucket.sources.push(source_rule_index);
        if let Some(note) = note {
            bucket.notes.push((source_rule_index, note));
        }
    }

    pub fn into_buckets(self) -> Vec<Bucket<T>> {
        self.buckets
    }
}

/// Keeps the first occurrence of each value.
pub(crate) fn dedup_in_order<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.iter().any(|s: &String| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
