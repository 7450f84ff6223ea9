//! Network rule model
//!
//! A [`NetworkRule`] is the already-parsed form of one filter list line. The
//! textual grammar lives upstream; this module only validates what individual
//! options and modifiers need to check.

use crate::error::RuleError;
use crate::modifiers::AdvancedModifier;
use crate::types::{NetworkRuleOption, RequestType};

/// A parsed network rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NetworkRule {
    pattern: String,
    allowlist: bool,
    options: NetworkRuleOption,
    /// Sorted and deduplicated
    permitted_domains: Vec<String>,
    /// Sorted and deduplicated
    restricted_domains: Vec<String>,
    permitted_request_types: RequestType,
    restricted_request_types: RequestType,
    advanced_modifier: Option<AdvancedModifier>,
}

impl NetworkRule {
    /// Create a rule with no options. `pattern` is the URL part of the rule,
    /// without the `@@` prefix and without the `$options` suffix.
    pub fn new(pattern: &str, allowlist: bool) -> Self {
        Self {
            pattern: pattern.to_string(),
            allowlist,
            options: NetworkRuleOption::empty(),
            permitted_domains: Vec::new(),
            restricted_domains: Vec::new(),
            permitted_request_types: RequestType::empty(),
            restricted_request_types: RequestType::empty(),
            advanced_modifier: None,
        }
    }

    /// Apply one `$option`, given as its name and (possibly empty) value.
    pub fn with_option(mut self, name: &str, value: &str) -> Result<Self, RuleError> {
        let name = name.trim().to_ascii_lowercase();

        if let Some(option) = NetworkRuleOption::from_option_name(&name) {
            self.options |= option;
            return Ok(self);
        }

        if name == "domain" {
            self.add_domains(value);
            return Ok(self);
        }

        let (negated, type_name) = match name.strip_prefix('~') {
            Some(rest) => (true, rest),
            None => (false, name.as_str()),
        };
        if let Some(request_type) = RequestType::from_option_name(type_name) {
            if negated {
                self.restricted_request_types |= request_type;
            } else {
                self.permitted_request_types |= request_type;
            }
            return Ok(self);
        }

        match AdvancedModifier::parse(&name, value, self.allowlist)? {
            Some(modifier) => self.with_modifier(modifier),
            None => Err(RuleError::UnknownOption(name)),
        }
    }

    /// Attach an advanced modifier. A rule carries at most one.
    pub fn with_modifier(mut self, modifier: AdvancedModifier) -> Result<Self, RuleError> {
        if let Some(existing) = &self.advanced_modifier {
            return Err(RuleError::ConflictingModifiers {
                first: existing.name(),
                second: modifier.name(),
            });
        }
        self.advanced_modifier = Some(modifier);
        Ok(self)
    }

    fn add_domains(&mut self, value: &str) {
        for raw in value.split('|') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match raw.strip_prefix('~') {
                Some(domain) => self.restricted_domains.push(domain.to_ascii_lowercase()),
                None => self.permitted_domains.push(raw.to_ascii_lowercase()),
            }
        }
        self.permitted_domains.sort();
        self.permitted_domains.dedup();
        self.restricted_domains.sort();
        self.restricted_domains.dedup();
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_allowlist(&self) -> bool {
        self.allowlist
    }

    pub fn options(&self) -> NetworkRuleOption {
        self.options
    }

    pub fn is_option_enabled(&self, option: NetworkRuleOption) -> bool {
        self.options.contains(option)
    }

    pub fn is_badfilter(&self) -> bool {
        self.is_option_enabled(NetworkRuleOption::BADFILTER)
    }

    /// `/.../` patterns are regular expressions.
    pub fn is_regex_pattern(&self) -> bool {
        self.pattern.len() > 2 && self.pattern.starts_with('/') && self.pattern.ends_with('/')
    }

    pub fn permitted_domains(&self) -> &[String] {
        &self.permitted_domains
    }

    pub fn restricted_domains(&self) -> &[String] {
        &self.restricted_domains
    }

    pub fn permitted_request_types(&self) -> RequestType {
        self.permitted_request_types
    }

    pub fn restricted_request_types(&self) -> RequestType {
        self.restricted_request_types
    }

    pub fn advanced_modifier(&self) -> Option<&AdvancedModifier> {
        self.advanced_modifier.as_ref()
    }

    /// Returns true if `self` is a `$badfilter` rule that disables `other`.
    ///
    /// The two rules must be identical apart from the badfilter option itself.
    pub fn negates(&self, other: &NetworkRule) -> bool {
        if !self.is_badfilter() {
            return false;
        }

        self.allowlist == other.allowlist
            && self.pattern == other.pattern
            && self.options.difference(NetworkRuleOption::BADFILTER) == other.options
            && self.permitted_request_types == other.permitted_request_types
            && self.restricted_request_types == other.restricted_request_types
            && self.permitted_domains == other.permitted_domains
            && self.restricted_domains == other.restricted_domains
            && self.advanced_modifier == other.advanced_modifier
    }
}

/// A rule paired with its position in the source filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedRule {
    pub source_rule_index: u32,
    pub rule: NetworkRule,
}

impl IndexedRule {
    pub fn new(source_rule_index: u32, rule: NetworkRule) -> Self {
        Self { source_rule_index, rule }
    }
}
