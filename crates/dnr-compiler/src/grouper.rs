//! Splits a filter's rules into groups by modifier kind.

use std::ops::Index;

use dnr_core::modifiers::AdvancedModifier;
use dnr_core::rule::{IndexedRule, NetworkRule};

/// Group of rules handled by one converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesGroup {
    Regular = 0,
    Csp = 1,
    RemoveParam = 2,
    RemoveHeader = 3,
    BadFilter = 4,
}

impl RulesGroup {
    /// Conversion order.
    pub const ALL: [RulesGroup; 5] = [
        RulesGroup::Regular,
        RulesGroup::Csp,
        RulesGroup::RemoveParam,
        RulesGroup::RemoveHeader,
        RulesGroup::BadFilter,
    ];

    /// Group a rule belongs to. `$badfilter` wins over any modifier, and
    /// `$redirect` rules stay regular.
    pub fn of(rule: &NetworkRule) -> Self {
        if rule.is_badfilter() {
            return Self::BadFilter;
        }

        match rule.advanced_modifier() {
            Some(AdvancedModifier::Csp(_)) => Self::Csp,
            Some(AdvancedModifier::RemoveParam(_)) => Self::RemoveParam,
            Some(AdvancedModifier::RemoveHeader(_)) => Self::RemoveHeader,
            Some(AdvancedModifier::Redirect(_)) | None => Self::Regular,
        }
    }
}

/// One filter's rules partitioned by group, each in source order.
#[derive(Debug, Clone, Default)]
pub struct GroupedRules {
    groups: [Vec<IndexedRule>; 5],
}

impl GroupedRules {
    pub fn split(rules: Vec<IndexedRule>) -> Self {
        let mut grouped = Self::default();
        for rule in rules {
            grouped.groups[RulesGroup::of(&rule.rule) as usize].push(rule);
        }
        grouped
    }

    pub fn get(&self, group: RulesGroup) -> &[IndexedRule] {
        &self.groups[group as usize]
    }

    pub(crate) fn get_mut(&mut self, group: RulesGroup) -> &mut Vec<IndexedRule> {
        &mut self.groups[group as usize]
    }

    /// Move a group's rules out, leaving it empty.
    pub fn take(&mut self, group: RulesGroup) -> Vec<IndexedRule> {
        std::mem::take(&mut self.groups[group as usize])
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

impl Index<RulesGroup> for GroupedRules {
    type Output = [IndexedRule];

    fn index(&self, group: RulesGroup) -> &Self::Output {
        self.get(group)
    }
}

/// A filter id with its grouped rules.
#[derive(Debug, Clone)]
pub struct GroupedFilter {
    pub filter_id: u32,
    pub groups: GroupedRules,
}

impl GroupedFilter {
    pub fn new(filter_id: u32, rules: Vec<IndexedRule>) -> Self {
        Self {
            filter_id,
            groups: GroupedRules::split(rules),
        }
    }
}
