//! Filter rules to declarative rules.
//!
//! A run applies `$badfilter` across all filters, converts every filter's
//! groups in a fixed order with one id cursor for the whole batch, and then
//! trims the output to the configured limits.

use dnr_core::rule::IndexedRule;
use log::{debug, info};
use serde::Deserialize;

use crate::badfilter::apply_badfilter;
use crate::converters::{convert_group, ConvertedRules, ConverterContext};
use crate::grouper::{GroupedFilter, RulesGroup};
use crate::limits::{enforce_limitations, ConversionResult};

/// Declarative rule ids must be natural numbers.
pub const START_DECLARATIVE_RULE_ID: u32 = 1;

/// Options for a conversion run. All of them are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConverterOptions {
    /// Base path of bundled redirect resources, used by `$redirect` rules
    pub resources_path: Option<String>,
    /// Maximum number of declarative rules
    pub max_number_of_rules: Option<usize>,
    /// Maximum number of declarative rules with a regex filter
    pub max_number_of_regexp_rules: Option<usize>,
}

/// One filter's rules, in source order.
#[derive(Debug, Clone)]
pub struct FilterRules {
    pub filter_id: u32,
    pub rules: Vec<IndexedRule>,
}

impl FilterRules {
    pub fn new(filter_id: u32, rules: Vec<IndexedRule>) -> Self {
        Self { filter_id, rules }
    }
}

/// Converts filters into declarative rules.
///
/// Output ids start at [`START_DECLARATIVE_RULE_ID`] and increase without
/// gaps in filter order, then group order within each filter.
pub fn convert(filters: Vec<FilterRules>, options: &ConverterOptions) -> ConversionResult {
    let mut grouped: Vec<GroupedFilter> = filters
        .into_iter()
        .map(|filter| GroupedFilter::new(filter.filter_id, filter.rules))
        .collect();

    let stats = apply_badfilter(&mut grouped);
    if stats.badfilter_rules > 0 {
        debug!(
            "Applied {} badfilter rules, {} rules removed",
            stats.badfilter_rules, stats.badfiltered_rules
        );
    }

    let ctx = ConverterContext {
        resources_path: options.resources_path.as_deref(),
    };

    let mut converted = ConvertedRules::default();
    let mut next_id = START_DECLARATIVE_RULE_ID;

    for filter in &grouped {
        let first_id = next_id;
        for group in RulesGroup::ALL {
            let rules = filter.groups.get(group);
            let (group_converted, group_next_id) = convert_group(group, &ctx, filter.filter_id, rules, next_id);
            if !rules.is_empty() {
                debug!(
                    "Filter {} {:?}: {} rules -> {} declarative rules, {} errors",
                    filter.filter_id,
                    group,
                    rules.len(),
                    group_converted.declarative_rules.len(),
                    group_converted.errors.len()
                );
            }
            next_id = group_next_id;
            converted.append(group_converted);
        }
        debug!(
            "Filter {}: declarative ids {}..{}",
            filter.filter_id, first_id, next_id
        );
    }

    let result = enforce_limitations(
        converted,
        options.max_number_of_rules,
        options.max_number_of_regexp_rules,
    );

    info!(
        "Converted {} filters: {} declarative rules ({} regexp), {} errors, {} limitations",
        grouped.len(),
        result.declarative_rules.len(),
        result.regexp_rules_count(),
        result.errors.len(),
        result.limitations.len()
    );

    result
}

#[cfg(test)]
mod tests {
    use dnr_core::declarative::RuleActionType;
    use dnr_core::rule::NetworkRule;

    use super::*;

    fn indexed(index: u32, pattern: &str, options: &[(&str, &str)]) -> IndexedRule {
        let rule = options
            .iter()
            .try_fold(NetworkRule::new(pattern, false), |rule, (name, value)| rule.with_option(name, value))
            .expect("valid rule");
        IndexedRule::new(index, rule)
    }

    #[test]
    fn ids_continue_across_groups_and_filters() {
        let filters = vec![
            FilterRules::new(
                1,
                vec![
                    indexed(0, "||a.com^", &[("removeheader", "refresh")]),
                    indexed(1, "||b.com^", &[]),
                    indexed(2, "||c.com^", &[("csp", "frame-src 'none'")]),
                ],
            ),
            FilterRules::new(2, vec![indexed(0, "||d.com^", &[("removeparam", "utm_source")])]),
        ];

        let result = convert(filters, &ConverterOptions::default());
        let rules: Vec<(u32, RuleActionType)> = result
            .declarative_rules
            .iter()
            .map(|r| (r.id, r.action.action_type))
            .collect();
        assert_eq!(
            rules,
            vec![
                (1, RuleActionType::Block),
                (2, RuleActionType::ModifyHeaders),
                (3, RuleActionType::ModifyHeaders),
                (4, RuleActionType::Redirect),
            ]
        );

        let sources: Vec<(u32, u32, u32)> = result
            .source_map
            .iter()
            .map(|s| (s.filter_id, s.source_rule_index, s.declarative_rule_id))
            .collect();
        assert_eq!(sources, vec![(1, 1, 1), (1, 2, 2), (1, 0, 3), (2, 0, 4)]);
    }

    #[test]
    fn options_deserialize_from_camel_case() {
        let options: ConverterOptions =
            serde_json::from_str(r#"{ "resourcesPath": "/war", "maxNumberOfRegexpRules": 1000 }"#).unwrap();
        assert_eq!(
            options,
            ConverterOptions {
                resources_path: Some("/war".to_string()),
                max_number_of_rules: None,
                max_number_of_regexp_rules: Some(1000),
            }
        );
    }
}
