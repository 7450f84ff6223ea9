//! `$badfilter` resolution across a whole conversion batch.

use dnr_core::rule::NetworkRule;

use crate::grouper::{GroupedFilter, RulesGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadfilterStats {
    pub badfilter_rules: usize,
    pub badfiltered_rules: usize,
}

/// Removes every rule negated by a `$badfilter` rule from any filter in the
/// batch, then empties the badfilter groups.
pub fn apply_badfilter(filters: &mut [GroupedFilter]) -> BadfilterStats {
    let badfilters: Vec<NetworkRule> = filters
        .iter_mut()
        .flat_map(|filter| filter.groups.take(RulesGroup::BadFilter))
        .map(|indexed| indexed.rule)
        .collect();

    let mut badfiltered_rules = 0usize;
    if !badfilters.is_empty() {
        for filter in filters.iter_mut() {
            for group in RulesGroup::ALL {
                filter.groups.get_mut(group).retain(|indexed| {
                    if badfilters.iter().any(|badfilter| badfilter.negates(&indexed.rule)) {
                        badfiltered_rules += 1;
                        return false;
                    }
                    true
                });
            }
        }
    }

    BadfilterStats {
        badfilter_rules: badfilters.len(),
        badfiltered_rules,
    }
}

#[cfg(test)]
mod tests {
    use dnr_core::rule::IndexedRule;

    use super::*;

    fn indexed(index: u32, pattern: &str, options: &[(&str, &str)]) -> IndexedRule {
        let rule = options
            .iter()
            .try_fold(NetworkRule::new(pattern, false), |rule, (name, value)| rule.with_option(name, value))
            .expect("valid rule");
        IndexedRule::new(index, rule)
    }

    fn indices(filter: &GroupedFilter, group: RulesGroup) -> Vec<u32> {
        filter.groups[group].iter().map(|r| r.source_rule_index).collect()
    }

    #[test]
    fn badfilter_applies_across_filters() {
        let mut filters = vec![
            GroupedFilter::new(
                1,
                vec![
                    indexed(0, "||ads.com^", &[]),
                    indexed(1, "||keep.com^", &[]),
                    indexed(2, "||ads.com^", &[("removeheader", "refresh")]),
                ],
            ),
            GroupedFilter::new(
                2,
                vec![
                    indexed(0, "||ads.com^", &[("badfilter", "")]),
                    indexed(1, "||ads.com^", &[("removeheader", "refresh"), ("badfilter", "")]),
                ],
            ),
        ];

        let stats = apply_badfilter(&mut filters);
        assert_eq!(
            stats,
            BadfilterStats {
                badfilter_rules: 2,
                badfiltered_rules: 2,
            }
        );

        assert_eq!(indices(&filters[0], RulesGroup::Regular), vec![1]);
        assert!(filters[0].groups[RulesGroup::RemoveHeader].is_empty());
        assert!(filters.iter().all(|f| f.groups[RulesGroup::BadFilter].is_empty()));
    }

    #[test]
    fn non_matching_badfilter_only_clears_itself() {
        let mut filters = vec![GroupedFilter::new(
            7,
            vec![
                indexed(0, "||ads.com^", &[("script", "")]),
                indexed(1, "||ads.com^", &[("badfilter", "")]),
            ],
        )];

        let stats = apply_badfilter(&mut filters);
        assert_eq!(stats.badfiltered_rules, 0);
        assert_eq!(indices(&filters[0], RulesGroup::Regular), vec![0]);
        assert!(filters[0].groups[RulesGroup::BadFilter].is_empty());
    }
}
