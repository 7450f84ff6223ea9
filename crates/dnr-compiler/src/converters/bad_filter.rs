//! `$badfilter` rules are consumed before conversion, so this group is
//! always empty by the time it gets here.

use dnr_core::rule::IndexedRule;

use super::{ConvertedRules, ConverterContext};

pub(crate) fn convert(
    _ctx: &ConverterContext<'_>,
    _filter_id: u32,
    rules: &[IndexedRule],
    start_id: u32,
) -> (ConvertedRules, u32) {
    debug_assert!(rules.is_empty(), "badfilter rules must be resolved before conversion");
    (ConvertedRules::default(), start_id)
}
