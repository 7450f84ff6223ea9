//! Per-group converters
//!
//! Each converter takes one filter's rules from a single group and the first
//! free declarative id, and returns the converted rules together with the
//! next free id. Ids are handed out densely: a merging converter spends one
//! id on many source rules, and a source rule that can not be converted
//! spends none.

mod bad_filter;
mod common;
mod csp;
mod regular;
mod remove_header;
mod remove_param;

use dnr_core::declarative::DeclarativeRule;
use dnr_core::rule::IndexedRule;

use crate::error::ConversionError;
use crate::grouper::RulesGroup;
use crate::source_map::Source;

/// Settings shared by all converters of one run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConverterContext<'a> {
    /// Base path of bundled redirect resources
    pub resources_path: Option<&'a str>,
}

/// Rules, source map and errors produced by one or more converters.
#[derive(Debug, Clone, Default)]
pub struct ConvertedRules {
    pub declarative_rules: Vec<DeclarativeRule>,
    pub source_map: Vec<Source>,
    pub errors: Vec<ConversionError>,
}

impl ConvertedRules {
    /// Appends `other`, keeping emission order.
    pub fn append(&mut self, other: ConvertedRules) {
        self.declarative_rules.extend(other.declarative_rules);
        self.source_map.extend(other.source_map);
        self.errors.extend(other.errors);
    }
}

/// Runs the converter for `group`. Returns the converted rules and the first
/// id left unused.
pub fn convert_group(
    group: RulesGroup,
    ctx: &ConverterContext<'_>,
    filter_id: u32,
    rules: &[IndexedRule],
    start_id: u32,
) -> (ConvertedRules, u32) {
    match group {
        RulesGroup::Regular => regular::convert(ctx, filter_id, rules, start_id),
        RulesGroup::Csp => csp::convert(ctx, filter_id, rules, start_id),
        RulesGroup::RemoveParam => remove_param::convert(ctx, filter_id, rules, start_id),
        RulesGroup::RemoveHeader => remove_header::convert(ctx, filter_id, rules, start_id),
        RulesGroup::BadFilter => bad_filter::convert(ctx, filter_id, rules, start_id),
    }
}
