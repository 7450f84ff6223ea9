//! `$removeparam` rules. Plain parameter names sharing a condition are merged
//! into one query transform; an empty value strips the whole query and
//! subsumes every name merged with it.

use dnr_core::declarative::{QueryTransform, Redirect, RuleAction, RuleActionType, UrlTransform};
use dnr_core::modifiers::{AdvancedModifier, RemoveParamKind};
use dnr_core::rule::IndexedRule;

use super::common::{build_condition, dedup_in_order, priority, Emitter, MergeBuckets};
use super::{ConvertedRules, ConverterContext};

pub(crate) fn convert(
    _ctx: &ConverterContext<'_>,
    filter_id: u32,
    rules: &[IndexedRule],
    start_id: u32,
) -> (ConvertedRules, u32) {
    let mut emitter = Emitter::new(filter_id, start_id);
    let mut buckets = MergeBuckets::new();

    for indexed in rules {
        let rule = &indexed.rule;
        let Some(AdvancedModifier::RemoveParam(modifier)) = rule.advanced_modifier() else {
            emitter.unsupported(indexed.source_rule_index, "expected a $removeparam rule");
            continue;
        };
        if rule.is_allowlist() {
            emitter.unsupported(indexed.source_rule_index, "allowlist $removeparam rules are not supported");
            continue;
        }

        let param = match modifier.kind() {
            RemoveParamKind::All => None,
            RemoveParamKind::Name(name) => Some(name.to_string()),
            RemoveParamKind::Inverted(_) => {
                emitter.unsupported(indexed.source_rule_index, "inverted $removeparam values are not supported");
                continue;
            }
            RemoveParamKind::Regex(_) => {
                emitter.unsupported(indexed.source_rule_index, "regexp $removeparam values are not supported");
                continue;
            }
        };

        match build_condition(rule) {
            Ok(built) => buckets.push(built, priority(rule), param, indexed.source_rule_index),
            Err(reason) => emitter.unsupported(indexed.source_rule_index, reason),
        }
    }

    for bucket in buckets.into_buckets() {
        let transform = if bucket.items.iter().any(Option::is_none) {
            UrlTransform {
                query: Some(String::new()),
                query_transform: None,
            }
        } else {
            UrlTransform {
                query: None,
                query_transform: Some(QueryTransform {
                    remove_params: dedup_in_order(bucket.items.iter().flatten().map(String::as_str)),
                }),
            }
        };

        let action = RuleAction {
            action_type: RuleActionType::Redirect,
            redirect: Some(Redirect {
                extension_path: None,
                transform: Some(transform),
            }),
            request_headers: None,
            response_headers: None,
        };
        emitter.emit_bucket(&bucket, action);
    }

    emitter.finish()
}
