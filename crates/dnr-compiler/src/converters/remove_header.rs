//! `$removeheader` rules. Rules sharing a condition are merged into one
//! `modifyHeaders` rule that removes every listed request and response
//! header.

use dnr_core::declarative::{HeaderOperation, ModifyHeaderInfo, RuleAction, RuleActionType};
use dnr_core::modifiers::{AdvancedModifier, RemoveHeaderModifier};
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
    let mut buckets: MergeBuckets<&RemoveHeaderModifier> = MergeBuckets::new();

    for indexed in rules {
        let rule = &indexed.rule;
        let Some(AdvancedModifier::RemoveHeader(modifier)) = rule.advanced_modifier() else {
            emitter.unsupported(indexed.source_rule_index, "expected a $removeheader rule");
            continue;
        };
        if rule.is_allowlist() {
            emitter.unsupported(indexed.source_rule_index, "allowlist $removeheader rules are not supported");
            continue;
        }
        if !modifier.is_valid() {
            emitter.unsupported(
                indexed.source_rule_index,
                format!("header can not be removed: {}", modifier.value()),
            );
            continue;
        }
        if modifier.applicable_name(true).is_none() && modifier.applicable_name(false).is_none() {
            emitter.unsupported(indexed.source_rule_index, "empty header name");
            continue;
        }

        match build_condition(rule) {
            Ok(built) => buckets.push(built, priority(rule), modifier, indexed.source_rule_index),
            Err(reason) => emitter.unsupported(indexed.source_rule_index, reason),
        }
    }

    for bucket in buckets.into_buckets() {
        let request_headers = removals(&bucket.items, true);
        let response_headers = removals(&bucket.items, false);
        let action = RuleAction {
            action_type: RuleActionType::ModifyHeaders,
            redirect: None,
            request_headers,
            response_headers,
        };
        emitter.emit_bucket(&bucket, action);
    }

    emitter.finish()
}

fn removals(modifiers: &[&RemoveHeaderModifier], for_request_headers: bool) -> Option<Vec<ModifyHeaderInfo>> {
    let names = dedup_in_order(modifiers.iter().filter_map(|m| m.applicable_name(for_request_headers)));
    if names.is_empty() {
        return None;
    }

    Some(
        names
            .into_iter()
            .map(|header| ModifyHeaderInfo {
                header,
                operation: HeaderOperation::Remove,
                value: None,
            })
            .collect(),
    )
}
