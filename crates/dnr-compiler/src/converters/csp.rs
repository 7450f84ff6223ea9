//! `$csp` rules. Rules sharing a condition are merged into one rule that
//! appends all their policies to the response.

use dnr_core::declarative::{HeaderOperation, ModifyHeaderInfo, ResourceType, RuleAction, RuleActionType};
use dnr_core::modifiers::AdvancedModifier;
use dnr_core::rule::IndexedRule;

use super::common::{build_condition, dedup_in_order, priority, Emitter, MergeBuckets};
use super::{ConvertedRules, ConverterContext};

const CSP_HEADER: &str = "content-security-policy";

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
        let Some(AdvancedModifier::Csp(csp)) = rule.advanced_modifier() else {
            emitter.unsupported(indexed.source_rule_index, "expected a $csp rule");
            continue;
        };
        if rule.is_allowlist() {
            emitter.unsupported(indexed.source_rule_index, "allowlist $csp rules are not supported");
            continue;
        }

        let mut built = match build_condition(rule) {
            Ok(built) => built,
            Err(reason) => {
                emitter.unsupported(indexed.source_rule_index, reason);
                continue;
            }
        };
        // Policies only apply to documents.
        if built.condition.resource_types.is_none() {
            built.condition.resource_types = Some(vec![ResourceType::MainFrame, ResourceType::SubFrame]);
        }

        buckets.push(built, priority(rule), csp.value().to_string(), indexed.source_rule_index);
    }

    for bucket in buckets.into_buckets() {
        let policy = dedup_in_order(bucket.items.iter().map(String::as_str)).join("; ");
        let action = RuleAction {
            action_type: RuleActionType::ModifyHeaders,
            redirect: None,
            request_headers: None,
            response_headers: Some(vec![ModifyHeaderInfo {
                header: CSP_HEADER.to_string(),
                operation: HeaderOperation::Append,
                value: Some(policy),
            }]),
        };
        emitter.emit_bucket(&bucket, action);
    }

    emitter.finish()
}
