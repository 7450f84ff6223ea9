//! Block, allow and `$redirect` rules. Each source rule becomes exactly one
//! declarative rule.

use dnr_core::declarative::{Redirect, RuleAction, RuleActionType};
use dnr_core::modifiers::AdvancedModifier;
use dnr_core::rule::{IndexedRule, NetworkRule};

use super::common::{build_condition, priority, Emitter};
use super::{ConvertedRules, ConverterContext};

pub(crate) fn convert(
    ctx: &ConverterContext<'_>,
    filter_id: u32,
    rules: &[IndexedRule],
    start_id: u32,
) -> (ConvertedRules, u32) {
    let mut emitter = Emitter::new(filter_id, start_id);

    for indexed in rules {
        let rule = &indexed.rule;
        let converted = regular_action(ctx, rule).and_then(|action| build_condition(rule).map(|built| (action, built)));
        let (action, built) = match converted {
            Ok(converted) => converted,
            Err(reason) => {
                emitter.unsupported(indexed.source_rule_index, reason);
                continue;
            }
        };

        let note = built.degradation();
        let id = emitter.emit(priority(rule), action, built.condition, &[indexed.source_rule_index]);
        if let Some(note) = note {
            emitter.degraded(id, indexed.source_rule_index, note);
        }
    }

    emitter.finish()
}

fn regular_action(ctx: &ConverterContext<'_>, rule: &NetworkRule) -> Result<RuleAction, String> {
    match rule.advanced_modifier() {
        None if rule.is_allowlist() => Ok(RuleAction::simple(RuleActionType::Allow)),
        None => Ok(RuleAction::simple(RuleActionType::Block)),
        Some(AdvancedModifier::Redirect(_)) if rule.is_allowlist() => {
            Err("allowlist $redirect rules are not supported".to_string())
        }
        Some(AdvancedModifier::Redirect(redirect)) => {
            let resources_path = ctx
                .resources_path
                .ok_or_else(|| "no resources path configured for $redirect".to_string())?;
            Ok(RuleAction {
                action_type: RuleActionType::Redirect,
                redirect: Some(Redirect {
                    extension_path: Some(format!(
                        "{}/{}",
                        resources_path.trim_end_matches('/'),
                        redirect.resource()
                    )),
                    transform: None,
                }),
                request_headers: None,
                response_headers: None,
            })
        }
        Some(other) => Err(format!("${} is not a regular rule modifier", other.name())),
    }
}
