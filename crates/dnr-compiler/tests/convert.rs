use dnr_compiler::{convert, ConverterOptions, FilterRules, LimitationError};
use dnr_core::declarative::RuleActionType;
use dnr_core::rule::{IndexedRule, NetworkRule};

fn indexed(index: u32, pattern: &str, options: &[(&str, &str)]) -> IndexedRule {
    let rule = options
        .iter()
        .try_fold(NetworkRule::new(pattern, false), |rule, (name, value)| rule.with_option(name, value))
        .expect("valid rule");
    IndexedRule::new(index, rule)
}

fn plain_rules(count: u32) -> Vec<IndexedRule> {
    (0..count).map(|i| indexed(i, &format!("||ads{i}.example.com^"), &[])).collect()
}

fn regex_rules(count: u32) -> Vec<IndexedRule> {
    (0..count).map(|i| indexed(i, &format!("/banner{i}[0-9]+/"), &[])).collect()
}

fn options(max_rules: Option<usize>, max_regexp_rules: Option<usize>) -> ConverterOptions {
    ConverterOptions {
        resources_path: Some("/redirects".to_string()),
        max_number_of_rules: max_rules,
        max_number_of_regexp_rules: max_regexp_rules,
    }
}

fn assert_consistent(result: &dnr_compiler::ConversionResult) {
    let ids: Vec<u32> = result.declarative_rules.iter().map(|r| r.id).collect();
    for source in &result.source_map {
        assert!(ids.contains(&source.declarative_rule_id), "dangling source {source:?}");
    }
    for error in &result.errors {
        if let Some(id) = error.declarative_rule_id() {
            assert!(ids.contains(&id), "dangling error {error:?}");
        }
    }
}

#[test]
fn ids_are_dense_and_start_at_one() {
    let filters = vec![
        FilterRules::new(
            1,
            vec![
                indexed(0, "||a.com^", &[]),
                indexed(1, "||b.com^", &[("redirect", "noopjs")]),
                indexed(2, "/(x)\\1/", &[]),
                indexed(3, "||c.com^", &[("removeheader", "content-type")]),
                indexed(4, "||c.com^", &[("removeheader", "refresh")]),
            ],
        ),
        FilterRules::new(2, vec![]),
        FilterRules::new(3, vec![indexed(0, "||d.com^", &[("csp", "frame-src 'none'")])]),
    ];

    let result = convert(filters, &ConverterOptions::default());
    let ids: Vec<u32> = result.declarative_rules.iter().map(|r| r.id).collect();
    assert_eq!(ids, (1..=ids.len() as u32).collect::<Vec<_>>());
    assert_eq!(ids.len(), 3);
    // Missing resource path, backreference and forbidden header.
    assert_eq!(result.errors.len(), 3);
    assert_consistent(&result);
}

#[test]
fn badfilter_from_another_filter_removes_rule() {
    let filters = vec![
        FilterRules::new(
            1,
            vec![
                indexed(0, "||ads.com^", &[("script", "")]),
                indexed(1, "||keep.com^", &[]),
            ],
        ),
        FilterRules::new(2, vec![indexed(7, "||ads.com^", &[("script", ""), ("badfilter", "")])]),
    ];

    let result = convert(filters, &ConverterOptions::default());
    assert_eq!(result.declarative_rules.len(), 1);
    assert_eq!(result.declarative_rules[0].id, 1);
    assert_eq!(
        result.declarative_rules[0].condition.url_filter.as_deref(),
        Some("||keep.com^")
    );

    assert_eq!(result.source_map.len(), 1);
    assert_eq!(result.source_map[0].filter_id, 1);
    assert_eq!(result.source_map[0].source_rule_index, 1);
    assert!(!result.source_map.iter().any(|s| s.filter_id == 2));
}

#[test]
fn total_limit_keeps_first_rules() {
    let filters = vec![FilterRules::new(1, plain_rules(120))];

    let result = convert(filters, &options(Some(100), None));
    assert_eq!(result.declarative_rules.len(), 100);
    assert_eq!(result.declarative_rules.last().map(|r| r.id), Some(100));
    assert_eq!(result.source_map.len(), 100);
    assert_eq!(result.limitations.len(), 1);

    match &result.limitations[0] {
        LimitationError::TooManyRules {
            excluded_rule_indices,
            limit,
            excess,
        } => {
            assert_eq!(*limit, 100);
            assert_eq!(*excess, 20);
            assert_eq!(excluded_rule_indices, &(100..120).collect::<Vec<u32>>());
        }
        other => panic!("unexpected limitation {other:?}"),
    }
    assert_consistent(&result);
}

#[test]
fn regexp_limit_across_filters() {
    let filters = vec![
        FilterRules::new(1, plain_rules(150)),
        FilterRules::new(2, regex_rules(10)),
    ];

    let result = convert(filters, &options(None, Some(5)));
    assert_eq!(result.declarative_rules.len(), 155);
    assert_eq!(result.regexp_rules_count(), 5);

    let kept_regex: Vec<u32> = result
        .declarative_rules
        .iter()
        .filter(|r| r.is_regex())
        .map(|r| r.id)
        .collect();
    assert_eq!(kept_regex, vec![151, 152, 153, 154, 155]);

    assert_eq!(result.limitations.len(), 1);
    match &result.limitations[0] {
        LimitationError::TooManyRegexpRules {
            excluded_rule_indices,
            limit,
            excess,
        } => {
            assert_eq!(*limit, 5);
            assert_eq!(*excess, 5);
            assert_eq!(excluded_rule_indices, &vec![5, 6, 7, 8, 9]);
        }
        other => panic!("unexpected limitation {other:?}"),
    }
    assert_consistent(&result);
}

#[test]
fn regexp_limit_keeps_later_plain_rules() {
    let mut rules = regex_rules(4);
    rules.extend((10..13).map(|i| indexed(i, &format!("||tail{i}.com^"), &[])));
    let filters = vec![FilterRules::new(1, rules)];

    let result = convert(filters, &options(None, Some(2)));
    let regex_count = result.regexp_rules_count();
    assert_eq!(regex_count, 2);
    assert_eq!(result.declarative_rules.len(), 5);
    assert!(result
        .declarative_rules
        .iter()
        .rev()
        .take(3)
        .all(|r| r.action.action_type == RuleActionType::Block && !r.is_regex()));
}

#[test]
fn both_limits_report_separately() {
    let filters = vec![
        FilterRules::new(1, regex_rules(6)),
        FilterRules::new(2, plain_rules(6)),
    ];

    let result = convert(filters, &options(Some(8), Some(3)));
    assert_eq!(result.limitations.len(), 2);
    assert_eq!(result.limitations[0].excess(), 4);
    assert_eq!(result.limitations[1].excess(), 3);
    assert_eq!(result.declarative_rules.len(), 5);
    assert_eq!(result.regexp_rules_count(), 3);
    assert_consistent(&result);
}

#[test]
fn truncating_merged_rule_reports_every_source() {
    let filters = vec![
        FilterRules::new(1, plain_rules(2)),
        FilterRules::new(
            2,
            vec![
                indexed(4, "||t.com^", &[("removeheader", "refresh")]),
                indexed(5, "||t.com^", &[("removeheader", "request:x-client-data")]),
            ],
        ),
    ];

    let result = convert(filters, &options(Some(2), None));
    assert_eq!(result.declarative_rules.len(), 2);
    assert_eq!(result.limitations[0].excluded_rule_indices(), [4, 5]);
    assert_eq!(result.limitations[0].excess(), 1);
    assert!(result.source_map.iter().all(|s| s.filter_id == 1));
}

#[test]
fn output_serializes_as_engine_rules() {
    let filters = vec![FilterRules::new(
        1,
        vec![indexed(0, "||ads.com/script.js", &[("redirect", "noopjs"), ("third-party", "")])],
    )];

    let result = convert(filters, &options(None, None));
    let json = serde_json::to_value(&result.declarative_rules).expect("serializable");
    assert_eq!(
        json,
        serde_json::json!([{
            "id": 1,
            "priority": 1,
            "action": {
                "type": "redirect",
                "redirect": { "extensionPath": "/redirects/noopjs" }
            },
            "condition": {
                "urlFilter": "||ads.com/script.js",
                "domainType": "thirdParty"
            }
        }])
    );
}
