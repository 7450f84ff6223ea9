use serde::Serialize;

/// Links a declarative rule back to one of the source rules it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub filter_id: u32,
    pub source_rule_index: u32,
    pub declarative_rule_id: u32,
}
