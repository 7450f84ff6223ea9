//! Loading pre-parsed filter rules from JSON.
//!
//! Each input file holds an array of filters:
//!
//! ```json
//! [{ "filterId": 1, "rules": [
//!     { "index": 0, "pattern": "||ads.example.com^", "options": ["third-party"] },
//!     { "index": 4, "pattern": "||example.org^", "options": ["removeheader=refresh"] }
//! ] }]
//! ```

use std::fs;
use std::path::Path;

use dnr_compiler::{ConverterOptions, FilterRules};
use dnr_core::rule::{IndexedRule, NetworkRule};
use dnr_core::RuleError;
use log::warn;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilterInput {
    filter_id: u32,
    rules: Vec<RuleInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleInput {
    index: u32,
    pattern: String,
    #[serde(default)]
    allowlist: bool,
    /// `name` or `name=value`
    #[serde(default)]
    options: Vec<String>,
}

impl RuleInput {
    fn build(&self) -> Result<NetworkRule, RuleError> {
        self.options
            .iter()
            .try_fold(NetworkRule::new(&self.pattern, self.allowlist), |rule, option| {
                let (name, value) = option.split_once('=').unwrap_or((option.as_str(), ""));
                rule.with_option(name, value)
            })
    }
}

pub struct LoadedFilters {
    pub filters: Vec<FilterRules>,
    pub total_rules: usize,
    pub skipped_rules: usize,
}

/// Reads every input file in order. Rules whose options fail to construct
/// are left out and logged.
pub fn load_filters(inputs: &[String]) -> Result<LoadedFilters, String> {
    if inputs.is_empty() {
        return Err("No input files specified".to_string());
    }

    let mut filters = Vec::new();
    let mut total_rules = 0usize;
    let mut skipped_rules = 0usize;

    for path in inputs {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
        let parsed: Vec<FilterInput> = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse '{}': {}", path, e))?;

        for filter in parsed {
            total_rules += filter.rules.len();
            let mut rules = Vec::with_capacity(filter.rules.len());
            for input in &filter.rules {
                match input.build() {
                    Ok(rule) => rules.push(IndexedRule::new(input.index, rule)),
                    Err(e) => {
                        skipped_rules += 1;
                        warn!(
                            "Skipping rule {} of filter {} ({}): {}",
                            input.index, filter.filter_id, input.pattern, e
                        );
                    }
                }
            }
            filters.push(FilterRules::new(filter.filter_id, rules));
        }
    }

    Ok(LoadedFilters {
        filters,
        total_rules,
        skipped_rules,
    })
}

pub fn load_options(path: Option<&str>) -> Result<ConverterOptions, String> {
    let Some(path) = path else {
        return Ok(ConverterOptions::default());
    };
    let content = fs::read_to_string(Path::new(path))
        .map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    serde_json::from_str(&content).map_err(|e| format!("Invalid config '{}': {}", path, e))
}
