use std::fs;
use std::path::Path;

use dnr_compiler::{ConversionError, ConversionResult, LimitationError, Source};
use dnr_core::DeclarativeRule;
use serde::Serialize;

/// Everything needed to trace declarative rules back to filter rules.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SourceMapFile<'a> {
    source_map: &'a [Source],
    errors: &'a [ConversionError],
    limitations: &'a [LimitationError],
}

/// Writes the rule set and returns its size in bytes.
pub fn write_rule_set(path: &str, rules: &[DeclarativeRule]) -> Result<usize, String> {
    let bytes = serde_json::to_vec_pretty(rules)
        .map_err(|e| format!("Failed to serialize rule set: {}", e))?;
    write_file(Path::new(path), &bytes)?;
    Ok(bytes.len())
}

pub fn write_source_map(path: &str, result: &ConversionResult) -> Result<(), String> {
    let file = SourceMapFile {
        source_map: &result.source_map,
        errors: &result.errors,
        limitations: &result.limitations,
    };
    let bytes = serde_json::to_vec_pretty(&file)
        .map_err(|e| format!("Failed to serialize source map: {}", e))?;
    write_file(Path::new(path), &bytes)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    fs::write(path, bytes)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}
