//! JSON merge strategies
//!
//! Deep (`merge-json`) and shallow (`merge-json-shallow`) structured merges.
//! Both sides must parse as JSON; the result is re-serialized pretty-printed,
//! so a successful merge is re-parseable by construction.
//!
//! Dependency-like keys (`dependencies`, `devDependencies`,
//! `peerDependencies`, `optionalDependencies`) get union semantics: entries
//! are merged by package name, and when two modules pin different versions of
//! the same package the later module's version wins with a
//! [`Warning::VersionCollision`]. Array-valued dependency lists are
//! concatenated and de-duplicated by name.

use std::path::Path;

use serde_json::Value;

use super::MergeOutcome;
use crate::error::{Error, Result, Warning};

const DEPENDENCY_KEYS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// Merge `incoming` JSON into `existing` (deep or shallow).
pub fn merge(
    path: &Path,
    existing: Option<&str>,
    incoming: &str,
    deep: bool,
) -> Result<MergeOutcome> {
    let strategy = if deep { "merge-json" } else { "merge-json-shallow" };
    let parse = |side: &str, content: &str| -> Result<Value> {
        serde_json::from_str(content).map_err(|e| Error::Merge {
            path: path.to_path_buf(),
            strategy: strategy.to_string(),
            message: format!("{} content is not valid JSON: {}", side, e),
        })
    };

    let source = parse("incoming", incoming)?;
    let mut warnings = Vec::new();

    let merged = match existing {
        None => source,
        Some(old) => {
            let mut target = parse("existing", old)?;
            merge_values(&mut target, source, deep, false, path, &mut warnings);
            target
        }
    };

    let mut content = serde_json::to_string_pretty(&merged).map_err(|e| Error::Merge {
        path: path.to_path_buf(),
        strategy: strategy.to_string(),
        message: format!("cannot serialize merged value: {}", e),
    })?;
    content.push('\n');

    Ok(MergeOutcome { content, warnings })
}

/// Recursively merge `source` into `target`.
///
/// `dependency_scope` is true while inside a dependency-like object, where
/// scalar collisions warn instead of silently replacing.
fn merge_values(
    target: &mut Value,
    source: Value,
    deep: bool,
    dependency_scope: bool,
    path: &Path,
    warnings: &mut Vec<Warning>,
) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                let is_dependency_key = DEPENDENCY_KEYS.contains(&key.as_str());
                match target_map.get_mut(&key) {
                    None => {
                        target_map.insert(key, value);
                    }
                    Some(existing) => {
                        let both_objects = existing.is_object() && value.is_object();
                        let both_arrays = existing.is_array() && value.is_array();

                        if is_dependency_key && both_arrays {
                            merge_dependency_array(existing, value, path, warnings);
                        } else if both_objects && (deep || is_dependency_key) {
                            merge_values(
                                existing,
                                value,
                                deep,
                                dependency_scope || is_dependency_key,
                                path,
                                warnings,
                            );
                        } else {
                            if dependency_scope && existing != &value {
                                warnings.push(Warning::VersionCollision {
                                    path: path.to_path_buf(),
                                    key: key.clone(),
                                    kept: render_scalar(&value),
                                    discarded: render_scalar(existing),
                                });
                            }
                            *existing = value;
                        }
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Concatenate two dependency arrays, de-duplicating by entry name. For
/// object entries the `name` member is the key; for strings the value itself.
/// The later entry wins, with a warning when the replaced entry differed.
fn merge_dependency_array(
    target: &mut Value,
    source: Value,
    path: &Path,
    warnings: &mut Vec<Warning>,
) {
    let target_items = target.as_array_mut().expect("caller checked both_arrays");
    let Value::Array(source_items) = source else {
        unreachable!("caller checked both_arrays");
    };

    for item in source_items {
        let key = entry_name(&item);
        let duplicate = target_items
            .iter()
            .position(|existing| entry_name(existing) == key);
        match duplicate {
            None => target_items.push(item),
            Some(idx) => {
                if target_items[idx] != item {
                    warnings.push(Warning::VersionCollision {
                        path: path.to_path_buf(),
                        key,
                        kept: render_scalar(&item),
                        discarded: render_scalar(&target_items[idx]),
                    });
                    target_items[idx] = item;
                }
            }
        }
    }
}

/// De-duplication key for a dependency array entry.
fn entry_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
