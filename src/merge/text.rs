//! Plain-text merge strategies: replace, append, append-unique and prepend.
//!
//! Concatenating strategies guarantee a newline boundary between blocks so a
//! file missing its trailing newline does not glue two contributions onto one
//! line. `append_unique` is idempotent: the insert is skipped when the exact
//! block is already present byte-for-byte.

use std::path::Path;

use log::debug;

use super::MergeOutcome;
use crate::error::Warning;

/// Discard prior content. Silent divergence is suspicious, so replacing
/// different prior content records a warning naming both contributors.
pub fn replace(
    path: &Path,
    existing: Option<&str>,
    incoming: &str,
    previous: Option<&str>,
    contributor: &str,
) -> MergeOutcome {
    let mut warnings = Vec::new();
    if let Some(old) = existing {
        if old != incoming {
            debug!("replace divergence at {}", path.display());
            warnings.push(Warning::ReplacedContent {
                path: path.to_path_buf(),
                previous: previous.unwrap_or("existing file").to_string(),
                by: contributor.to_string(),
            });
        }
    }
    MergeOutcome {
        content: incoming.to_string(),
        warnings,
    }
}

/// Concatenate after existing content.
pub fn append(existing: Option<&str>, incoming: &str) -> String {
    match existing {
        None => incoming.to_string(),
        Some(old) if old.is_empty() => incoming.to_string(),
        Some(old) => {
            let mut out = String::with_capacity(old.len() + incoming.len() + 1);
            out.push_str(old);
            if !old.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(incoming);
            out
        }
    }
}

/// As [`append`], but a no-op when the exact block is already present.
pub fn append_unique(existing: Option<&str>, incoming: &str) -> String {
    if let Some(old) = existing {
        if old.contains(incoming) {
            return old.to_string();
        }
    }
    append(existing, incoming)
}

/// Place new content before existing content.
pub fn prepend(existing: Option<&str>, incoming: &str) -> String {
    match existing {
        None => incoming.to_string(),
        Some(old) if old.is_empty() => incoming.to_string(),
        Some(old) => {
            let mut out = String::with_capacity(old.len() + incoming.len() + 1);
            out.push_str(incoming);
            if !incoming.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(old);
            out
        }
    }
}
