//! # Error Suggestions
//!
//! Helper functions for generating helpful error messages with hints.
//! Errors should tell users what went wrong AND how to fix it: unknown
//! module names get a did-you-mean candidate, empty registries point at the
//! search paths that were scanned.

use std::path::Path;

use crate::module::MergeStrategy;

/// Generate an error for when discovery found no modules at all.
///
/// Includes the scanned search paths and hints about configuring them.
pub fn no_modules_found(search_paths: &[impl AsRef<Path>]) -> anyhow::Error {
    let scanned = search_paths
        .iter()
        .map(|p| format!("  {}", p.as_ref().display()))
        .collect::<Vec<_>>()
        .join("\n");
    anyhow::anyhow!(
        "No modules found in any search path\n\
         scanned:\n{scanned}\n\n\
         hint: Each module lives in its own directory containing a module.yaml\n\
         hint: Add search paths with --module-path or STACKFORGE_MODULE_PATH"
    )
}

/// Generate an error for when `new` is invoked without any module selection.
pub fn empty_selection() -> anyhow::Error {
    anyhow::anyhow!(
        "No modules selected\n\n\
         hint: Pass one or more --module <NAME> flags\n\
         hint: Run 'stackforge list' to see available modules"
    )
}

/// Build a hint for an unknown merge strategy name in a manifest.
///
/// Lists the valid strategies and suggests a close match when one exists.
pub fn unknown_strategy_hint(name: &str) -> String {
    let valid = MergeStrategy::known_names();
    let did_you_mean = find_similar(name, valid.iter().copied())
        .map(|s| format!("did you mean '{s}'? "))
        .unwrap_or_default();
    format!("{}valid strategies are: {}", did_you_mean, valid.join(", "))
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
pub fn find_similar<'a>(
    input: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_modules_found_lists_paths() {
        let error = no_modules_found(&[Path::new("./modules"), Path::new("/etc/stackforge")]);
        let message = error.to_string();

        assert!(message.contains("No modules found"));
        assert!(message.contains("./modules"));
        assert!(message.contains("/etc/stackforge"));
        assert!(message.contains("hint:"));
        assert!(message.contains("STACKFORGE_MODULE_PATH"));
    }

    #[test]
    fn test_empty_selection_includes_hints() {
        let error = empty_selection();
        let message = error.to_string();

        assert!(message.contains("No modules selected"));
        assert!(message.contains("--module"));
        assert!(message.contains("stackforge list"));
    }

    #[test]
    fn test_unknown_strategy_hint_suggests_similar() {
        let hint = unknown_strategy_hint("apend");
        assert!(hint.contains("did you mean 'append'?"));
        assert!(hint.contains("valid strategies are:"));
    }

    #[test]
    fn test_unknown_strategy_hint_no_suggestion_for_very_different() {
        let hint = unknown_strategy_hint("zzzzzzzz");
        assert!(!hint.contains("did you mean"));
        assert!(hint.contains("valid strategies are:"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("append", "append"), 0);
        assert_eq!(edit_distance("apend", "append"), 1);
        assert_eq!(edit_distance("prepend", "append"), 3);
        assert_eq!(edit_distance("foobar", "append"), 6);
    }

    #[test]
    fn test_find_similar() {
        let candidates = ["react", "vue", "svelte"];

        assert_eq!(
            find_similar("reactt", candidates.iter().copied()),
            Some("react")
        );
        assert_eq!(find_similar("veu", candidates.iter().copied()), Some("vue"));
        assert_eq!(find_similar("angular", candidates.iter().copied()), None);
    }
}
