//! Merge operations combining multiple modules' contributions to one path
//!
//! Per output path, content is a left fold over ordered module
//! contributions: `content_n = merge(content_{n-1}, render(module_n),
//! strategy)`, with `content_0` being whatever (if anything) already existed
//! on disk. Each strategy lives in a submodule:
//!
//! - `text`: replace / append / append-unique / prepend
//! - `json`: deep and shallow structured merges
//! - `structural`: splicing into route-list and config-object skeletons
//!
//! Dispatch is over the closed [`MergeStrategy`] enum; the `Custom` variant
//! calls the module-supplied function.

pub mod json;
pub mod structural;
pub mod text;

use std::path::Path;

use crate::context::GenerationContext;
use crate::error::{Result, Warning};
use crate::module::MergeStrategy;

/// Result of one merge step: the new content plus any advisory warnings.
#[derive(Debug)]
pub struct MergeOutcome {
    pub content: String,
    pub warnings: Vec<Warning>,
}

impl MergeOutcome {
    fn clean(content: String) -> Self {
        Self {
            content,
            warnings: Vec::new(),
        }
    }
}

/// Apply one contribution to the current content for `path`.
///
/// `previous` names the last contributor (or the pre-existing file) for
/// replace warnings; `contributor` is the module being applied.
pub fn apply(
    strategy: MergeStrategy,
    path: &Path,
    existing: Option<&str>,
    incoming: &str,
    previous: Option<&str>,
    contributor: &str,
    context: &GenerationContext,
) -> Result<MergeOutcome> {
    match strategy {
        MergeStrategy::Replace => Ok(text::replace(path, existing, incoming, previous, contributor)),
        MergeStrategy::Append => Ok(MergeOutcome::clean(text::append(existing, incoming))),
        MergeStrategy::AppendUnique => {
            Ok(MergeOutcome::clean(text::append_unique(existing, incoming)))
        }
        MergeStrategy::Prepend => Ok(MergeOutcome::clean(text::prepend(existing, incoming))),
        MergeStrategy::MergeJson => json::merge(path, existing, incoming, true),
        MergeStrategy::MergeJsonShallow => json::merge(path, existing, incoming, false),
        MergeStrategy::MergeRoutes => {
            structural::merge_array(path, existing, incoming).map(MergeOutcome::clean)
        }
        MergeStrategy::MergeConfig => {
            structural::merge_object(path, existing, incoming).map(MergeOutcome::clean)
        }
        MergeStrategy::Custom(f) => f(existing, incoming, context).map(MergeOutcome::clean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn ctx() -> GenerationContext {
        GenerationContext::new("app", "/tmp/out", BTreeMap::new())
    }

    #[test]
    fn test_dispatch_custom_strategy() {
        fn shouty(
            existing: Option<&str>,
            incoming: &str,
            _context: &GenerationContext,
        ) -> Result<String> {
            Ok(format!(
                "{}{}",
                existing.unwrap_or_default(),
                incoming.to_uppercase()
            ))
        }

        let outcome = apply(
            MergeStrategy::Custom(shouty),
            &PathBuf::from("x.txt"),
            Some("pre-"),
            "loud",
            None,
            "m",
            &ctx(),
        )
        .unwrap();
        assert_eq!(outcome.content, "pre-LOUD");
    }

    #[test]
    fn test_dispatch_replace_records_warning_on_divergence() {
        let outcome = apply(
            MergeStrategy::Replace,
            &PathBuf::from("x.txt"),
            Some("old"),
            "new",
            Some("frame-a"),
            "ui-kit",
            &ctx(),
        )
        .unwrap();
        assert_eq!(outcome.content, "new");
        assert_eq!(outcome.warnings.len(), 1);
    }
}
