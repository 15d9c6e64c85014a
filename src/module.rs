//! # Module Data Model
//!
//! Domain types for the composition engine: [`ModuleDefinition`] and the
//! pieces it is built from: categories, file templates, merge strategies,
//! conditions and lifecycle hooks.
//!
//! Definitions are immutable once loaded: the registry constructs them during
//! discovery and everything downstream (resolver, generator) only reads them.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::GenerationContext;
use crate::error::Result;

/// Functional category of a module.
///
/// The category drives two resolution rules: singleton categories admit at
/// most one provider per stack, and the precedence rank breaks ties during
/// topological ordering (frontend framework first, `other` last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FrontendFramework,
    UiLibrary,
    BackendService,
    AuthProvider,
    Other,
}

impl Category {
    /// Whether at most one module of this category may appear in a stack.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            Category::FrontendFramework | Category::BackendService | Category::AuthProvider
        )
    }

    /// Tie-break rank for topological ordering; lower sorts earlier.
    pub fn precedence(&self) -> u8 {
        match self {
            Category::FrontendFramework => 0,
            Category::UiLibrary => 1,
            Category::BackendService => 2,
            Category::AuthProvider => 3,
            Category::Other => 4,
        }
    }

    /// The capability name implied by a singleton category. Two providers of
    /// the same singleton capability conflict even without a declared
    /// `conflicts-with`.
    pub fn singleton_capability(&self) -> Option<&'static str> {
        match self {
            Category::FrontendFramework => Some("frontend-framework"),
            Category::BackendService => Some("backend-service"),
            Category::AuthProvider => Some("auth-provider"),
            Category::UiLibrary | Category::Other => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FrontendFramework => "frontend-framework",
            Category::UiLibrary => "ui-library",
            Category::BackendService => "backend-service",
            Category::AuthProvider => "auth-provider",
            Category::Other => "other",
        }
    }

    /// Every category, in precedence order.
    pub fn all() -> [Category; 5] {
        [
            Category::FrontendFramework,
            Category::UiLibrary,
            Category::BackendService,
            Category::AuthProvider,
            Category::Other,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::all()
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
                format!("unknown category '{s}' (expected one of: {})", names.join(", "))
            })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a file contribution combines with content already present at its path.
///
/// A closed set, dispatched by variant rather than by string; `Custom`
/// carries a plain function value for embedders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Discard prior content; a warning is recorded when the discarded
    /// content differed.
    Replace,
    /// Concatenate after existing content.
    Append,
    /// Concatenate after existing content unless the exact block is already
    /// present byte-for-byte. Idempotent.
    AppendUnique,
    /// Place new content before existing content.
    Prepend,
    /// Parse both sides as JSON and merge recursively. Dependency-like keys
    /// union by package name; scalar collisions keep the later value with a
    /// warning.
    MergeJson,
    /// As `MergeJson` but only the top level is merged.
    MergeJsonShallow,
    /// Splice entries into a recognizable route-list skeleton
    /// (an exported array literal).
    MergeRoutes,
    /// Splice entries into a recognizable configuration-object skeleton
    /// (an exported object literal).
    MergeConfig,
    /// Module-supplied merge function.
    Custom(CustomMergeFn),
}

/// Signature of a module-supplied merge function: existing content (if any),
/// incoming rendered content, and the generation context.
pub type CustomMergeFn =
    fn(existing: Option<&str>, incoming: &str, context: &GenerationContext) -> Result<String>;

impl MergeStrategy {
    /// Parse a manifest strategy name. `Custom` has no manifest spelling;
    /// it can only be attached through the API.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "replace" => Some(MergeStrategy::Replace),
            "append" => Some(MergeStrategy::Append),
            "append-unique" => Some(MergeStrategy::AppendUnique),
            "prepend" => Some(MergeStrategy::Prepend),
            "merge-json" => Some(MergeStrategy::MergeJson),
            "merge-json-shallow" => Some(MergeStrategy::MergeJsonShallow),
            "merge-routes" => Some(MergeStrategy::MergeRoutes),
            "merge-config" => Some(MergeStrategy::MergeConfig),
            _ => None,
        }
    }

    /// Strategy names a manifest may use, for error hints.
    pub fn known_names() -> &'static [&'static str] {
        &[
            "replace",
            "append",
            "append-unique",
            "prepend",
            "merge-json",
            "merge-json-shallow",
            "merge-routes",
            "merge-config",
        ]
    }

    /// Default strategy for a target path when none was declared: `.json`
    /// files deep-merge, everything else replaces.
    pub fn infer_for_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => MergeStrategy::MergeJson,
            _ => MergeStrategy::Replace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Replace => "replace",
            MergeStrategy::Append => "append",
            MergeStrategy::AppendUnique => "append-unique",
            MergeStrategy::Prepend => "prepend",
            MergeStrategy::MergeJson => "merge-json",
            MergeStrategy::MergeJsonShallow => "merge-json-shallow",
            MergeStrategy::MergeRoutes => "merge-routes",
            MergeStrategy::MergeConfig => "merge-config",
            MergeStrategy::Custom(_) => "custom",
        }
    }
}

/// Declarative applicability check for a file template, evaluated against the
/// generation context's user options. No expression language; the closed set
/// of combinators below is all there is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    /// True when the option `key` equals `value` exactly.
    OptionEquals { key: String, value: String },
    /// True when the option `key` is present and truthy
    /// (not "", "false" or "no").
    OptionTruthy { key: String },
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate against a generation context.
    pub fn evaluate(&self, context: &GenerationContext) -> bool {
        match self {
            Condition::OptionEquals { key, value } => context.option(key) == Some(value.as_str()),
            Condition::OptionTruthy { key } => matches!(
                context.option(key),
                Some(v) if !v.is_empty() && v != "false" && v != "no"
            ),
            Condition::Not(inner) => !inner.evaluate(context),
            Condition::All(conds) => conds.iter().all(|c| c.evaluate(context)),
            Condition::Any(conds) => conds.iter().any(|c| c.evaluate(context)),
        }
    }
}

/// Where a template's content comes from.
///
/// Path sources are read eagerly during discovery (relative to the manifest's
/// directory), so by the time generation runs every source is in memory and
/// generation itself touches no input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Inline(String),
    /// Loaded from a file next to the manifest; the content is captured here,
    /// the path kept for diagnostics.
    Loaded { origin: PathBuf, content: String },
}

impl TemplateSource {
    pub fn content(&self) -> &str {
        match self {
            TemplateSource::Inline(s) => s,
            TemplateSource::Loaded { content, .. } => content,
        }
    }
}

/// One file contribution declared by a module.
#[derive(Debug, Clone)]
pub struct FileTemplate {
    /// Output path, relative to the target directory.
    pub target: PathBuf,
    pub source: TemplateSource,
    /// When true, the source is rendered through the template language before
    /// merging; otherwise it is used verbatim.
    pub is_template: bool,
    /// Explicit strategy, or `None` to infer from the target extension.
    pub merge: Option<MergeStrategy>,
    pub condition: Option<Condition>,
}

impl FileTemplate {
    /// The strategy that will actually be applied for this template.
    pub fn effective_strategy(&self) -> MergeStrategy {
        self.merge
            .unwrap_or_else(|| MergeStrategy::infer_for_path(&self.target))
    }
}

/// Lifecycle hook signature. Hooks run inside the generator, before or after
/// a module's templates are applied; the resolver never looks at them.
pub type LifecycleHook = fn(&mut GenerationContext) -> Result<()>;

/// Optional lifecycle hook slots for a module.
///
/// A fixed set of plain function slots, each invoked only if present. This
/// replaces any notion of probing a module for ad hoc methods.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleHooks {
    pub before_apply: Option<LifecycleHook>,
    pub after_apply: Option<LifecycleHook>,
}

/// An independently authored module: dependency declarations plus file
/// templates. Immutable after discovery.
#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    /// Globally unique key within a registry.
    pub name: String,
    pub version: semver::Version,
    pub category: Category,
    /// Abstract capabilities this module provides.
    pub provides: BTreeSet<String>,
    /// Capabilities or module names this module requires.
    pub requires: BTreeSet<String>,
    /// Module names this module cannot coexist with. Treated as symmetric
    /// during resolution even when the other side does not declare it back.
    pub conflicts_with: BTreeSet<String>,
    /// Tie-break weight for ordering; higher applies earlier among
    /// simultaneously ready modules.
    pub priority: i32,
    /// Entries this module contributes to the project's dependency manifest
    /// (package name -> version requirement).
    pub manifest_dependencies: BTreeMap<String, String>,
    /// File contributions, in declared order.
    pub templates: Vec<FileTemplate>,
    pub hooks: LifecycleHooks,
    /// Manifest file this definition was loaded from, for diagnostics.
    pub origin: PathBuf,
}

impl ModuleDefinition {
    /// Whether this module provides the given capability, either explicitly
    /// or implicitly through a singleton category.
    pub fn provides_capability(&self, capability: &str) -> bool {
        if self.provides.contains(capability) {
            return true;
        }
        self.category.singleton_capability() == Some(capability)
    }
}
