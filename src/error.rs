//! # Error Handling
//!
//! Centralized error handling for the composition engine, built on
//! `thiserror`. Errors are structured values carrying enough identifying data
//! (module names, conflicting pairs, cycle paths) for a presentation layer to
//! render actionable guidance; they are never reduced to bare strings inside
//! the engine.
//!
//! The taxonomy follows the engine's three stages:
//!
//! - **Load-time**: per-manifest validation problems are *not* errors at the
//!   registry level: discovery is partial-failure-tolerant and records them
//!   as [`Warning`]s. `ManifestParse` exists for callers that parse a single
//!   manifest directly.
//! - **Resolution-time**: `UnknownModules`, `Conflicts`, `CircularDependency`
//!   and `MissingRequirements` are fatal to that resolution call and are
//!   collected exhaustively (all unknown names, all conflicting pairs) rather
//!   than failing on the first.
//! - **Generation-time**: render/merge/validation failures abort the whole
//!   generation; `UnmanagedFiles` and `GenerationInProgress` protect the
//!   target directory during flush.
//!
//! [`Warning`] is the non-fatal counterpart: advisories that must be surfaced
//! to the caller but never abort an operation.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for stackforge operations
#[derive(Error, Debug)]
pub enum Error {
    /// A module manifest could not be parsed or failed schema validation.
    ///
    /// Includes the manifest path and optionally a hint about how to fix it.
    #[error("Manifest error in {path}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ManifestParse {
        path: PathBuf,
        message: String,
        /// Optional hint for how to fix the manifest
        hint: Option<String>,
    },

    /// One or more selected module names do not exist in the registry.
    ///
    /// All unknown names are collected before this error is raised, so the
    /// caller sees the full picture at once. Each entry may carry a
    /// did-you-mean suggestion.
    #[error("Unknown module{}: {}", if names.len() == 1 { "" } else { "s" }, format_unknown(names))]
    UnknownModules { names: Vec<UnknownName> },

    /// Capabilities or modules required by the selection that cannot be
    /// satisfied.
    ///
    /// Expansion runs to its fixed point first, so every requirement that is
    /// still unsatisfiable or ambiguous is collected before this error is
    /// raised.
    #[error("Missing requirement{}:{}", if requirements.len() == 1 { "" } else { "s" }, format_missing(requirements))]
    MissingRequirements {
        requirements: Vec<MissingRequirement>,
    },

    /// The expanded selection contains mutually exclusive modules.
    ///
    /// Every conflicting pair is collected, not just the first.
    #[error("Conflicting modules:{}", pairs.iter().map(|p| format!("\n  {} <-> {}: {}", p.a, p.b, p.reason)).collect::<String>())]
    Conflicts { pairs: Vec<ConflictPair> },

    /// A cycle was detected in the `requires` graph of the working set.
    #[error("Circular dependency: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    /// An error occurred while rendering a file template.
    ///
    /// May include the name of the problematic variable when applicable.
    #[error("Template error in {path}: {message}{}", variable.as_ref().map(|v| format!(" (variable: {})", v)).unwrap_or_default())]
    Template {
        path: PathBuf,
        message: String,
        /// The template variable that caused the error, if applicable
        variable: Option<String>,
    },

    /// An error occurred while merging two contributions to the same path.
    #[error("Merge error for {path} ({strategy}): {message}")]
    Merge {
        path: PathBuf,
        strategy: String,
        message: String,
    },

    /// Post-merge validation of the generated file set failed.
    #[error("Generated file set failed validation: {path}: {message}")]
    Validation { path: PathBuf, message: String },

    /// The target directory contains files the engine did not stage.
    ///
    /// Raised during flush unless overwriting was explicitly allowed,
    /// protecting hand-authored content during a retrofit-style run.
    #[error("Target contains unmanaged files that would be overwritten:{}\n  hint: re-run with overwrite enabled to replace them", paths.iter().map(|p| format!("\n  {}", p.display())).collect::<String>())]
    UnmanagedFiles { paths: Vec<PathBuf> },

    /// Another generation run holds the advisory lock on the target.
    #[error("Generation already in progress for {target} (lock held by {holder})")]
    GenerationInProgress { target: PathBuf, holder: String },

    /// An error occurred with a filesystem operation.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON parsing error, wrapped from `serde_json::Error`.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A semantic versioning parsing error, wrapped from `semver::Error`.
    #[error("Semver parsing error: {0}")]
    Semver(#[from] semver::Error),
}

/// An unknown module name together with an optional suggestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownName {
    pub name: String,
    pub suggestion: Option<String>,
}

/// One unsatisfiable `requires` entry and the module that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingRequirement {
    pub requirement: String,
    pub needed_by: String,
    pub hint: Option<String>,
}

/// A pair of modules that cannot coexist in one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPair {
    pub a: String,
    pub b: String,
    pub reason: String,
}

fn format_missing(requirements: &[MissingRequirement]) -> String {
    requirements
        .iter()
        .map(|m| {
            let mut line = format!("\n  '{}' (needed by {})", m.requirement, m.needed_by);
            if let Some(hint) = &m.hint {
                line.push_str(&format!("\n    hint: {}", hint));
            }
            line
        })
        .collect()
}

fn format_unknown(names: &[UnknownName]) -> String {
    names
        .iter()
        .map(|u| match &u.suggestion {
            Some(s) => format!("'{}' (did you mean '{}'?)", u.name, s),
            None => format!("'{}'", u.name),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Non-fatal advisories produced by discovery, resolution and generation.
///
/// Warnings are always surfaced to the caller and never abort an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A manifest failed validation and was skipped during discovery.
    InvalidManifest { path: PathBuf, message: String },
    /// A later manifest redeclared an already-registered module name.
    /// First registration wins.
    DuplicateModule {
        name: String,
        kept: PathBuf,
        skipped: PathBuf,
    },
    /// A `replace` merge discarded differing prior content for a path.
    ReplacedContent {
        path: PathBuf,
        previous: String,
        by: String,
    },
    /// A JSON merge kept the later module's value for a colliding scalar key.
    VersionCollision {
        path: PathBuf,
        key: String,
        kept: String,
        discarded: String,
    },
    /// A compatibility advisory from the resolver, e.g. a UI library selected
    /// with no frontend framework in the stack.
    Compatibility { message: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::InvalidManifest { path, message } => {
                write!(f, "invalid manifest {}: {}", path.display(), message)
            }
            Warning::DuplicateModule { name, kept, skipped } => write!(
                f,
                "duplicate module '{}': keeping {}, skipping {}",
                name,
                kept.display(),
                skipped.display()
            ),
            Warning::ReplacedContent { path, previous, by } => write!(
                f,
                "{}: content from '{}' replaced by '{}'",
                path.display(),
                previous,
                by
            ),
            Warning::VersionCollision {
                path,
                key,
                kept,
                discarded,
            } => write!(
                f,
                "{}: '{}' version collision, kept '{}' over '{}'",
                path.display(),
                key,
                kept,
                discarded
            ),
            Warning::Compatibility { message } => write!(f, "{}", message),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
