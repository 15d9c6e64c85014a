//! # Manifest Schema and Parsing
//!
//! The on-disk schema for `module.yaml` files and the logic that turns a
//! manifest into a validated [`ModuleDefinition`].
//!
//! A manifest declares identity (`name`, `version`, `category`), composition
//! metadata (`provides`, `requires`, `conflicts-with`, `priority`), the
//! entries the module contributes to the project's dependency manifest, and
//! its file templates. File template sources may be inline (`content:`) or a
//! path relative to the manifest's directory (`source:`); path sources are
//! read eagerly at load time so everything downstream is pure in-memory.
//!
//! Validation is strict about the fixed schema but produces hint-bearing
//! errors rather than bare messages, so a presentation layer can render
//! actionable guidance.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::module::{
    Category, Condition, FileTemplate, LifecycleHooks, MergeStrategy, ModuleDefinition,
    TemplateSource,
};
use crate::suggestions;

/// File name the registry scans for.
pub const MANIFEST_FILE: &str = "module.yaml";

/// Raw manifest as deserialized from YAML, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleManifest {
    pub name: String,
    pub version: String,
    pub category: Category,
    /// Tie-break weight; higher applies earlier among simultaneously ready
    /// modules.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub provides: Vec<String>,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default, rename = "conflicts-with")]
    pub conflicts_with: Vec<String>,
    /// Entries contributed to the project's dependency manifest.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// One file contribution as declared in the manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    /// Output path relative to the generated project root.
    pub target: String,
    /// Path to the template content, relative to the manifest's directory.
    /// Mutually exclusive with `content`.
    #[serde(default)]
    pub source: Option<String>,
    /// Inline template content. Mutually exclusive with `source`.
    #[serde(default)]
    pub content: Option<String>,
    /// Whether the content is rendered through the template language.
    #[serde(default)]
    pub template: bool,
    /// Merge strategy name; inferred from the target extension when omitted.
    #[serde(default)]
    pub merge: Option<String>,
    /// Applicability condition evaluated against user options.
    ///
    /// Conditions are written as single-key maps (`option-truthy: {...}`),
    /// which `serde_yaml` only accepts through `singleton_map_recursive`.
    #[serde(
        default,
        rename = "when",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub when: Option<Condition>,
}

/// Parse manifest YAML without touching the filesystem.
///
/// Used by `load` and directly by tests; template `source:` paths are not
/// resolved here.
pub fn parse(yaml: &str, origin: &Path) -> Result<ModuleManifest> {
    serde_yaml::from_str(yaml).map_err(|e| {
        let message = e.to_string();
        let hint = if message.contains("category") {
            Some(
                "valid categories: frontend-framework, ui-library, backend-service, auth-provider, other"
                    .to_string(),
            )
        } else {
            None
        };
        Error::ManifestParse {
            path: origin.to_path_buf(),
            message,
            hint,
        }
    })
}

/// Load and validate a manifest file into a [`ModuleDefinition`].
///
/// Template `source:` paths are resolved relative to the manifest's directory
/// and read eagerly; a missing source file fails the whole manifest.
pub fn load(path: &Path) -> Result<ModuleDefinition> {
    let yaml = fs::read_to_string(path).map_err(|e| Error::ManifestParse {
        path: path.to_path_buf(),
        message: format!("cannot read manifest: {}", e),
        hint: None,
    })?;
    let manifest = parse(&yaml, path)?;
    into_definition(manifest, path)
}

fn into_definition(manifest: ModuleManifest, path: &Path) -> Result<ModuleDefinition> {
    let fail = |message: String, hint: Option<String>| Error::ManifestParse {
        path: path.to_path_buf(),
        message,
        hint,
    };

    if manifest.name.trim().is_empty() {
        return Err(fail("'name' must not be empty".to_string(), None));
    }
    if manifest.name.contains(char::is_whitespace) {
        return Err(fail(
            format!("'name' must not contain whitespace: '{}'", manifest.name),
            Some("use kebab-case names like 'ui-kit'".to_string()),
        ));
    }

    let version = semver::Version::parse(&manifest.version).map_err(|e| {
        fail(
            format!("'version' is not valid semver: {}", e),
            Some("use a full semantic version like '1.2.0'".to_string()),
        )
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut templates = Vec::with_capacity(manifest.files.len());
    for entry in manifest.files {
        templates.push(load_file_entry(entry, base_dir, path)?);
    }

    Ok(ModuleDefinition {
        name: manifest.name,
        version,
        category: manifest.category,
        provides: manifest.provides.into_iter().collect(),
        requires: manifest.requires.into_iter().collect(),
        conflicts_with: manifest.conflicts_with.into_iter().collect(),
        priority: manifest.priority,
        manifest_dependencies: manifest.dependencies,
        templates,
        hooks: LifecycleHooks::default(),
        origin: path.to_path_buf(),
    })
}

fn load_file_entry(entry: FileEntry, base_dir: &Path, path: &Path) -> Result<FileTemplate> {
    let fail = |message: String, hint: Option<String>| Error::ManifestParse {
        path: path.to_path_buf(),
        message,
        hint,
    };

    let target = PathBuf::from(&entry.target);
    if target.is_absolute() {
        return Err(fail(
            format!("file target must be relative: '{}'", entry.target),
            None,
        ));
    }
    if target
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(fail(
            format!("file target must not escape the project root: '{}'", entry.target),
            None,
        ));
    }

    let source = match (entry.source, entry.content) {
        (Some(_), Some(_)) => {
            return Err(fail(
                format!("file '{}' declares both 'source' and 'content'", entry.target),
                Some("pick one: inline 'content' or a 'source' path".to_string()),
            ));
        }
        (None, None) => {
            return Err(fail(
                format!("file '{}' declares neither 'source' nor 'content'", entry.target),
                None,
            ));
        }
        (None, Some(content)) => TemplateSource::Inline(content),
        (Some(rel), None) => {
            let origin = base_dir.join(&rel);
            let content = fs::read_to_string(&origin).map_err(|e| {
                fail(
                    format!("cannot read template source '{}': {}", origin.display(), e),
                    None,
                )
            })?;
            TemplateSource::Loaded { origin, content }
        }
    };

    let merge = match entry.merge {
        None => None,
        Some(name) => Some(MergeStrategy::from_name(&name).ok_or_else(|| {
            fail(
                format!("unknown merge strategy '{}'", name),
                Some(suggestions::unknown_strategy_hint(&name)),
            )
        })?),
    };

    Ok(FileTemplate {
        target,
        source,
        is_template: entry.template,
        merge,
        condition: entry.when,
    })
}
