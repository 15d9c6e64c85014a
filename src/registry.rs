//! # Module Registry
//!
//! Discovery and indexing of module manifests.
//!
//! [`Registry::discover`] scans each search path recursively for
//! `module.yaml` files, loads and validates each one, and builds lookup
//! indices by name, category and capability. Discovery is
//! partial-failure-tolerant: a manifest that fails validation is skipped with
//! a recorded [`Warning`], and one bad module never aborts the registry.
//!
//! Search paths are scanned in parallel, but results are applied strictly in
//! search-path order (and lexicographic manifest order within a path), so the
//! "first registration wins" rule for duplicate names is deterministic no
//! matter how the parallel I/O completes.
//!
//! A registry is loaded once and read-only thereafter. There is no ambient
//! global instance; callers pass the registry into `resolve` and `generate`
//! explicitly, so tests can hold several independent registries.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::Warning;
use crate::manifest::{self, MANIFEST_FILE};
use crate::module::{Category, ModuleDefinition};

/// Immutable, indexed collection of module definitions.
#[derive(Debug, Default)]
pub struct Registry {
    modules: Vec<ModuleDefinition>,
    by_name: HashMap<String, usize>,
    by_category: BTreeMap<Category, Vec<usize>>,
    by_capability: BTreeMap<String, Vec<usize>>,
    warnings: Vec<Warning>,
}

impl Registry {
    /// Scan the given search paths for module manifests and build a registry.
    ///
    /// Paths are scanned in parallel; a search path that does not exist is
    /// skipped silently (configuration may list optional locations).
    pub fn discover(search_paths: &[PathBuf]) -> Registry {
        // Parallel I/O per search path; indexed so results can be applied in
        // path order afterwards.
        let mut scanned: Vec<(usize, Vec<LoadOutcome>)> = search_paths
            .par_iter()
            .enumerate()
            .map(|(idx, path)| (idx, scan_path(path)))
            .collect();
        scanned.sort_by_key(|(idx, _)| *idx);

        let mut registry = Registry::default();
        for (_, outcomes) in scanned {
            for outcome in outcomes {
                match outcome {
                    LoadOutcome::Loaded(def) => registry.insert(def),
                    LoadOutcome::Invalid { path, message } => {
                        warn!("skipping invalid manifest {}: {}", path.display(), message);
                        registry
                            .warnings
                            .push(Warning::InvalidManifest { path, message });
                    }
                }
            }
        }
        debug!(
            "discovered {} modules ({} warnings)",
            registry.modules.len(),
            registry.warnings.len()
        );
        registry
    }

    /// Build a registry from already-constructed definitions.
    ///
    /// The duplicate rule is the same as for discovery: first wins, the
    /// duplicate is recorded as a warning.
    pub fn from_definitions(definitions: Vec<ModuleDefinition>) -> Registry {
        let mut registry = Registry::default();
        for def in definitions {
            registry.insert(def);
        }
        registry
    }

    fn insert(&mut self, def: ModuleDefinition) {
        if let Some(&existing) = self.by_name.get(&def.name) {
            self.warnings.push(Warning::DuplicateModule {
                name: def.name.clone(),
                kept: self.modules[existing].origin.clone(),
                skipped: def.origin,
            });
            return;
        }

        let idx = self.modules.len();
        self.by_name.insert(def.name.clone(), idx);
        self.by_category.entry(def.category).or_default().push(idx);
        for capability in &def.provides {
            self.by_capability
                .entry(capability.clone())
                .or_default()
                .push(idx);
        }
        // Singleton categories imply their capability even when the manifest
        // does not spell it out.
        if let Some(implied) = def.category.singleton_capability() {
            if !def.provides.contains(implied) {
                self.by_capability
                    .entry(implied.to_string())
                    .or_default()
                    .push(idx);
            }
        }
        self.modules.push(def);
    }

    /// Look up a module by its unique name.
    pub fn get(&self, name: &str) -> Option<&ModuleDefinition> {
        self.by_name.get(name).map(|&idx| &self.modules[idx])
    }

    /// All modules in a category, in registration order.
    pub fn by_category(&self, category: Category) -> Vec<&ModuleDefinition> {
        self.by_category
            .get(&category)
            .map(|idxs| idxs.iter().map(|&i| &self.modules[i]).collect())
            .unwrap_or_default()
    }

    /// All modules providing a capability (declared or implied by a singleton
    /// category), in registration order.
    pub fn by_capability(&self, capability: &str) -> Vec<&ModuleDefinition> {
        self.by_capability
            .get(capability)
            .map(|idxs| idxs.iter().map(|&i| &self.modules[i]).collect())
            .unwrap_or_default()
    }

    /// Iterate all registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleDefinition> {
        self.modules.iter()
    }

    /// Iterate registered module names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }

    /// Warnings recorded during discovery (invalid manifests, duplicates).
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

enum LoadOutcome {
    Loaded(ModuleDefinition),
    Invalid { path: PathBuf, message: String },
}

/// Collect and load every manifest under one search path.
///
/// Manifest paths are sorted lexicographically so the within-path
/// registration order is stable.
fn scan_path(search_path: &Path) -> Vec<LoadOutcome> {
    if !search_path.exists() {
        debug!("search path does not exist, skipping: {}", search_path.display());
        return Vec::new();
    }

    let mut manifest_paths: Vec<PathBuf> = WalkDir::new(search_path)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                debug!("walk error under {}: {}", search_path.display(), err);
                None
            }
        })
        .filter(|e| e.file_type().is_file() && e.file_name() == MANIFEST_FILE)
        .map(|e| e.into_path())
        .collect();
    manifest_paths.sort();

    manifest_paths
        .into_iter()
        .map(|path| match manifest::load(&path) {
            Ok(def) => LoadOutcome::Loaded(def),
            Err(err) => LoadOutcome::Invalid {
                message: err.to_string(),
                path,
            },
        })
        .collect()
}
