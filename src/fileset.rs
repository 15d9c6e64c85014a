//! In-memory generated file set with per-path contributor provenance.
//!
//! The generator stages every file here before anything touches disk. Paths
//! map to content plus the ordered list of modules that contributed to that
//! path; provenance feeds diagnostics and the flush-time refusal to clobber
//! files the engine does not manage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::Result;

/// One generated file: content plus contributor provenance.
#[derive(Debug, Clone, Default)]
pub struct FileEntry {
    /// Fully merged content.
    pub content: String,
    /// Names of the modules that contributed to this path, in application
    /// order. A module appears once even if it touched the path repeatedly.
    pub contributors: Vec<String>,
}

/// In-memory map of output paths to generated files.
///
/// Created fresh per generation run; `BTreeMap` keeps iteration (and thus
/// flush order and diagnostics) deterministic.
#[derive(Debug, Clone, Default)]
pub struct GeneratedFileSet {
    files: BTreeMap<PathBuf, FileEntry>,
}

impl GeneratedFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a path's content and credit `contributor`.
    pub fn put(&mut self, path: impl Into<PathBuf>, content: String, contributor: &str) {
        let entry = self.files.entry(path.into()).or_default();
        entry.content = content;
        if entry.contributors.last().map(String::as_str) != Some(contributor) {
            entry.contributors.push(contributor.to_string());
        }
    }

    /// Get a file by path.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&FileEntry> {
        self.files.get(path.as_ref())
    }

    /// Current content at a path, if any.
    pub fn content(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.get(path).map(|e| e.content.as_str())
    }

    /// Modules that contributed to a path, in application order.
    pub fn contributors(&self, path: impl AsRef<Path>) -> &[String] {
        self.get(path).map(|e| e.contributors.as_slice()).unwrap_or(&[])
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// All paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Iterate (path, entry) in sorted path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &FileEntry)> {
        self.files.iter().map(|(p, e)| (p.as_path(), e))
    }

    /// Paths matching a glob pattern, in sorted order.
    pub fn paths_matching(&self, pattern: &str) -> Result<Vec<&Path>> {
        let pattern = Pattern::new(pattern)?;
        Ok(self
            .files
            .keys()
            .filter(|path| path.to_str().is_some_and(|s| pattern.matches(s)))
            .map(PathBuf::as_path)
            .collect())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
