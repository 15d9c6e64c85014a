//! Per-run generation context: project parameters, user options and the
//! variable bindings visible to template rendering.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A value bound to a template variable.
///
/// The template language is deliberately small, so the value space is too:
/// strings, booleans, lists of strings and flat string maps. `{{#each}}`
/// iterates lists and maps; `{{#if}}` tests truthiness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VarValue {
    Str(String),
    Bool(bool),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl VarValue {
    /// Truthiness as used by `{{#if}}`: false, empty string, empty list and
    /// empty map are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            VarValue::Bool(b) => *b,
            VarValue::Str(s) => !s.is_empty() && s != "false" && s != "no",
            VarValue::List(items) => !items.is_empty(),
            VarValue::Map(entries) => !entries.is_empty(),
        }
    }

    /// Scalar rendering for `{{var}}` positions. Lists and maps have no
    /// scalar form.
    pub fn as_scalar(&self) -> Option<String> {
        match self {
            VarValue::Str(s) => Some(s.clone()),
            VarValue::Bool(b) => Some(b.to_string()),
            VarValue::List(_) | VarValue::Map(_) => None,
        }
    }
}

impl From<&str> for VarValue {
    fn from(s: &str) -> Self {
        VarValue::Str(s.to_string())
    }
}

impl From<String> for VarValue {
    fn from(s: String) -> Self {
        VarValue::Str(s)
    }
}

impl From<bool> for VarValue {
    fn from(b: bool) -> Self {
        VarValue::Bool(b)
    }
}

/// Parameters and variable bindings for one "build a project" request.
///
/// Created fresh per generation run and discarded afterwards. `variables`
/// starts from `project_name` plus every user option, and modules may read
/// any of them from their templates and conditions.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Name of the project being generated, bound as `{{project_name}}`.
    pub project_name: String,
    /// Directory the flushed file set lands in.
    pub target_dir: PathBuf,
    /// Free-form key/value selections from the selection front-end
    /// (e.g. "strict_typing" -> "yes").
    pub user_options: BTreeMap<String, String>,
    /// Variables available to template rendering.
    pub variables: BTreeMap<String, VarValue>,
}

impl GenerationContext {
    /// Create a context with `project_name` and all user options pre-bound as
    /// variables.
    pub fn new(
        project_name: impl Into<String>,
        target_dir: impl Into<PathBuf>,
        user_options: BTreeMap<String, String>,
    ) -> Self {
        let project_name = project_name.into();
        let mut variables: BTreeMap<String, VarValue> = BTreeMap::new();
        variables.insert(
            "project_name".to_string(),
            VarValue::Str(project_name.clone()),
        );
        for (key, value) in &user_options {
            variables.insert(key.clone(), VarValue::Str(value.clone()));
        }
        Self {
            project_name,
            target_dir: target_dir.into(),
            user_options,
            variables,
        }
    }

    /// Bind or replace a variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<VarValue>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&VarValue> {
        self.variables.get(name)
    }

    /// Look up a user option by key.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.user_options.get(key).map(String::as_str)
    }
}
