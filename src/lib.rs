//! # stackforge
//!
//! A module-composition engine for project scaffolding. Instead of fixed
//! monolithic project templates, independently authored modules (frameworks,
//! UI libraries, backends, auth providers, tooling) declare their file
//! templates and their relationships, and the engine composes any
//! compatible selection into a working project.
//!
//! The pipeline:
//!
//! 1. [`registry`] discovers `module.yaml` manifests on the search paths and
//!    indexes them by name, category and capability.
//! 2. [`resolver`] expands a selection to its transitive requirements,
//!    rejects conflicts and cycles, and orders the result deterministically.
//! 3. [`generator`] renders each module's templates ([`template`]) and folds
//!    contributions to the same path through merge strategies ([`merge`]),
//!    staging everything in an in-memory [`fileset::GeneratedFileSet`].
//! 4. [`flush`] writes the validated set to the target directory, guarded by
//!    an advisory lock and a refusal to clobber unmanaged files.
//!
//! Nothing touches disk until generation has succeeded end to end, so a
//! failing module leaves the target directory exactly as it was.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//! use stackforge::context::GenerationContext;
//! use stackforge::flush::{flush, FlushOptions};
//! use stackforge::registry::Registry;
//!
//! # fn main() -> stackforge::error::Result<()> {
//! let registry = Registry::discover(&[PathBuf::from("./modules")]);
//! let stack = stackforge::resolver::resolve(
//!     &["frame-a".to_string(), "ui-kit".to_string()],
//!     &registry,
//! )?;
//! let mut context = GenerationContext::new("my-app", "./my-app", BTreeMap::new());
//! let output = stackforge::generator::generate(&stack, &mut context)?;
//! flush(&output.files, &context.target_dir, &FlushOptions::default())?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod fileset;
pub mod flush;
pub mod generator;
pub mod manifest;
pub mod merge;
pub mod module;
pub mod output;
pub mod registry;
pub mod resolver;
pub mod suggestions;
pub mod template;

pub use error::{Error, Result, Warning};
