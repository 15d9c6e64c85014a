//! # Template Generator
//!
//! Applies a resolved stack's file templates to an in-memory
//! [`GeneratedFileSet`], in stack order, merging each contribution with
//! whatever earlier modules (or the pre-existing file on disk) put at the
//! same path.
//!
//! Per output path, content is a left fold over ordered contributions:
//! `content_n = merge(content_{n-1}, render(module_n), strategy)`, with
//! `content_0` seeded from the target directory when the file already exists
//! there (retrofit runs merge into, rather than ignore, existing files;
//! flush still refuses to overwrite them without explicit consent).
//!
//! After all modules are applied the whole set is validated: every
//! JSON-like file must re-parse and no residual template syntax may remain
//! anywhere. A validation failure aborts the entire generation; nothing has
//! touched disk at that point.

use std::fs;

use log::{debug, trace};

use crate::context::GenerationContext;
use crate::error::{Error, Result, Warning};
use crate::fileset::GeneratedFileSet;
use crate::merge;
use crate::module::{MergeStrategy, ModuleDefinition};
use crate::resolver::ResolvedStack;
use crate::template;

/// The outcome of a generation run: the staged file set plus advisory
/// warnings (replaced content, version collisions).
#[derive(Debug)]
pub struct GenerationOutput {
    pub files: GeneratedFileSet,
    pub warnings: Vec<Warning>,
}

/// Apply every module of the stack, in order, and validate the result.
///
/// The context is mutable because lifecycle hooks may bind additional
/// variables for later modules.
pub fn generate(
    stack: &ResolvedStack,
    context: &mut GenerationContext,
) -> Result<GenerationOutput> {
    let mut files = GeneratedFileSet::new();
    let mut warnings = Vec::new();

    for module in stack.ordered_modules() {
        debug!("applying module '{}'", module.name);
        if let Some(hook) = module.hooks.before_apply {
            hook(context)?;
        }
        apply_module(module, context, &mut files, &mut warnings)?;
        if let Some(hook) = module.hooks.after_apply {
            hook(context)?;
        }
    }

    validate(&files)?;
    Ok(GenerationOutput { files, warnings })
}

fn apply_module(
    module: &ModuleDefinition,
    context: &GenerationContext,
    files: &mut GeneratedFileSet,
    warnings: &mut Vec<Warning>,
) -> Result<()> {
    for file_template in &module.templates {
        if let Some(condition) = &file_template.condition {
            if !condition.evaluate(context) {
                trace!(
                    "skipping {} for '{}': condition is false",
                    file_template.target.display(),
                    module.name
                );
                continue;
            }
        }

        let rendered = if file_template.is_template {
            template::render(
                file_template.source.content(),
                context,
                &file_template.target,
            )?
        } else {
            file_template.source.content().to_string()
        };

        merge_into(
            files,
            &file_template.target,
            file_template.effective_strategy(),
            &rendered,
            &module.name,
            context,
            warnings,
        )?;
    }

    // Dependency manifest entries land in package.json alongside any
    // template contributions to it.
    if !module.manifest_dependencies.is_empty() {
        let contribution = serde_json::json!({
            "dependencies": module.manifest_dependencies,
        });
        merge_into(
            files,
            std::path::Path::new("package.json"),
            MergeStrategy::MergeJson,
            &contribution.to_string(),
            &module.name,
            context,
            warnings,
        )?;
    }

    Ok(())
}

fn merge_into(
    files: &mut GeneratedFileSet,
    target: &std::path::Path,
    strategy: MergeStrategy,
    rendered: &str,
    contributor: &str,
    context: &GenerationContext,
    warnings: &mut Vec<Warning>,
) -> Result<()> {
    let seeded;
    let (existing, previous) = match files.content(target) {
        Some(content) => (
            Some(content.to_string()),
            files.contributors(target).last().cloned(),
        ),
        None => {
            seeded = seed_from_disk(context, target)?;
            (seeded, None)
        }
    };

    let outcome = merge::apply(
        strategy,
        target,
        existing.as_deref(),
        rendered,
        previous.as_deref(),
        contributor,
        context,
    )?;
    warnings.extend(outcome.warnings);
    files.put(target, outcome.content, contributor);
    Ok(())
}

/// `content_0` for a path: the file already in the target directory, if any.
fn seed_from_disk(context: &GenerationContext, target: &std::path::Path) -> Result<Option<String>> {
    let on_disk = context.target_dir.join(target);
    if !on_disk.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(&on_disk).map_err(|e| Error::Filesystem {
        message: format!("cannot read existing file '{}': {}", on_disk.display(), e),
    })?;
    Ok(Some(content))
}

/// Whole-set validation: JSON files re-parse, no unrendered template syntax
/// anywhere.
fn validate(files: &GeneratedFileSet) -> Result<()> {
    for (path, entry) in files.iter() {
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            serde_json::from_str::<serde_json::Value>(&entry.content).map_err(|e| {
                Error::Validation {
                    path: path.to_path_buf(),
                    message: format!("not valid JSON after merge: {}", e),
                }
            })?;
        }
        if entry.content.contains("{{") {
            return Err(Error::Validation {
                path: path.to_path_buf(),
                message: "residual template syntax after rendering".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{
        Category, Condition, FileTemplate, LifecycleHooks, ModuleDefinition, TemplateSource,
    };
    use crate::registry::Registry;
    use crate::resolver::resolve;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn module(name: &str, category: Category, templates: Vec<FileTemplate>) -> ModuleDefinition {
        ModuleDefinition {
            name: name.to_string(),
            version: semver::Version::new(1, 0, 0),
            category,
            provides: BTreeSet::new(),
            requires: BTreeSet::new(),
            conflicts_with: BTreeSet::new(),
            priority: 0,
            manifest_dependencies: BTreeMap::new(),
            templates,
            hooks: LifecycleHooks::default(),
            origin: PathBuf::from(format!("{name}/module.yaml")),
        }
    }

    fn inline(target: &str, content: &str, is_template: bool) -> FileTemplate {
        FileTemplate {
            target: PathBuf::from(target),
            source: TemplateSource::Inline(content.to_string()),
            is_template,
            merge: None,
            condition: None,
        }
    }

    fn ctx(target_dir: &std::path::Path) -> GenerationContext {
        GenerationContext::new("my-app", target_dir, BTreeMap::new())
    }

    fn stack_of(modules: Vec<ModuleDefinition>, selection: &[&str]) -> ResolvedStack {
        let names: Vec<String> = selection.iter().map(|s| s.to_string()).collect();
        resolve(&names, &Registry::from_definitions(modules)).unwrap()
    }

    #[test]
    fn test_generate_renders_templates() {
        let dir = TempDir::new().unwrap();
        let stack = stack_of(
            vec![module(
                "frame-a",
                Category::FrontendFramework,
                vec![inline("README.md", "# {{project_name}}\n", true)],
            )],
            &["frame-a"],
        );
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        assert_eq!(output.files.content("README.md"), Some("# my-app\n"));
        assert_eq!(
            output.files.contributors("README.md"),
            &["frame-a".to_string()]
        );
    }

    #[test]
    fn test_non_template_content_is_verbatim() {
        let dir = TempDir::new().unwrap();
        let stack = stack_of(
            vec![module(
                "m",
                Category::Other,
                // Raw file keeps its braces only if they don't look like
                // template syntax; single braces are fine.
                vec![inline("style.css", "body { margin: 0; }\n", false)],
            )],
            &["m"],
        );
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        assert_eq!(
            output.files.content("style.css"),
            Some("body { margin: 0; }\n")
        );
    }

    #[test]
    fn test_condition_false_skips_entry() {
        let dir = TempDir::new().unwrap();
        let mut template = inline("strict.ts", "export {};\n", false);
        template.condition = Some(Condition::OptionTruthy {
            key: "strict_typing".to_string(),
        });
        let stack = stack_of(vec![module("m", Category::Other, vec![template])], &["m"]);
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        assert!(!output.files.exists("strict.ts"));
    }

    #[test]
    fn test_json_contributions_fold_across_modules() {
        let dir = TempDir::new().unwrap();
        let mut frame = module(
            "frame-a",
            Category::FrontendFramework,
            vec![inline("package.json", r#"{"name": "{{project_name}}"}"#, true)],
        );
        frame.manifest_dependencies.insert("react".into(), "^18.0.0".into());
        let mut ui = module("ui-kit", Category::UiLibrary, vec![]);
        ui.manifest_dependencies.insert("@ui/kit".into(), "^2.0.0".into());

        let stack = stack_of(vec![frame, ui], &["frame-a", "ui-kit"]);
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();

        let pkg: serde_json::Value =
            serde_json::from_str(output.files.content("package.json").unwrap()).unwrap();
        assert_eq!(pkg["name"], "my-app");
        assert_eq!(pkg["dependencies"]["react"], "^18.0.0");
        assert_eq!(pkg["dependencies"]["@ui/kit"], "^2.0.0");
        assert_eq!(
            output.files.contributors("package.json"),
            &["frame-a".to_string(), "ui-kit".to_string()]
        );
    }

    #[test]
    fn test_replace_divergence_produces_warning() {
        let dir = TempDir::new().unwrap();
        let a = module(
            "a",
            Category::Other,
            vec![inline(".gitignore", "node_modules\n", false)],
        );
        let b = module(
            "b",
            Category::Other,
            vec![inline(".gitignore", "dist\n", false)],
        );
        let stack = stack_of(vec![a, b], &["a", "b"]);
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        assert_eq!(output.files.content(".gitignore"), Some("dist\n"));
        assert!(output
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::ReplacedContent { .. })));
    }

    #[test]
    fn test_existing_disk_file_seeds_the_fold() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"license": "MIT"}"#).unwrap();

        let m = module(
            "m",
            Category::Other,
            vec![inline("package.json", r#"{"name": "app"}"#, false)],
        );
        let stack = stack_of(vec![m], &["m"]);
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        let pkg: serde_json::Value =
            serde_json::from_str(output.files.content("package.json").unwrap()).unwrap();
        assert_eq!(pkg["license"], "MIT");
        assert_eq!(pkg["name"], "app");
    }

    #[test]
    fn test_render_failure_aborts_generation() {
        let dir = TempDir::new().unwrap();
        let good = module("a", Category::Other, vec![inline("ok.txt", "fine\n", false)]);
        let bad = module(
            "b",
            Category::Other,
            vec![inline("bad.txt", "{{undefined_var}}", true)],
        );
        let stack = stack_of(vec![good, bad], &["a", "b"]);
        let err = generate(&stack, &mut ctx(dir.path())).unwrap_err();
        assert!(matches!(err, Error::Template { .. }));
    }

    #[test]
    fn test_validation_rejects_residual_template_syntax() {
        let dir = TempDir::new().unwrap();
        // A non-template file smuggling unrendered syntax into the output.
        let m = module(
            "m",
            Category::Other,
            vec![inline("index.html", "<p>{{oops}}</p>", false)],
        );
        let stack = stack_of(vec![m], &["m"]);
        let err = generate(&stack, &mut ctx(dir.path())).unwrap_err();
        match err {
            Error::Validation { path, message } => {
                assert_eq!(path, PathBuf::from("index.html"));
                assert!(message.contains("residual template syntax"));
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_broken_json() {
        let dir = TempDir::new().unwrap();
        let mut t = inline("data.json", "not json at all", false);
        t.merge = Some(MergeStrategy::Replace);
        let m = module("m", Category::Other, vec![t]);
        let stack = stack_of(vec![m], &["m"]);
        let err = generate(&stack, &mut ctx(dir.path())).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_hooks_run_around_module_application() {
        fn before(ctx: &mut GenerationContext) -> Result<()> {
            ctx.set_variable("framework", "frame-a");
            Ok(())
        }

        let dir = TempDir::new().unwrap();
        let mut m = module(
            "frame-a",
            Category::FrontendFramework,
            vec![inline("fw.txt", "{{framework}}\n", true)],
        );
        m.hooks = LifecycleHooks {
            before_apply: Some(before),
            after_apply: None,
        };
        let stack = stack_of(vec![m], &["frame-a"]);
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        assert_eq!(output.files.content("fw.txt"), Some("frame-a\n"));
    }

    #[test]
    fn test_append_unique_across_modules_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut t1 = inline(".gitignore", "node_modules\n", false);
        t1.merge = Some(MergeStrategy::AppendUnique);
        let mut t2 = inline(".gitignore", "node_modules\n", false);
        t2.merge = Some(MergeStrategy::AppendUnique);
        let a = module("a", Category::Other, vec![t1]);
        let b = module("b", Category::Other, vec![t2]);
        let stack = stack_of(vec![a, b], &["a", "b"]);
        let output = generate(&stack, &mut ctx(dir.path())).unwrap();
        assert_eq!(output.files.content(".gitignore"), Some("node_modules\n"));
    }
}
