//! `stackforge new` runs the full pipeline: discover, resolve, generate, flush.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use stackforge::context::GenerationContext;
use stackforge::error::Error;
use stackforge::flush::{flush, FlushOptions};
use stackforge::generator;
use stackforge::output::OutputConfig;
use stackforge::registry::Registry;
use stackforge::resolver;
use stackforge::suggestions;

use crate::cli::Cli;

pub struct NewArgs<'a> {
    pub project_name: &'a str,
    pub modules: &'a [String],
    pub target: Option<&'a Path>,
    pub options: &'a [(String, String)],
    pub overwrite: bool,
    pub yes: bool,
}

pub fn run(cli: &Cli, output: &OutputConfig, args: NewArgs) -> Result<()> {
    if args.modules.is_empty() {
        return Err(suggestions::empty_selection());
    }

    let search_paths = cli.search_paths();
    let registry = Registry::discover(&search_paths);
    super::print_warnings(output, registry.warnings());
    if registry.is_empty() {
        return Err(suggestions::no_modules_found(&search_paths));
    }

    let stack = resolver::resolve(args.modules, &registry)?;
    super::print_warnings(output, &stack.warnings);

    let target_dir = args
        .target
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(args.project_name));
    let user_options: BTreeMap<String, String> = args.options.iter().cloned().collect();
    let mut context = GenerationContext::new(args.project_name, &target_dir, user_options);

    let progress = progress_spinner(output);
    progress.set_message(format!("generating {} modules", stack.modules.len()));
    let generated = generator::generate(&stack, &mut context)
        .with_context(|| format!("generating project '{}'", args.project_name))?;
    progress.finish_and_clear();
    super::print_warnings(output, &generated.warnings);

    let overwrite = args.overwrite;
    let report = match flush(&generated.files, &target_dir, &FlushOptions { overwrite }) {
        Ok(report) => report,
        Err(Error::UnmanagedFiles { paths }) if !overwrite => {
            eprintln!(
                "{} {} existing file(s) in {} would be replaced:",
                output.warning().apply_to("warning:"),
                paths.len(),
                target_dir.display()
            );
            for path in &paths {
                eprintln!("  {}", path.display());
            }
            if !confirm_overwrite(args.yes)? {
                anyhow::bail!("aborted; target directory left untouched");
            }
            flush(&generated.files, &target_dir, &FlushOptions { overwrite: true })?
        }
        Err(other) => return Err(other.into()),
    };

    println!(
        "{} {} ({} files written to {})",
        output.success().apply_to("Created"),
        args.project_name,
        report.written.len(),
        target_dir.display()
    );
    if !report.replaced.is_empty() {
        println!(
            "  {} existing file(s) replaced",
            report.replaced.len()
        );
    }
    Ok(())
}

fn confirm_overwrite(yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !console::user_attended() {
        // Non-interactive runs cannot consent.
        return Ok(false);
    }
    Ok(Confirm::new()
        .with_prompt("Replace these files?")
        .default(false)
        .interact()?)
}

// Generation is a single in-memory pass with no per-module callback, so a
// spinner signals activity instead of a position that would never advance.
fn progress_spinner(output: &OutputConfig) -> ProgressBar {
    if !output.color {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("static template is valid"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
