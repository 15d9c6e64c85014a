//! `stackforge resolve`: print the application plan for a selection.

use anyhow::Result;

use stackforge::output::OutputConfig;
use stackforge::registry::Registry;
use stackforge::resolver;
use stackforge::suggestions;

use crate::cli::Cli;

pub fn run(cli: &Cli, output: &OutputConfig, modules: &[String]) -> Result<()> {
    if modules.is_empty() {
        return Err(suggestions::empty_selection());
    }

    let search_paths = cli.search_paths();
    let registry = Registry::discover(&search_paths);
    super::print_warnings(output, registry.warnings());
    if registry.is_empty() {
        return Err(suggestions::no_modules_found(&search_paths));
    }

    let stack = resolver::resolve(modules, &registry)?;
    super::print_warnings(output, &stack.warnings);

    println!(
        "{} ({} modules)",
        output.success().apply_to("Application order"),
        stack.modules.len()
    );
    for (position, resolved) in stack.modules.iter().enumerate() {
        let module = &resolved.module;
        let mut line = format!(
            "  {}. {} {} [{}]",
            position + 1,
            module.name,
            module.version,
            module.category.as_str()
        );
        if let Some(by) = &resolved.added_by {
            line.push_str(&format!(
                "  {}",
                output.dim().apply_to(format!("(required by {by})"))
            ));
        }
        println!("{line}");
    }
    Ok(())
}
