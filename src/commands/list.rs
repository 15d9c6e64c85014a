//! `stackforge list`: show every discovered module, grouped by category.

use anyhow::Result;

use stackforge::module::Category;
use stackforge::output::OutputConfig;
use stackforge::registry::Registry;
use stackforge::suggestions;

use crate::cli::Cli;

pub fn run(cli: &Cli, output: &OutputConfig, category: Option<&str>) -> Result<()> {
    let search_paths = cli.search_paths();
    let registry = Registry::discover(&search_paths);
    super::print_warnings(output, registry.warnings());

    if registry.is_empty() {
        return Err(suggestions::no_modules_found(&search_paths));
    }

    let filter = category
        .map(|raw| raw.parse::<Category>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()?;
    let categories: Vec<Category> = match filter {
        Some(one) => vec![one],
        None => Category::all().to_vec(),
    };

    for category in categories {
        let modules = registry.by_category(category);
        if modules.is_empty() {
            continue;
        }
        println!("{}", output.emphasis().apply_to(category.as_str()));
        for module in modules {
            let mut line = format!("  {} {}", module.name, module.version);
            if !module.provides.is_empty() {
                let provides: Vec<&str> = module.provides.iter().map(String::as_str).collect();
                line.push_str(&format!("  provides: {}", provides.join(", ")));
            }
            if !module.requires.is_empty() {
                let requires: Vec<&str> = module.requires.iter().map(String::as_str).collect();
                line.push_str(&format!("  requires: {}", requires.join(", ")));
            }
            println!("{line}");
        }
    }
    Ok(())
}
