//! Command-line interface definition.
//!
//! The binary is a thin front-end over the library: argument parsing and
//! terminal presentation live here, composition semantics do not.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use clap_complete::Shell;

use stackforge::output::ColorChoice;

/// Compose a buildable project from independently authored modules.
#[derive(Debug, Parser)]
#[command(name = "stackforge", version, about, max_term_width = 100)]
pub struct Cli {
    /// Directories to search for module manifests. May be given multiple
    /// times; later paths lose name collisions to earlier ones.
    #[arg(
        long = "module-path",
        global = true,
        env = "STACKFORGE_MODULE_PATH",
        value_delimiter = ':',
        value_hint = ValueHint::DirPath
    )]
    pub module_path: Vec<PathBuf>,

    /// When to use colored output.
    #[arg(long, global = true, default_value = "auto", value_parser = clap::value_parser!(ColorChoice))]
    pub color: ColorChoice,

    /// Log filter, like `RUST_LOG` (e.g. "debug", "stackforge=trace").
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every discovered module, grouped by category.
    List {
        /// Only show modules in this category (e.g. "ui-library").
        #[arg(long)]
        category: Option<String>,
    },

    /// Resolve a selection and print the application plan without
    /// generating anything.
    Resolve {
        /// Module names to compose.
        #[arg(required = true)]
        modules: Vec<String>,
    },

    /// Generate a project from a selection of modules.
    New {
        /// Name of the project, bound as {{project_name}} in templates.
        project_name: String,

        /// Module names to compose.
        #[arg(long = "module", short = 'm', required = true)]
        modules: Vec<String>,

        /// Target directory (defaults to ./<project-name>).
        #[arg(long, value_hint = ValueHint::DirPath)]
        target: Option<PathBuf>,

        /// Extra option passed to templates and conditions, as key=value.
        /// May be given multiple times.
        #[arg(long = "option", short = 'o', value_parser = parse_key_value)]
        options: Vec<(String, String)>,

        /// Replace files that already exist in the target directory.
        #[arg(long)]
        overwrite: bool,

        /// Answer yes to every confirmation prompt.
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Search paths in priority order: explicit flags/env first, then
    /// `./modules`, then the per-user module directory.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.module_path.clone();
        if paths.is_empty() {
            paths.push(PathBuf::from("modules"));
            if let Some(config) = dirs::config_dir() {
                paths.push(config.join("stackforge").join("modules"));
            }
        }
        paths
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid option '{raw}' (expected key=value)"))?;
    if key.is_empty() {
        return Err(format!("invalid option '{raw}' (empty key)"));
    }
    Ok((key.to_string(), value.to_string()))
}
