//! Binary entry point: parse arguments, set up logging and colors, dispatch.

mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Command};
use stackforge::output::OutputConfig;

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
        .format_timestamp(None)
        .init();

    let output = OutputConfig::new(cli.color);

    let result = match &cli.command {
        Command::List { category } => commands::list::run(&cli, &output, category.as_deref()),
        Command::Resolve { modules } => commands::resolve::run(&cli, &output, modules),
        Command::New {
            project_name,
            modules,
            target,
            options,
            overwrite,
            yes,
        } => commands::new::run(
            &cli,
            &output,
            commands::new::NewArgs {
                project_name,
                modules,
                target: target.as_deref(),
                options,
                overwrite: *overwrite,
                yes: *yes,
            },
        ),
        Command::Completions { shell } => commands::completions::run(*shell),
    };

    if let Err(error) = result {
        eprintln!("{} {error:#}", output.error().apply_to("error:"));
        std::process::exit(1);
    }
}
