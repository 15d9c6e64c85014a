//! Subcommand implementations.

pub mod completions;
pub mod list;
pub mod new;
pub mod resolve;

use stackforge::error::Warning;
use stackforge::output::OutputConfig;

/// Print warnings to stderr in a consistent shape.
pub fn print_warnings(output: &OutputConfig, warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("{} {warning}", output.warning().apply_to("warning:"));
    }
}
