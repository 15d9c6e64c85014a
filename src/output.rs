//! Terminal output configuration: when to colorize and when to stay plain.
//!
//! Resolution order for color: explicit `--color` choice, then `NO_COLOR`,
//! then `CLICOLOR`/`CLICOLOR_FORCE`, then `TERM=dumb`, then whether stderr is
//! a terminal. Styling goes through [`console`] so the same decision also
//! gates progress bars and prompts.

use std::io::IsTerminal;

use console::Style;

/// Explicit color preference from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!(
                "invalid color choice '{other}' (expected auto, always or never)"
            )),
        }
    }
}

/// Resolved output configuration for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub color: bool,
}

impl OutputConfig {
    pub fn new(choice: ColorChoice) -> Self {
        let color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => color_from_environment(),
        };
        console::set_colors_enabled(color);
        console::set_colors_enabled_stderr(color);
        Self { color }
    }

    pub fn success(&self) -> Style {
        self.styled(Style::new().green().bold())
    }

    pub fn warning(&self) -> Style {
        self.styled(Style::new().yellow())
    }

    pub fn error(&self) -> Style {
        self.styled(Style::new().red().bold())
    }

    pub fn emphasis(&self) -> Style {
        self.styled(Style::new().cyan())
    }

    pub fn dim(&self) -> Style {
        self.styled(Style::new().dim())
    }

    fn styled(&self, style: Style) -> Style {
        if self.color {
            style
        } else {
            Style::new()
        }
    }
}

fn color_from_environment() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    if std::env::var_os("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if std::env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    std::io::stderr().is_terminal()
}
