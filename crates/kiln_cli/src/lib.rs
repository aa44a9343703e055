//! Build driver behind the `kiln` command.
//!
//! Resolves the project, turns page files and listings into actions, runs them
//! through the build cache and writes the rendered output.

#![warn(missing_docs)]

pub mod build;
pub mod clean;
pub mod inspect;
pub mod manifest;
pub mod project;

/// Global settings derived from CLI flags.
#[derive(Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a `kiln.toml` file or the directory containing it.
    pub config: Option<String>,
}

/// Arguments for the `kiln build` subcommand.
#[derive(clap::Parser, Debug, Default)]
pub struct BuildArgs {
    /// Clear the cache and rewrite every output.
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `kiln inspect` subcommand.
#[derive(clap::Parser, Debug)]
pub struct InspectArgs {
    /// Output URL of the cached page, e.g. `posts/intro.html`.
    pub url: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Output format for `kiln inspect`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    /// `key = value` lines sorted by key.
    Text,
    /// A JSON object.
    Json,
}
