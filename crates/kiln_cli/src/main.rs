//! Kiln CLI: the command-line interface for the kiln static site builder.
//!
//! Provides `kiln build` for incremental builds, `kiln clean` to drop the
//! cache and output, and `kiln inspect` to look at a cached page context.

#![warn(missing_docs)]

use std::process;

use clap::{Parser, Subcommand};
use kiln_cli::{build, clean, inspect, BuildArgs, GlobalArgs, InspectArgs};
use tracing_subscriber::EnvFilter;

/// Kiln: an incremental static site builder.
#[derive(Parser, Debug)]
#[command(name = "kiln", version, about = "Kiln static site builder")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `kiln.toml` file or the directory containing it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the site, reusing cached results where possible.
    Build(BuildArgs),
    /// Remove the cache and the output directory.
    Clean,
    /// Print the cached context of a page.
    Inspect(InspectArgs),
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.quiet, cli.verbose);

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };

    let result = match cli.command {
        Command::Build(ref args) => build::run(args, &global),
        Command::Clean => clean::run(&global),
        Command::Inspect(ref args) => inspect::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the tracing subscriber. `RUST_LOG` takes precedence over the flags.
fn init_logging(quiet: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match (quiet, verbose) {
            (true, _) => "kiln=error",
            (false, true) => "kiln=debug",
            (false, false) => "kiln=warn",
        })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_cli::ReportFormat;

    #[test]
    fn parse_build_default() {
        let cli = Cli::parse_from(["kiln", "build"]);
        match cli.command {
            Command::Build(ref args) => assert!(!args.force),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_build_force() {
        let cli = Cli::parse_from(["kiln", "build", "--force"]);
        match cli.command {
            Command::Build(ref args) => assert!(args.force),
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn parse_clean() {
        let cli = Cli::parse_from(["kiln", "clean"]);
        assert!(matches!(cli.command, Command::Clean));
    }

    #[test]
    fn parse_inspect_default() {
        let cli = Cli::parse_from(["kiln", "inspect", "posts/intro.html"]);
        match cli.command {
            Command::Inspect(ref args) => {
                assert_eq!(args.url, "posts/intro.html");
                assert_eq!(args.format, ReportFormat::Text);
            }
            _ => panic!("expected Inspect command"),
        }
    }

    #[test]
    fn parse_inspect_json() {
        let cli = Cli::parse_from(["kiln", "inspect", "index.html", "--format", "json"]);
        match cli.command {
            Command::Inspect(ref args) => assert_eq!(args.format, ReportFormat::Json),
            _ => panic!("expected Inspect command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from(["kiln", "--quiet", "build"]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["kiln", "clean", "--verbose"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["kiln", "--config", "/path/to/kiln.toml", "build"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/kiln.toml"));
    }

    #[test]
    fn inspect_requires_url() {
        assert!(Cli::try_parse_from(["kiln", "inspect"]).is_err());
    }
}
