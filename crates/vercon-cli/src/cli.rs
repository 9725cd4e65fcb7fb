//! CLI argument definitions for vercon.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "vercon",
    version,
    about = "Explain version-constraint conflicts in a dependency graph",
    long_about = "vercon folds the version ranges every package in a scenario file imposes \
                  on its dependencies and explains, referrer by referrer, why a range is \
                  unsatisfiable or why a chosen version is rejected."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of ~/.vercon/config.toml
    #[arg(long, global = true, env = "VERCON_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Explain the constraints on a single package
    Explain {
        /// Scenario file describing the dependency graph
        scenario: PathBuf,
        /// Package to explain
        package: String,
        /// Version to validate (defaults to the package's node version)
        #[arg(short, long)]
        candidate: Option<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check every package in a scenario
    Check {
        /// Scenario file describing the dependency graph
        scenario: PathBuf,
    },

    /// Show how the root reaches a package
    Why {
        /// Scenario file describing the dependency graph
        scenario: PathBuf,
        /// Package to trace
        package: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn parse() -> Cli {
    Cli::parse()
}
