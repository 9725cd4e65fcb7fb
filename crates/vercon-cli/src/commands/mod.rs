//! Command dispatch and handler modules.

mod check;
mod explain;
mod why;

use miette::Result;
use vercon_core::config::GlobalConfig;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli, config: &GlobalConfig) -> Result<()> {
    match cli.command {
        Command::Explain {
            scenario,
            package,
            candidate,
            format,
        } => explain::exec(
            &scenario,
            &package,
            candidate.as_deref(),
            format,
            &config.report,
        ),
        Command::Check { scenario } => check::exec(&scenario, &config.report),
        Command::Why { scenario, package } => why::exec(&scenario, &package),
    }
}
