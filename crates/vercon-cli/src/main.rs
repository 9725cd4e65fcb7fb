//! vercon CLI binary.
//!
//! This is the entry point for the `vercon` command-line tool. It loads the
//! global configuration, initializes logging via `tracing`, parses arguments
//! with `clap`, and dispatches to the appropriate command handler.

mod cli;
mod commands;

use miette::Result;
use vercon_core::config::GlobalConfig;

fn main() -> Result<()> {
    let args = cli::parse();

    let config = match &args.config {
        Some(path) => GlobalConfig::load_from(path)?,
        None => GlobalConfig::load()?,
    };

    let fallback = if args.verbose {
        "debug".to_string()
    } else {
        config.log.level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::dispatch(args, &config)
}
