//! bypass CLI
//!
//! Command-line front end for bypass lists: check addresses, validate rule
//! files and watch a rule file with live reload.

mod args;
mod commands;
mod logging;

use anyhow::Result;
use clap::Parser;
use tracing::error;

use args::Args;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    logging::init(&args)?;

    let result = run(args);

    if let Err(ref e) = result {
        error!("Fatal error: {:#}", e);
    }

    result
}

fn run(args: Args) -> Result<()> {
    match args.command {
        commands::Command::Check(check_args) => commands::check::execute(check_args),
        commands::Command::Validate(validate_args) => commands::validate::execute(validate_args),
        commands::Command::Watch(watch_args) => commands::watch::execute(watch_args),
        commands::Command::Config(config_args) => commands::config::execute(config_args),
        commands::Command::Completions(comp_args) => commands::completions::execute(comp_args),
    }
}
