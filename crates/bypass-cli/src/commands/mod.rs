//! CLI commands

pub mod check;
pub mod completions;
pub mod config;
pub mod validate;
pub mod watch;

use clap::Subcommand;
use colored::Colorize;

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check addresses against a bypass list
    Check(check::CheckArgs),

    /// Validate a rule file
    Validate(validate::ValidateArgs),

    /// Watch a rule file and answer addresses read from stdin
    Watch(watch::WatchArgs),

    /// Configuration management
    Config(config::ConfigArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Print one verdict line to stdout.
///
/// Plain output is `<addr>\t<bypass|process>` for scripts.
pub(crate) fn print_verdict(addr: &str, bypassed: bool, plain: bool) {
    if plain {
        println!("{}\t{}", addr, if bypassed { "bypass" } else { "process" });
    } else if bypassed {
        println!("  {} {}  {}", "✓".green(), "BYPASS ".green().bold(), addr);
    } else {
        println!("  {} {}  {}", "·".bright_black(), "PROCESS".yellow(), addr);
    }
}
