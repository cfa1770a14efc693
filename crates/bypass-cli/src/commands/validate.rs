//! Validate command - check a rule file before deploying it

use anyhow::{Context, Result};
use bypass_core::reload::{parse_rules, ParseMode};
use bypass_core::Matcher;
use clap::Args;
use colored::Colorize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Validate command arguments
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Rule file to validate
    pub file: PathBuf,

    /// Accept malformed `reload`/`reverse` values like live reload does
    #[arg(long)]
    pub lenient: bool,

    /// List every rule
    #[arg(short, long)]
    pub list: bool,
}

/// Execute the validate command
pub fn execute(args: ValidateArgs) -> Result<()> {
    let mode = if args.lenient {
        ParseMode::Lenient
    } else {
        ParseMode::Strict
    };

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open rule file {:?}", args.file))?;
    let rules = parse_rules(BufReader::new(file), mode)
        .with_context(|| format!("Rule file {:?} is invalid", args.file))?;

    let period = match rules.period() {
        None => "disabled".to_string(),
        Some(p) if p.is_zero() => "load once".to_string(),
        Some(p) => format!("{:?}", p),
    };

    println!("{} Rule file is valid", "✓".green());
    println!("  File: {}", args.file.display().to_string().cyan());
    println!("  Rules: {}", rules.len().to_string().green());
    println!("  Reversed: {}", rules.is_reversed());
    println!("  Reload: {}", period);

    if args.list {
        println!("{}", "─".repeat(50).bright_black());
        if rules.is_empty() {
            println!("{}", "  (empty)".dimmed());
        }
        for matcher in rules.matchers() {
            let marker = match matcher {
                Matcher::Ip(_) => "●".green(),
                Matcher::Cidr(_) => "◆".blue(),
                Matcher::Domain(_) => "◉".yellow(),
            };
            println!("  {} {}", marker, matcher);
        }
    }

    Ok(())
}
