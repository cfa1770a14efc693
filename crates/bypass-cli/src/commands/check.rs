//! Check command - evaluate addresses against a bypass list

use anyhow::{Context, Result};
use bypass_core::reload::{parse_rules, ParseMode};
use bypass_core::{Bypasser, Config, Matcher, RuleSet};
use clap::Args;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::print_verdict;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Addresses to check (host, host:port, IP)
    #[arg(required = true, value_name = "ADDR")]
    pub addrs: Vec<String>,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Rule file in line format (replaces config patterns)
    #[arg(short = 'f', long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Extra bypass pattern (repeatable)
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
    pub patterns: Vec<String>,

    /// Invert the verdict
    #[arg(long)]
    pub reverse: bool,

    /// Tab-separated output for scripts
    #[arg(long)]
    pub plain: bool,
}

/// Execute the check command
pub fn execute(args: CheckArgs) -> Result<()> {
    let rules = build_rules(&args)?;
    info!(
        rules = rules.len(),
        reversed = rules.is_reversed(),
        "Loaded bypass rules"
    );

    let bypasser = Bypasser::from_rules(rules);
    for addr in &args.addrs {
        print_verdict(addr, bypasser.bypass(addr), args.plain);
    }

    Ok(())
}

/// Combine config, rule file and command-line patterns into one rule set.
fn build_rules(args: &CheckArgs) -> Result<RuleSet> {
    let config = match args.config {
        Some(ref path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load config from {:?}", path))?;
            config.validate().context("Configuration validation failed")?;
            config
        }
        None => Config::default(),
    };

    let file = args
        .file
        .clone()
        .or_else(|| config.bypass.file.as_ref().map(PathBuf::from));

    let mut rules = match file {
        Some(ref path) => load_rule_file(path)?,
        None => RuleSet::from_patterns(config.bypass.reverse, &config.bypass.patterns)
            .context("Invalid pattern in configuration")?,
    };

    for pattern in &args.patterns {
        if let Some(m) = Matcher::new(pattern)
            .with_context(|| format!("Invalid pattern: {}", pattern))?
        {
            debug!(matcher = %m, "Added command-line pattern");
            rules.push(m);
        }
    }

    if args.reverse {
        rules.set_reversed(true);
    }

    Ok(rules)
}

fn load_rule_file(path: &Path) -> Result<RuleSet> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open rule file {:?}", path))?;
    parse_rules(BufReader::new(file), ParseMode::Lenient)
        .with_context(|| format!("Failed to read rule file {:?}", path))
}
