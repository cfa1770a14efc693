//! Config command - configuration management

use anyhow::{Context, Result};
use bypass_core::Config;
use clap::{Args, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

/// Config file names searched in the working directory
const CONFIG_NAMES: [&str; 2] = ["bypass.toml", "config.toml"];

/// Config command arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Config file to show (default: detect)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "bypass.toml")]
        output: PathBuf,

        /// Pattern to include (repeatable)
        #[arg(short = 'p', long = "pattern", value_name = "PATTERN")]
        patterns: Vec<String>,

        /// Write `reverse = true`
        #[arg(long)]
        reverse: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate
        file: PathBuf,
    },

    /// Show config file locations
    Paths,
}

/// Execute config command
pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Show { file } => show_config(file),
        ConfigAction::Generate {
            output,
            patterns,
            reverse,
            force,
        } => generate_config(output, patterns, reverse, force),
        ConfigAction::Validate { file } => validate_config(file),
        ConfigAction::Paths => show_paths(),
    }
}

fn show_config(file: Option<PathBuf>) -> Result<()> {
    let config = match file.or_else(find_config_file) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };

    let toml_str = config.to_toml().context("Failed to serialize config")?;
    println!("{}", toml_str);
    Ok(())
}

fn generate_config(
    output: PathBuf,
    patterns: Vec<String>,
    reverse: bool,
    force: bool,
) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!("{:?} already exists (use --force to overwrite)", output);
    }

    let mut config = Config::default();
    config.bypass.patterns = patterns;
    config.bypass.reverse = reverse;
    config
        .validate()
        .context("Generated configuration is invalid")?;

    let toml_str = config.to_toml().context("Failed to serialize config")?;

    let content = format!(
        "# Bypass list configuration\n\
         # Patterns: IP (10.0.0.1), CIDR (10.0.0.0/8), domain glob (*.example.com)\n\
         # Set bypass.file to a rule file to enable live reload\n\n\
         {}",
        toml_str
    );

    std::fs::write(&output, content)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    info!("Generated config file: {:?}", output);
    println!("Configuration file generated: {}", output.display());

    Ok(())
}

fn validate_config(file: PathBuf) -> Result<()> {
    let config = Config::load(&file)
        .with_context(|| format!("Failed to load config from {:?}", file))?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{} Configuration is valid", "✓".green());
    println!("  Patterns: {}", config.bypass.patterns.len());
    println!("  Reverse: {}", config.bypass.reverse);
    if let Some(ref rules) = config.bypass.file {
        println!("  Rule file: {}", rules);
    }
    println!("  Log level: {}", config.logging.level);

    Ok(())
}

fn show_paths() -> Result<()> {
    println!("Configuration file search paths:");
    println!();

    for (idx, name) in CONFIG_NAMES.iter().enumerate() {
        println!("  {}. ./{}", idx + 1, name);
    }

    if let Some(config_dir) = directories::ProjectDirs::from("", "", "bypass") {
        println!(
            "  {}. {}",
            CONFIG_NAMES.len() + 1,
            config_dir.config_dir().join("bypass.toml").display()
        );
    }

    Ok(())
}

fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }

    // Check user config directory
    let config_dir = directories::ProjectDirs::from("", "", "bypass")?;
    let path = config_dir.config_dir().join("bypass.toml");
    path.exists().then_some(path)
}
