//! Logging initialization
//!
//! Events go to stderr so stdout only carries verdicts. `--log-file` adds a
//! second sink with the same format and no ANSI colors.

use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Mutex;
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{prelude::*, EnvFilter, Layer};

use crate::args::{Args, LogFormat};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Initialize logging based on CLI arguments
pub fn init(args: &Args) -> Result<()> {
    // RUST_LOG overrides the verbosity flags
    let filter = EnvFilter::builder()
        .with_default_directive(level_for(args.verbose, args.quiet).into())
        .from_env_lossy();

    let stderr = format_layer(args.log_format, std::io::stderr, true, args.verbose);

    let file = match args.log_file {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path))?;
            Some(format_layer(args.log_format, Mutex::new(file), false, args.verbose))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}

/// Default level: warnings only, each `-v` one step louder.
fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// One formatting layer; `-vv` adds targets, `-vvv` adds thread names
/// (the reload thread is `bypass-reload`) and source locations.
fn format_layer<S, W>(format: LogFormat, writer: W, ansi: bool, verbose: u8) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(verbose >= 2)
        .with_thread_names(verbose >= 3)
        .with_file(verbose >= 3)
        .with_line_number(verbose >= 3);

    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}
