//! Watch command - live-reload a rule file and answer queries from stdin

use anyhow::{anyhow, Context, Result};
use bypass_core::{Bypasser, FileReloader};
use clap::Args;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use super::print_verdict;

/// How often the query loop checks for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Watch command arguments
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Rule file in line format
    pub file: PathBuf,

    /// Tab-separated output for scripts
    #[arg(long)]
    pub plain: bool,
}

/// Execute the watch command
pub fn execute(args: WatchArgs) -> Result<()> {
    let bypasser = Arc::new(Bypasser::default());

    let mut reloader = FileReloader::new(Arc::clone(&bypasser), &args.file);
    reloader
        .run_once()
        .with_context(|| format!("Failed to load rule file {:?}", args.file))?;
    info!(
        rules = bypasser.len(),
        reversed = bypasser.is_reversed(),
        period = ?bypasser.period(),
        "Loaded rule file"
    );

    let reload_thread = reloader.spawn().context("Failed to start reload thread")?;

    // Set up signal handler
    let bp = Arc::clone(&bypasser);
    ctrlc::set_handler(move || {
        info!("Received interrupt signal, shutting down...");
        bp.stop();
    })
    .context("Failed to set signal handler")?;

    let queries = spawn_stdin_reader()?;
    while !bypasser.stopped() {
        match queries.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                let addr = line.trim();
                if !addr.is_empty() {
                    print_verdict(addr, bypasser.bypass(addr), args.plain);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                debug!("End of input");
                break;
            }
        }
    }

    bypasser.stop();
    reload_thread
        .join()
        .map_err(|_| anyhow!("Reload thread panicked"))?;

    info!("Watch stopped");
    Ok(())
}

/// Forward stdin lines over a channel so the query loop can notice shutdown.
fn spawn_stdin_reader() -> Result<Receiver<String>> {
    let (tx, rx) = crossbeam_channel::unbounded();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })
        .context("Failed to start input thread")?;
    Ok(rx)
}
