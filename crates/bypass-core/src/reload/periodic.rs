//! Periodic file-backed reloading.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

use super::{Reloader, Stoppable};
use crate::error::Result;

/// Shortest interval between two file checks
const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Reloads a [`Reloader`] from a file whenever the file changes.
///
/// The loop follows the reloader's own period: it ends when the period is
/// `None` (stopped or disabled), loads once and ends when the period is
/// zero, and otherwise re-checks the file every period (at least one
/// second apart).
#[derive(Debug)]
pub struct FileReloader<R: ?Sized> {
    reloader: Arc<R>,
    path: PathBuf,
    last_seen: Option<(SystemTime, u64)>,
}

impl<R> FileReloader<R>
where
    R: Reloader + Stoppable + ?Sized + 'static,
{
    /// Create a reloader for `path`. Nothing is read until the first run.
    pub fn new(reloader: Arc<R>, path: impl Into<PathBuf>) -> Self {
        Self {
            reloader,
            path: path.into(),
            last_seen: None,
        }
    }

    /// Path of the watched file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload if the file changed since the last check.
    ///
    /// A change is a different modification time or size. Returns whether a
    /// reload happened; never reloads once the reloader is stopped. A failed
    /// reload still records the file state, so a broken file is retried only
    /// after it changes again.
    pub fn run_once(&mut self) -> Result<bool> {
        if self.reloader.stopped() {
            debug!(path = %self.path.display(), "Reloader stopped, skipping rule file");
            return Ok(false);
        }

        let metadata = std::fs::metadata(&self.path)?;
        let seen = (metadata.modified()?, metadata.len());
        if self.last_seen == Some(seen) {
            debug!(path = %self.path.display(), "Rule file unchanged");
            return Ok(false);
        }
        self.last_seen = Some(seen);

        let mut file = File::open(&self.path)?;
        self.reloader.reload(&mut file)?;
        info!(path = %self.path.display(), "Reloaded rule file");
        Ok(true)
    }

    /// Run the reload loop on the current thread until stopped or disabled.
    pub fn run(mut self) {
        info!(path = %self.path.display(), "Rule file reloader started");

        loop {
            if self.reloader.period().is_none() {
                break;
            }

            if let Err(e) = self.run_once() {
                error!(
                    path = %self.path.display(),
                    "Failed to reload rule file: {}. Keeping current rules.",
                    e
                );
            }

            let period = match self.reloader.period() {
                None => break,
                Some(period) if period.is_zero() => {
                    info!(path = %self.path.display(), "Periodic reload disabled");
                    return;
                }
                Some(period) => period.max(MIN_PERIOD),
            };

            if self.reloader.wait_timeout(period) {
                break;
            }
        }

        info!(path = %self.path.display(), "Rule file reloader stopped");
    }

    /// Run the reload loop on a dedicated thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("bypass-reload".into())
            .spawn(move || self.run())
    }
}
