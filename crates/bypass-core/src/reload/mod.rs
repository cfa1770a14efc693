//! Live reload of bypass rules
//!
//! Rules are parsed from a line-oriented source into a fresh [`RuleSet`]
//! without holding any lock, then swapped in under a single write lock so
//! readers see either the old rules or the new ones, never a mix.
//!
//! [`FileReloader`] drives [`Reloader`]s from a file on disk, re-reading it
//! whenever it changes and the configured period elapses.
//!
//! [`RuleSet`]: crate::rules::RuleSet

mod parser;
mod periodic;
mod signal;

pub use parser::{parse_bool, parse_duration, parse_rules, split_line, ParseMode};
pub use periodic::FileReloader;
pub use signal::StopSignal;

use std::io::Read;
use std::time::Duration;

use crate::error::Result;

/// Something whose state can be replaced from a rule source.
pub trait Reloader: Send + Sync {
    /// Replace the current state with the one described by `source`.
    ///
    /// On error the previous state is kept.
    fn reload(&self, source: &mut dyn Read) -> Result<()>;

    /// How often the source should be re-read; `None` means never again.
    fn period(&self) -> Option<Duration>;
}

/// Something that can be told to stop reloading.
pub trait Stoppable: Send + Sync {
    /// Stop permanently. Calling this more than once has no further effect.
    fn stop(&self);

    /// Whether [`Stoppable::stop`] has been called
    fn stopped(&self) -> bool;

    /// Sleep for `timeout` or until stopped; returns whether stopped.
    fn wait_timeout(&self, timeout: Duration) -> bool {
        std::thread::sleep(timeout);
        self.stopped()
    }
}
