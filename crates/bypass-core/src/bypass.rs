//! The bypass evaluator
//!
//! [`Bypasser`] owns the active [`RuleSet`] behind a read/write lock.
//! Lookups take the read lock and never block each other; a reload builds
//! the new rule set first and only takes the write lock for the swap.

use parking_lot::RwLock;
use std::io::{BufReader, Read};
use std::num::IntErrorKind;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::error::Result;
use crate::matcher::Matcher;
use crate::reload::{parse_rules, ParseMode, Reloader, StopSignal, Stoppable};
use crate::rules::RuleSet;

/// Decides whether an address should skip the intermediary.
pub trait Bypass: Send + Sync {
    /// Returns true if `addr` should be bypassed
    fn bypass(&self, addr: &str) -> bool;
}

/// A live-reloadable bypass list
#[derive(Debug, Default)]
pub struct Bypasser {
    rules: RwLock<RuleSet>,
    stop: StopSignal,
}

impl Bypasser {
    /// Create a bypasser from compiled matchers
    pub fn new(reversed: bool, matchers: Vec<Matcher>) -> Self {
        Self::from_rules(RuleSet::new(reversed, matchers))
    }

    /// Create a bypasser from textual patterns; empty patterns are dropped.
    pub fn from_patterns<I, S>(reversed: bool, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RuleSet::from_patterns(reversed, patterns).map(Self::from_rules)
    }

    /// Create a bypasser from a prepared rule set
    pub fn from_rules(rules: RuleSet) -> Self {
        Self {
            rules: RwLock::new(rules),
            stop: StopSignal::new(),
        }
    }

    /// Reports whether `addr` should be bypassed.
    ///
    /// A trailing `:port` is stripped first when the port is a positive
    /// number; otherwise the whole string is matched as-is. An empty
    /// address is never bypassed.
    pub fn bypass(&self, addr: &str) -> bool {
        if addr.is_empty() {
            return false;
        }
        let host = strip_port(addr);

        let verdict = self.rules.read().evaluate(host);
        trace!(addr, host, verdict, "Bypass check");
        verdict
    }

    /// Replace the rules with those parsed from `source`.
    ///
    /// Malformed `reload`/`reverse` values are silently defaulted. Does
    /// nothing once stopped. On error the current rules are kept.
    pub fn reload<R: Read>(&self, source: R) -> Result<()> {
        self.reload_with(source, ParseMode::Lenient)
    }

    /// Like [`Bypasser::reload`], but malformed directive values are errors.
    pub fn reload_strict<R: Read>(&self, source: R) -> Result<()> {
        self.reload_with(source, ParseMode::Strict)
    }

    fn reload_with<R: Read>(&self, source: R, mode: ParseMode) -> Result<()> {
        if self.stopped() {
            debug!("Bypasser stopped, ignoring reload");
            return Ok(());
        }

        let rules = parse_rules(BufReader::new(source), mode)?;
        info!(
            rules = rules.len(),
            reversed = rules.is_reversed(),
            period = ?rules.period(),
            "Bypass rules reloaded"
        );

        *self.rules.write() = rules;
        Ok(())
    }

    /// Reload period; `None` once stopped or when reloading is disabled.
    pub fn period(&self) -> Option<Duration> {
        if self.stopped() {
            return None;
        }
        self.rules.read().period()
    }

    /// Stop reloading permanently
    pub fn stop(&self) {
        if self.stop.trigger() {
            debug!("Bypasser stopped");
        }
    }

    /// Whether [`Bypasser::stop`] has been called
    pub fn stopped(&self) -> bool {
        self.stop.is_triggered()
    }

    /// Whether the verdict is currently inverted
    pub fn is_reversed(&self) -> bool {
        self.rules.read().is_reversed()
    }

    /// Number of active matchers
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    /// Check if there are no active matchers
    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Descriptions of the active matchers, in evaluation order
    pub fn patterns(&self) -> Vec<String> {
        self.rules.read().matchers().iter().map(ToString::to_string).collect()
    }

    /// A copy of the active rule set
    pub fn snapshot(&self) -> RuleSet {
        self.rules.read().clone()
    }
}

impl Bypass for Bypasser {
    fn bypass(&self, addr: &str) -> bool {
        Bypasser::bypass(self, addr)
    }
}

impl Reloader for Bypasser {
    fn reload(&self, source: &mut dyn Read) -> Result<()> {
        Bypasser::reload(self, source)
    }

    fn period(&self) -> Option<Duration> {
        Bypasser::period(self)
    }
}

impl Stoppable for Bypasser {
    fn stop(&self) {
        Bypasser::stop(self);
    }

    fn stopped(&self) -> bool {
        Bypasser::stopped(self)
    }

    fn wait_timeout(&self, timeout: Duration) -> bool {
        self.stop.wait_timeout(timeout)
    }
}

/// Strip a numeric `:port` suffix, keeping anything else intact.
fn strip_port(addr: &str) -> &str {
    match split_host_port(addr) {
        Some((host, port)) if !host.is_empty() && is_positive_number(port) => host,
        _ => addr,
    }
}

/// Positive decimal integer; values past `i64::MAX` saturate and still count.
fn is_positive_number(s: &str) -> bool {
    match s.parse::<i64>() {
        Ok(n) => n > 0,
        Err(e) => *e.kind() == IntErrorKind::PosOverflow,
    }
}

/// Split `host:port` or `[host]:port`.
///
/// The split happens at the last colon. A host containing another colon
/// must be bracketed; stray brackets are rejected.
fn split_host_port(addr: &str) -> Option<(&str, &str)> {
    let colon = addr.rfind(':')?;

    let (host, host_start, host_end) = if addr.starts_with('[') {
        let close = addr.find(']')?;
        if close + 1 != colon {
            return None;
        }
        (&addr[1..close], 1, close + 1)
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return None;
        }
        (host, 0, 0)
    };

    if addr[host_start..].contains('[') || addr[host_end..].contains(']') {
        return None;
    }
    Some((host, &addr[colon + 1..]))
}
