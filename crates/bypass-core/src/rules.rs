//! Rule sets: an ordered list of matchers plus the reversal flag.

use std::time::Duration;

use crate::error::Result;
use crate::matcher::Matcher;

/// A snapshot of bypass rules.
///
/// Evaluation is an OR over all matchers, optionally inverted. Matcher
/// order only decides how early evaluation stops.
#[derive(Debug, Clone)]
pub struct RuleSet {
    matchers: Vec<Matcher>,
    reversed: bool,
    /// `None` disables periodic reloading
    period: Option<Duration>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            matchers: Vec::new(),
            reversed: false,
            period: Some(Duration::ZERO),
        }
    }
}

impl RuleSet {
    /// Create a rule set from compiled matchers
    pub fn new(reversed: bool, matchers: Vec<Matcher>) -> Self {
        Self {
            matchers,
            reversed,
            ..Self::default()
        }
    }

    /// Compile a rule set from textual patterns; empty patterns are dropped.
    pub fn from_patterns<I, S>(reversed: bool, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Self::new(reversed, Vec::new());
        for pattern in patterns {
            if let Some(m) = Matcher::new(pattern.as_ref())? {
                rules.push(m);
            }
        }
        Ok(rules)
    }

    /// Set the reload period carried with these rules
    #[must_use]
    pub fn with_period(mut self, period: Option<Duration>) -> Self {
        self.period = period;
        self
    }

    /// Append a matcher
    pub fn push(&mut self, matcher: Matcher) {
        self.matchers.push(matcher);
    }

    /// Invert (or stop inverting) the verdict
    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    /// Replace the reload period
    pub fn set_period(&mut self, period: Option<Duration>) {
        self.period = period;
    }

    /// Matchers in evaluation order
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// Whether the verdict is inverted
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Reload period; `None` means disabled
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Number of matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Check if there are no matchers
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Evaluate an address that has already had its port stripped.
    ///
    /// An empty rule set never bypasses, reversed or not.
    pub fn evaluate(&self, addr: &str) -> bool {
        if self.matchers.is_empty() {
            return false;
        }
        let matched = self.matchers.iter().any(|m| m.is_match(addr));
        matched != self.reversed
    }
}
