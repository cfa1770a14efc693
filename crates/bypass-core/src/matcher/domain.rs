//! Domain pattern matcher.
//!
//! Patterns are plain strings with `*` wildcards:
//! - `example.com` matches only itself
//! - `*.example.com`, `www.*.com`, `*example.com*` are globs over the whole
//!   candidate string; `*` crosses `.`, `/` and `:` alike
//! - `.example.com` matches `example.com` exactly, plus anything the glob
//!   `*example.com` matches

use globset::{GlobBuilder, GlobMatcher};
use std::borrow::Cow;
use std::fmt;

use crate::error::{Error, Result};

/// Matches host names (or any string) against a domain pattern.
#[derive(Debug, Clone)]
pub struct DomainMatcher {
    /// Fast-path exact pattern
    pattern: String,
    /// Compiled wildcard form
    glob: GlobMatcher,
}

impl DomainMatcher {
    /// Compile a domain pattern.
    ///
    /// Fails only when the glob engine rejects the pattern, e.g. an
    /// unclosed `[` character class.
    pub fn new(pattern: &str) -> Result<Self> {
        let (plain, source) = match pattern.strip_prefix('.') {
            Some(rest) => (rest.to_string(), Cow::Owned(format!("*{rest}"))),
            None => (pattern.to_string(), Cow::Borrowed(pattern)),
        };

        let glob = GlobBuilder::new(&collapse_stars(&source))
            .literal_separator(false)
            .backslash_escape(true)
            .build()
            .map_err(|e| Error::glob(pattern, e))?
            .compile_matcher();

        Ok(Self {
            pattern: plain,
            glob,
        })
    }

    /// The exact-match form of the pattern (leading `.` removed)
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if `candidate` equals the pattern or matches its glob.
    pub fn is_match(&self, candidate: &str) -> bool {
        candidate == self.pattern || self.glob.is_match(candidate)
    }
}

impl fmt::Display for DomainMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain {}", self.pattern)
    }
}

/// Reduce every run of `*` to a single `*`.
///
/// No character is a separator here, so `**` means the same as `*`; the
/// glob engine would otherwise give `**` path-recursive meaning next to `/`.
/// Escaped characters are copied verbatim.
fn collapse_stars(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains("**") {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut prev_star = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
                prev_star = false;
            }
            '*' if prev_star => {}
            _ => {
                out.push(c);
                prev_star = c == '*';
            }
        }
    }
    Cow::Owned(out)
}
