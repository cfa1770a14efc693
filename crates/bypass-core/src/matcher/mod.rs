//! Single-pattern matchers
//!
//! A bypass rule is one textual pattern. [`Matcher::new`] classifies it:
//! - a bare IP address (`192.168.1.1`, `::1`) becomes an exact [`IpMatcher`]
//! - CIDR notation (`10.0.0.0/8`) becomes a [`CidrMatcher`]
//! - anything else becomes a [`DomainMatcher`] glob
//!
//! IP parsing is tried first so that `0.0.0.0` is never read as a glob.
//! Matchers are immutable once built and cheap to share between threads.

mod domain;
mod ip;

pub use domain::DomainMatcher;
pub use ip::{CidrMatcher, IpMatcher};

use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;

use crate::error::Result;

/// A compiled bypass pattern
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Exact IP address
    Ip(IpMatcher),
    /// IP network range
    Cidr(CidrMatcher),
    /// Domain name or wildcard pattern
    Domain(DomainMatcher),
}

impl Matcher {
    /// Build the matcher for `pattern`.
    ///
    /// Returns `Ok(None)` for an empty pattern. Fails only when `pattern`
    /// falls through to the domain matcher and is not a valid glob.
    pub fn new(pattern: &str) -> Result<Option<Self>> {
        if pattern.is_empty() {
            return Ok(None);
        }
        if let Ok(ip) = pattern.parse::<IpAddr>() {
            return Ok(Some(Self::Ip(IpMatcher::new(ip))));
        }
        if let Ok(net) = pattern.parse::<IpNet>() {
            return Ok(Some(Self::Cidr(CidrMatcher::new(net))));
        }
        DomainMatcher::new(pattern).map(|m| Some(Self::Domain(m)))
    }

    /// Build a domain matcher regardless of what `pattern` looks like
    pub fn domain(pattern: &str) -> Result<Self> {
        DomainMatcher::new(pattern).map(Self::Domain)
    }

    /// Returns true if `candidate` matches this pattern.
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Self::Ip(m) => m.is_match(candidate),
            Self::Cidr(m) => m.is_match(candidate),
            Self::Domain(m) => m.is_match(candidate),
        }
    }

    /// Short name of the matcher kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ip(_) => "ip",
            Self::Cidr(_) => "cidr",
            Self::Domain(_) => "domain",
        }
    }
}

impl From<IpAddr> for Matcher {
    fn from(ip: IpAddr) -> Self {
        Self::Ip(IpMatcher::new(ip))
    }
}

impl From<IpNet> for Matcher {
    fn from(net: IpNet) -> Self {
        Self::Cidr(CidrMatcher::new(net))
    }
}

impl From<DomainMatcher> for Matcher {
    fn from(m: DomainMatcher) -> Self {
        Self::Domain(m)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ip(m) => m.fmt(f),
            Self::Cidr(m) => m.fmt(f),
            Self::Domain(m) => m.fmt(f),
        }
    }
}
