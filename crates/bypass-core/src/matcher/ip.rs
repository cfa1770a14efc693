//! Address matchers: a single IP or a CIDR network.

use ipnet::{IpNet, Ipv4Net};
use std::fmt;
use std::net::IpAddr;

/// Parse a candidate as an IP address, folding IPv4-mapped IPv6 onto IPv4.
///
/// Anything that is not a bare address (host names, `host:port`, CIDR
/// notation) yields `None`, which every address matcher treats as "no match".
pub(crate) fn parse_ip(candidate: &str) -> Option<IpAddr> {
    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_canonical())
}

/// Matches one exact IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpMatcher {
    ip: IpAddr,
}

impl IpMatcher {
    /// Create a matcher for `ip`.
    pub fn new(ip: IpAddr) -> Self {
        Self {
            ip: ip.to_canonical(),
        }
    }

    /// The address this matcher compares against
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Returns true if `candidate` parses to the same address.
    pub fn is_match(&self, candidate: &str) -> bool {
        parse_ip(candidate) == Some(self.ip)
    }
}

impl fmt::Display for IpMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ip {}", self.ip)
    }
}

/// Matches any address inside a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrMatcher {
    net: IpNet,
}

impl CidrMatcher {
    /// Create a matcher for `net`.
    ///
    /// Host bits are cleared, so `192.168.1.0/8` covers `192.0.0.0/8`.
    /// An IPv4-mapped IPv6 network with a prefix of at least 96 bits is
    /// stored as the equivalent IPv4 network.
    pub fn new(net: IpNet) -> Self {
        let net = match net {
            IpNet::V6(v6) if v6.prefix_len() >= 96 => match v6.addr().to_ipv4_mapped() {
                Some(v4) => Ipv4Net::new(v4, v6.prefix_len() - 96)
                    .map(IpNet::V4)
                    .unwrap_or(net),
                None => net,
            },
            _ => net,
        };
        Self { net: net.trunc() }
    }

    /// The network this matcher tests containment against
    pub fn network(&self) -> IpNet {
        self.net
    }

    /// Returns true if `candidate` parses to an address inside the network.
    pub fn is_match(&self, candidate: &str) -> bool {
        parse_ip(candidate).map_or(false, |ip| self.net.contains(&ip))
    }
}

impl fmt::Display for CidrMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cidr {}", self.net)
    }
}
