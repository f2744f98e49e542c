use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

const DEFAULT_DNS_PORT: u16 = 53;

/// An upstream recursive resolver.
///
/// Parsed from `"ip"`, `"ip:port"` or `"[v6]:port"`; the port defaults to 53.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ForwardTarget {
    pub address: SocketAddr,
}

impl ForwardTarget {
    pub fn new(address: SocketAddr) -> Self {
        Self { address }
    }
}

impl FromStr for ForwardTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self::new(addr));
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::new(SocketAddr::new(ip, DEFAULT_DNS_PORT)));
        }
        Err(format!("Invalid forwarding server address: {}", s))
    }
}

impl TryFrom<String> for ForwardTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ForwardTarget> for String {
    fn from(target: ForwardTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for ForwardTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
