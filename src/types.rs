use std::fmt::Display;

/// The two address families we look up and configure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    /// DNS record type holding addresses of this version
    pub fn record_type(&self) -> &'static str {
        match self {
            IpVersion::V4 => "A",
            IpVersion::V6 => "AAAA",
        }
    }
}

impl Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "IPv4"),
            IpVersion::V6 => write!(f, "IPv6"),
        }
    }
}

/// A validated pair of address literals looked up for a hostname.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedAddresses {
    pub hostname: String,
    pub ipv4: String,
    pub ipv6: String,
}

impl ResolvedAddresses {
    /// The address/prefix entries to put into the interface, IPv4 first.
    pub fn cidrs(&self, ipv4_prefix: u8, ipv6_prefix: u8) -> [String; 2] {
        [
            format!("{}/{}", self.ipv4, ipv4_prefix),
            format!("{}/{}", self.ipv6, ipv6_prefix),
        ]
    }
}

impl Display for ResolvedAddresses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: IPv4={}, IPv6={}",
            self.hostname, self.ipv4, self.ipv6
        )
    }
}
