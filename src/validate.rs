//! Syntactic checks for looked-up address literals.
//!
//! The checks are intentionally shallow: an IPv4 literal is four dot-separated groups of
//! one to three digits (octets are not range-checked, `999.999.999.999` is accepted) and an
//! IPv6 literal is any non-empty run of hex digits and colons.

use crate::types::IpVersion;

/// Returns whether `literal` looks like an address of the given version.
pub fn is_valid(literal: &str, version: IpVersion) -> bool {
    match version {
        IpVersion::V4 => looks_like_ipv4(literal),
        IpVersion::V6 => looks_like_ipv6(literal),
    }
}

fn looks_like_ipv4(literal: &str) -> bool {
    let groups: Vec<&str> = literal.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| (1..=3).contains(&g.len()) && g.bytes().all(|b| b.is_ascii_digit()))
}

fn looks_like_ipv6(literal: &str) -> bool {
    !literal.is_empty() && literal.chars().all(|c| c == ':' || c.is_ascii_hexdigit())
}
