//! Ways to look up the addresses of a hostname.
//! Each source implements the [`AddressSource`] trait.
//!
//! The following sources are currently available:
//! - [`DigSource`]: Runs the `dig` utility and reads its short-form answer
//! - [`UpstreamSource`]: Queries a list of DNS servers directly

mod dig;
mod upstream;

pub use dig::{DigSource, DigSourceConfig};
pub use upstream::{UpstreamSource, UpstreamSourceConfig};

use std::fmt::Display;

use mockall::automock;

use crate::types::IpVersion;

/// An `AddressSource` looks up a single address literal of the requested version for a hostname.
///
/// Sources make no distinction between a hostname without a matching record and a failed query,
/// both are reported as a [`SourceError`].
#[automock]
pub trait AddressSource {
    fn lookup(&self, hostname: &str, version: IpVersion) -> Result<String, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceError {
    msg: String,
}
impl Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}
impl std::error::Error for SourceError {}
impl From<String> for SourceError {
    fn from(s: String) -> Self {
        SourceError { msg: s }
    }
}

// Returns the first non-empty line of a query answer
fn first_line(output: &str) -> Option<String> {
    output
        .trim()
        .lines()
        .next()
        .map(|l| l.trim().to_owned())
        .filter(|l| !l.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_take_first_line() {
        assert_eq!(
            first_line("203.0.113.5\n203.0.113.6\n"),
            Some("203.0.113.5".to_owned())
        );
    }

    #[test]
    fn should_skip_surrounding_whitespace() {
        assert_eq!(
            first_line("\n  2001:db8::7  \n"),
            Some("2001:db8::7".to_owned())
        );
    }

    #[test]
    fn should_return_none_for_empty_output() {
        assert_eq!(first_line(""), None);
        assert_eq!(first_line(" \n\t\n"), None);
    }
}
