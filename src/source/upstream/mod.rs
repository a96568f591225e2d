use std::{net::SocketAddr, time::Duration};

use dnsclient::{sync::DNSClient, UpstreamServer};
use log::debug;

use super::{AddressSource, SourceError};
use crate::types::IpVersion;

/// An address source that queries a fixed set of DNS servers directly, without an external program.
///
/// Note that this source will simply return the first record that it finds, round-robin DNS and similar
/// setups are therefore not supported.
///
/// This source does not perform any sort of caching, each call to [`AddressSource::lookup()`] will query the servers again.
///
/// To create a new source, use the [`UpstreamSource::from_config()`] function
#[non_exhaustive]
pub struct UpstreamSource {
    client: DNSClient,
}

/// Configuration for [`UpstreamSource`]. Must be supplied when creating an [`UpstreamSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UpstreamSourceConfig {
    /// A list of DNS server addresses (IP address + Port number) to query.
    pub servers: Vec<SocketAddr>,
    /// How long to wait for an answer from a server
    pub timeout: Duration,
}

impl AddressSource for UpstreamSource {
    fn lookup(&self, hostname: &str, version: IpVersion) -> Result<String, SourceError> {
        debug!("Querying {} record for {}", version.record_type(), hostname);
        let first = match version {
            IpVersion::V4 => self
                .client
                .query_a(hostname)
                .map(|addrs| addrs.first().map(|a| a.to_string())),
            IpVersion::V6 => self
                .client
                .query_aaaa(hostname)
                .map(|addrs| addrs.first().map(|a| a.to_string())),
        };
        match first {
            Ok(Some(a)) => Ok(a),
            Ok(None) => Err(SourceError {
                msg: format!(
                    "query for host {} did not return an {} address",
                    hostname, version
                ),
            }),
            Err(e) => Err(e.to_string().into()),
        }
    }
}

impl UpstreamSource {
    /// Create a new [`UpstreamSource`] with the supplied configuration.
    /// Returns an error if no servers were given
    pub fn from_config(
        config: &UpstreamSourceConfig,
    ) -> Result<Box<dyn AddressSource>, SourceError> {
        if config.servers.is_empty() {
            return Err("could not initialize UpstreamSource: no DNS servers configured"
                .to_owned()
                .into());
        }
        let mut client = DNSClient::new(
            config
                .servers
                .iter()
                .copied()
                .map(UpstreamServer::new)
                .collect(),
        );
        client.set_timeout(config.timeout);
        Ok(Box::new(UpstreamSource { client }))
    }
}
