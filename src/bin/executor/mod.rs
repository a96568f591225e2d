use log::{debug, info};
use thiserror::Error;

use netplan_dns_sync::{
    apply::Applier,
    config::Config,
    source::{AddressSource, SourceError},
    transaction::{Outcome, Transaction, TransactionError},
    types::{IpVersion, ResolvedAddresses},
    validate,
};

/// An executor performs the complete set of actions needed to bring the interface addresses up-to-date
pub struct Executor<'a> {
    source: &'a dyn AddressSource,
    applier: &'a dyn Applier,
    config: &'a Config,
    dry_run: bool,
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Could not get valid {version} for {hostname}: {source}")]
    Lookup {
        version: IpVersion,
        hostname: String,
        source: SourceError,
    },
    #[error("Could not get valid {version} for {hostname}: `{literal}` is not an {version} address")]
    Invalid {
        version: IpVersion,
        hostname: String,
        literal: String,
    },
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl<'a> Executor<'a> {
    pub fn new(
        source: &'a dyn AddressSource,
        applier: &'a dyn Applier,
        config: &'a Config,
        dry_run: bool,
    ) -> Executor<'a> {
        Self {
            source,
            applier,
            config,
            dry_run,
        }
    }

    pub fn run(&self) -> Result<Outcome, ExecutorError> {
        info!("Querying DNS for {}...", self.config.hostname);
        let ipv4 = self.resolve(IpVersion::V4)?;
        let ipv6 = self.resolve(IpVersion::V6)?;
        let addrs = ResolvedAddresses {
            hostname: self.config.hostname.to_owned(),
            ipv4,
            ipv6,
        };
        info!("Found: IPv4={}, IPv6={}", addrs.ipv4, addrs.ipv6);

        let mut transaction = Transaction::new(self.config, self.applier);
        transaction.set_dry_run(self.dry_run);
        Ok(transaction.run(&addrs)?)
    }

    // Look up and validate a single address. Any failure here aborts the run before the configuration is touched
    fn resolve(&self, version: IpVersion) -> Result<String, ExecutorError> {
        let literal = self
            .source
            .lookup(&self.config.hostname, version)
            .map_err(|e| ExecutorError::Lookup {
                version,
                hostname: self.config.hostname.to_owned(),
                source: e,
            })?;
        debug!("{} lookup returned {}", version.record_type(), literal);

        if validate::is_valid(&literal, version) {
            Ok(literal)
        } else {
            Err(ExecutorError::Invalid {
                version,
                hostname: self.config.hostname.to_owned(),
                literal,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use netplan_dns_sync::{
        apply::{ApplyError, MockApplier},
        netplan::NetplanDocument,
        source::MockAddressSource,
    };
    use tempfile::TempDir;

    use super::*;

    const EMPTY: &str = "network:\n  version: 2\n  ethernets:\n    eth0:\n      dhcp4: true\n";

    fn setup(content: &str) -> (TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("50-cloud-init.yaml");
        fs::write(&config_file, content).unwrap();
        (
            dir,
            Config {
                hostname: "mail.example.org".to_owned(),
                config_file,
                ..Default::default()
            },
        )
    }

    fn source(ipv4: &'static str, ipv6: &'static str) -> MockAddressSource {
        let mut s = MockAddressSource::new();
        s.expect_lookup().returning(move |_, version| match version {
            IpVersion::V4 => Ok(ipv4.to_owned()),
            IpVersion::V6 => Ok(ipv6.to_owned()),
        });
        s
    }

    fn applier(times: usize) -> MockApplier {
        let mut a = MockApplier::new();
        a.expect_apply().times(times).returning(|| Ok(()));
        a
    }

    fn configured(config: &Config) -> Vec<String> {
        NetplanDocument::parse(&fs::read_to_string(&config.config_file).unwrap())
            .unwrap()
            .addresses(&config.interface)
            .unwrap()
    }

    #[test]
    fn should_configure_resolved_addresses() {
        let (_dir, config) = setup(EMPTY);
        let s = source("198.51.100.7", "2001:db8::7");
        let a = applier(1);

        let outcome = Executor::new(&s, &a, &config, false).run().unwrap();

        assert!(outcome.applied);
        assert_eq!(
            configured(&config),
            vec!["198.51.100.7/24".to_owned(), "2001:db8::7/64".to_owned()]
        );
    }

    #[test]
    fn should_succeed_when_nothing_changes() {
        let (_dir, config) = setup(
            "network:\n  ethernets:\n    eth0:\n      addresses:\n      - 203.0.113.5/24\n      - 2001:db8::5/64\n",
        );
        let s = source("203.0.113.5", "2001:db8::5");
        let a = applier(1);

        let outcome = Executor::new(&s, &a, &config, false).run().unwrap();
        assert!(outcome.added.is_empty());
        assert_eq!(configured(&config).len(), 2);
    }

    #[test]
    fn should_abort_on_invalid_ipv4_before_backup() {
        let (_dir, config) = setup(EMPTY);
        let s = source("not-an-ip", "2001:db8::7");
        let a = applier(0);

        let e = Executor::new(&s, &a, &config, false).run().unwrap_err();

        assert!(matches!(
            e,
            ExecutorError::Invalid {
                version: IpVersion::V4,
                ..
            }
        ));
        assert!(e.to_string().contains("IPv4"));
        assert!(!config.backup_file().exists());
        assert_eq!(fs::read_to_string(&config.config_file).unwrap(), EMPTY);
    }

    #[test]
    fn should_abort_on_invalid_ipv6() {
        let (_dir, config) = setup(EMPTY);
        let s = source("198.51.100.7", "mail.example.org.");
        let a = applier(0);

        let e = Executor::new(&s, &a, &config, false).run().unwrap_err();

        assert!(matches!(
            e,
            ExecutorError::Invalid {
                version: IpVersion::V6,
                ..
            }
        ));
        assert!(!config.backup_file().exists());
    }

    #[test]
    fn should_abort_on_failed_lookup() {
        let (_dir, config) = setup(EMPTY);
        let mut s = MockAddressSource::new();
        s.expect_lookup()
            .times(1)
            .returning(|_, _| Err("A query for host mail.example.org timed out".to_owned().into()));
        let a = applier(0);

        let e = Executor::new(&s, &a, &config, false).run().unwrap_err();

        assert!(matches!(e, ExecutorError::Lookup { .. }));
        assert_eq!(fs::read_to_string(&config.config_file).unwrap(), EMPTY);
        assert!(!config.backup_file().exists());
    }

    #[test]
    fn should_query_configured_hostname() {
        let (_dir, config) = setup(EMPTY);
        let mut s = MockAddressSource::new();
        s.expect_lookup()
            .withf(|hostname, _| hostname.to_string() == "mail.example.org")
            .times(2)
            .returning(|_, version| match version {
                IpVersion::V4 => Ok("198.51.100.7".to_owned()),
                IpVersion::V6 => Ok("2001:db8::7".to_owned()),
            });
        let a = applier(1);

        assert!(Executor::new(&s, &a, &config, false).run().is_ok());
    }

    #[test]
    fn should_roll_back_when_apply_fails() {
        let (_dir, config) = setup(EMPTY);
        let s = source("198.51.100.7", "2001:db8::7");
        let mut a = MockApplier::new();
        a.expect_apply().times(1).returning(|| {
            Err(ApplyError::Failed {
                command: "netplan apply".to_owned(),
                code: Some(78),
                stderr: "eth0: unknown key 'adresses'".to_owned(),
            })
        });

        let e = Executor::new(&s, &a, &config, false).run().unwrap_err();

        assert!(matches!(
            e,
            ExecutorError::Transaction(TransactionError::Apply(_))
        ));
        assert!(e.to_string().contains("unknown key"));
        assert_eq!(fs::read_to_string(&config.config_file).unwrap(), EMPTY);
    }

    #[test]
    fn should_leave_file_alone_in_dry_run() {
        let (_dir, config) = setup(EMPTY);
        let s = source("198.51.100.7", "2001:db8::7");
        let a = applier(0);

        let outcome = Executor::new(&s, &a, &config, true).run().unwrap();

        assert_eq!(outcome.added.len(), 2);
        assert!(!outcome.applied);
        assert_eq!(fs::read_to_string(&config.config_file).unwrap(), EMPTY);
    }
}
