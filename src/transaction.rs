//! The backup → patch → apply → (restore) sequence performed on the netplan file.
//!
//! A transaction moves through the following stages:
//!
//! ```text
//! Start → BackedUp → Mutated → Applied
//!             └──────────┴──→ MutateFailed | ApplyFailed → Restored
//! ```
//!
//! Nothing is touched before the backup exists. Any failure after that point is answered the
//! same way: the backup is copied back over the configuration file and the error is returned.
//! The file is rewritten in place, not atomically; the backup is what guarantees that the
//! original content can be brought back.

use std::{
    fmt::Display,
    fs, io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::{
    apply::{ApplyError, Applier},
    backup::Backup,
    config::Config,
    netplan::{DocumentError, NetplanDocument},
    types::ResolvedAddresses,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Stage {
    Start,
    BackedUp,
    Mutated,
    Applied,
    MutateFailed,
    ApplyFailed,
    Restored,
}
impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Start => "start",
            Stage::BackedUp => "backed up",
            Stage::Mutated => "mutated",
            Stage::Applied => "applied",
            Stage::MutateFailed => "mutate failed",
            Stage::ApplyFailed => "apply failed",
            Stage::Restored => "restored",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("could not back up {} to {}: {source}", .path.display(), .backup.display())]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        source: io::Error,
    },
    #[error("could not read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error("{cause}; restoring from {} failed as well: {source}", .backup.display())]
    Restore {
        cause: Box<TransactionError>,
        backup: PathBuf,
        source: io::Error,
    },
}

impl TransactionError {
    /// The stage the transaction was in when it failed
    pub fn stage(&self) -> Stage {
        match self {
            TransactionError::Backup { .. } => Stage::Start,
            TransactionError::Read { .. }
            | TransactionError::Document(_)
            | TransactionError::Write { .. } => Stage::MutateFailed,
            TransactionError::Apply(_) => Stage::ApplyFailed,
            TransactionError::Restore { cause, .. } => cause.stage(),
        }
    }
}

/// Result of a successful transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Outcome {
    /// Entries appended to the address list, in order
    pub added: Vec<String>,
    /// Whether the configuration was written and applied (false in dry-run mode)
    pub applied: bool,
}

/// A single patch of the netplan file described by a [`Config`].
pub struct Transaction<'a> {
    config: &'a Config,
    applier: &'a dyn Applier,
    dry_run: bool,
}

impl<'a> Transaction<'a> {
    pub fn new(config: &'a Config, applier: &'a dyn Applier) -> Self {
        Transaction {
            config,
            applier,
            dry_run: false,
        }
    }

    /// In dry-run mode the file is only read, no backup is made and nothing is applied
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    /// Make sure both addresses are configured on the interface and apply the result.
    pub fn run(&self, addrs: &ResolvedAddresses) -> Result<Outcome, TransactionError> {
        let entries = addrs.cidrs(self.config.ipv4_prefix, self.config.ipv6_prefix);
        let path = &self.config.config_file;

        if self.dry_run {
            return self.preview(&entries);
        }

        let backup_path = self.config.backup_file();
        let backup =
            Backup::create(path, &backup_path).map_err(|e| TransactionError::Backup {
                path: path.to_owned(),
                backup: backup_path.to_owned(),
                source: e,
            })?;
        debug!("Transaction stage: {}", Stage::BackedUp);

        let result = self.patch(path, &entries).and_then(|added| {
            debug!("Transaction stage: {}", Stage::Mutated);
            info!("Applying configuration");
            self.applier.apply()?;
            Ok(added)
        });

        match result {
            Ok(added) => {
                debug!("Transaction stage: {}", Stage::Applied);
                Ok(Outcome {
                    added,
                    applied: true,
                })
            }
            Err(e) => Err(Self::roll_back(&backup, e)),
        }
    }

    fn preview(&self, entries: &[String]) -> Result<Outcome, TransactionError> {
        let mut doc = self.load(&self.config.config_file)?;
        let added = doc.add_addresses(&self.config.interface, entries)?;
        if added.is_empty() {
            info!("Dry run: all addresses are already configured");
        } else {
            info!("Dry run: would add {}", added.iter().join(", "));
        }
        Ok(Outcome {
            added,
            applied: false,
        })
    }

    fn load(&self, path: &Path) -> Result<NetplanDocument, TransactionError> {
        let text = fs::read_to_string(path).map_err(|e| TransactionError::Read {
            path: path.to_owned(),
            source: e,
        })?;
        Ok(NetplanDocument::parse(&text)?)
    }

    fn patch(&self, path: &Path, entries: &[String]) -> Result<Vec<String>, TransactionError> {
        let mut doc = self.load(path)?;
        let added = doc.add_addresses(&self.config.interface, entries)?;
        for a in &added {
            info!("Added {}", a);
        }
        if added.is_empty() {
            info!(
                "{} already configured on {}",
                entries.iter().join(" and "),
                self.config.interface
            );
        }

        let text = doc.to_yaml()?;
        fs::write(path, text).map_err(|e| TransactionError::Write {
            path: path.to_owned(),
            source: e,
        })?;
        Ok(added)
    }

    fn roll_back(backup: &Backup, cause: TransactionError) -> TransactionError {
        match cause.stage() {
            Stage::ApplyFailed => error!("Failed to apply network configuration, restoring backup"),
            stage => error!("Transaction failed ({}), restoring backup", stage),
        }
        match backup.restore() {
            Ok(_) => {
                debug!("Transaction stage: {}", Stage::Restored);
                cause
            }
            Err(e) => {
                warn!(
                    "Could not restore configuration, the backup is kept at {}",
                    backup.path().display()
                );
                TransactionError::Restore {
                    cause: Box::new(cause),
                    backup: backup.path().to_owned(),
                    source: e,
                }
            }
        }
    }
}
