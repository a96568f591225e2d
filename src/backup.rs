use std::{
    fs::{self, FileTimes, OpenOptions},
    io,
    path::{Path, PathBuf},
};

use log::debug;

/// A byte-for-byte copy of a file that can be written back over the original.
///
/// Creating a backup overwrites whatever was at the backup path before.
/// The backup is left on disk after the run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backup {
    original: PathBuf,
    backup: PathBuf,
}

impl Backup {
    /// Copy `original` to `backup`, keeping its permissions and timestamps.
    pub fn create(original: &Path, backup: &Path) -> io::Result<Backup> {
        copy_with_metadata(original, backup)?;
        debug!("Backed up {} to {}", original.display(), backup.display());
        Ok(Backup {
            original: original.to_owned(),
            backup: backup.to_owned(),
        })
    }

    /// Overwrite the original file with the backup contents.
    pub fn restore(&self) -> io::Result<()> {
        copy_with_metadata(&self.backup, &self.original)?;
        debug!(
            "Restored {} from {}",
            self.original.display(),
            self.backup.display()
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.backup
    }
}

// fs::copy keeps the permission bits, timestamps are carried over separately
fn copy_with_metadata(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::metadata(from)?;
    fs::copy(from, to)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    OpenOptions::new().write(true).open(to)?.set_times(times)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn should_copy_contents_and_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("50-cloud-init.yaml");
        let backup = dir.path().join("50-cloud-init.yaml.backup");
        fs::write(&original, "network:\n  version: 2\n").unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        OpenOptions::new()
            .write(true)
            .open(&original)
            .unwrap()
            .set_modified(mtime)
            .unwrap();

        Backup::create(&original, &backup).unwrap();

        assert_eq!(fs::read(&backup).unwrap(), fs::read(&original).unwrap());
        assert_eq!(fs::metadata(&backup).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn should_overwrite_previous_backup() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.yaml");
        let backup = dir.path().join("a.yaml.backup");
        fs::write(&original, "new").unwrap();
        fs::write(&backup, "stale backup from an earlier run").unwrap();

        Backup::create(&original, &backup).unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), "new");
    }

    #[test]
    fn should_restore_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("a.yaml");
        let backup = dir.path().join("a.yaml.backup");
        fs::write(&original, "before").unwrap();

        let b = Backup::create(&original, &backup).unwrap();
        fs::write(&original, "after, but broken").unwrap();
        b.restore().unwrap();

        assert_eq!(fs::read_to_string(&original).unwrap(), "before");
        assert_eq!(b.path(), backup.as_path());
    }

    #[test]
    fn should_fail_for_missing_original() {
        let dir = tempfile::tempdir().unwrap();
        let r = Backup::create(&dir.path().join("missing.yaml"), &dir.path().join("x"));
        assert!(r.is_err());
        assert!(!dir.path().join("x").exists());
    }
}
