//! Activating the patched configuration on the host.

use std::process::Command;

use log::{debug, trace};
use mockall::automock;
use thiserror::Error;

use crate::config::DEFAULT_APPLY_COMMAND;

/// An `Applier` makes the on-disk network configuration take effect.
#[automock]
pub trait Applier {
    fn apply(&self) -> Result<(), ApplyError>;
}

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("could not run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs an external command (`netplan apply` by default) and reports its exit status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandApplier {
    program: String,
    args: Vec<String>,
}

impl Default for CommandApplier {
    fn default() -> Self {
        // The default command line is never empty
        let mut words = DEFAULT_APPLY_COMMAND.split_whitespace().map(str::to_owned);
        CommandApplier {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
        }
    }
}

impl CommandApplier {
    /// Build an applier from a whitespace-separated command line.
    /// Returns [`None`] if the command line is empty
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace().map(str::to_owned);
        let program = words.next()?;
        Some(CommandApplier {
            program,
            args: words.collect(),
        })
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Applier for CommandApplier {
    fn apply(&self) -> Result<(), ApplyError> {
        debug!("Running `{}`", self.command_line());
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| ApplyError::Spawn {
                command: self.command_line(),
                source: e,
            })?;
        trace!("`{}` exited with {}", self.command_line(), output.status);

        if output.status.success() {
            Ok(())
        } else {
            Err(ApplyError::Failed {
                command: self.command_line(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_netplan_apply() {
        let a = CommandApplier::default();
        assert_eq!(a.program, "netplan");
        assert_eq!(a.args, vec!["apply".to_owned()]);
    }

    #[test]
    fn should_split_command_line() {
        let a = CommandApplier::from_command_line("  netplan   --debug apply ").unwrap();
        assert_eq!(a.command_line(), "netplan --debug apply");
        assert!(CommandApplier::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn should_succeed_on_zero_exit() {
        let a = CommandApplier::from_command_line("true").unwrap();
        assert!(a.apply().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn should_surface_stderr_on_failure() {
        let a = CommandApplier::from_command_line("ls /nonexistent/netplan.yaml").unwrap();
        match a.apply() {
            Err(ApplyError::Failed { code, stderr, .. }) => {
                assert_ne!(code, Some(0));
                assert!(!stderr.is_empty());
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn should_fail_on_missing_program() {
        let a = CommandApplier::from_command_line("/nonexistent/netplan apply").unwrap();
        assert!(matches!(a.apply(), Err(ApplyError::Spawn { .. })));
    }
}
