use std::{process::Stdio, time::Duration};

use log::{debug, trace};
use tokio::{process::Command, runtime, time::timeout};

use super::{first_line, AddressSource, SourceError};
use crate::types::IpVersion;

/// An address source that runs `dig +short` and returns the first line of its answer.
///
/// `dig` handles per-attempt timeouts and retries itself, this source additionally enforces
/// an upper bound on the total runtime and kills the process once it is exceeded.
///
/// To create a new source, use the [`DigSource::from_config()`] function
#[derive(Debug)]
#[non_exhaustive]
pub struct DigSource {
    config: DigSourceConfig,
}

/// Configuration for [`DigSource`]. Must be supplied when creating a [`DigSource`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigSourceConfig {
    /// The program to run
    pub program: String,
    /// Seconds `dig` waits for a single answer (`+time`)
    pub query_timeout: u32,
    /// Number of attempts `dig` makes (`+tries`)
    pub tries: u32,
    /// Total wall-clock time after which the query is abandoned
    pub total_timeout: Duration,
}

impl Default for DigSourceConfig {
    fn default() -> Self {
        DigSourceConfig {
            program: "dig".to_owned(),
            query_timeout: 5,
            tries: 3,
            total_timeout: Duration::from_secs(15),
        }
    }
}

impl DigSource {
    /// Create a new [`DigSource`] with the supplied configuration.
    pub fn from_config(config: &DigSourceConfig) -> Box<dyn AddressSource> {
        Box::new(DigSource {
            config: config.to_owned(),
        })
    }

    fn args(&self, hostname: &str, version: IpVersion) -> Vec<String> {
        vec![
            "+short".to_owned(),
            format!("+time={}", self.config.query_timeout),
            format!("+tries={}", self.config.tries),
            hostname.to_owned(),
            version.record_type().to_owned(),
        ]
    }
}

impl AddressSource for DigSource {
    fn lookup(&self, hostname: &str, version: IpVersion) -> Result<String, SourceError> {
        let args = self.args(hostname, version);
        debug!("Running {} {}", self.config.program, args.join(" "));

        let rt = runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| format!("could not start runtime for {}: {}", self.config.program, e))?;

        let output = rt.block_on(async {
            let child = Command::new(&self.config.program)
                .args(&args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output();
            timeout(self.config.total_timeout, child).await
        });

        let output = match output {
            Ok(Ok(o)) => o,
            Ok(Err(e)) => {
                return Err(format!("could not run {}: {}", self.config.program, e).into());
            }
            Err(_) => {
                return Err(format!(
                    "{} query for host {} timed out after {:?}",
                    version.record_type(),
                    hostname,
                    self.config.total_timeout
                )
                .into());
            }
        };
        trace!("{} exited with {}", self.config.program, output.status);

        if !output.status.success() {
            return Err(format!(
                "{} query for host {} failed ({}): {}",
                version.record_type(),
                hostname,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )
            .into());
        }

        first_line(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            format!(
                "{} query for host {} did not return an answer",
                version.record_type(),
                hostname
            )
            .into()
        })
    }
}
