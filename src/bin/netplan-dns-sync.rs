mod cli;
mod executor;

use std::{
    net::{IpAddr, SocketAddr},
    process::ExitCode,
    time::Duration,
};

use clap::Parser;
use env_logger::{Builder, Target};
use log::{error, info};

use netplan_dns_sync::{
    apply::CommandApplier,
    config::Config,
    source::{self, AddressSource, SourceError},
};

use cli::{Cli, Resolver};
use executor::Executor;

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(cli.loglevel.into())
        .target(Target::Stdout)
        .init();

    if cli.dry_run {
        info!("Running in dry-run mode, the network configuration will not be modified");
    }

    let config = Config::from(&cli);

    let source = match get_source(&cli) {
        Ok(s) => s,
        Err(e) => {
            error!("Unable to create address source: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let applier = match CommandApplier::from_command_line(&cli.apply_command) {
        Some(a) => a,
        None => {
            error!("The apply command must not be empty");
            return ExitCode::FAILURE;
        }
    };

    match Executor::new(source.as_ref(), &applier, &config, cli.dry_run).run() {
        Ok(outcome) => {
            if outcome.applied {
                info!("Successfully updated netplan configuration");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn get_source(cli: &Cli) -> Result<Box<dyn AddressSource>, SourceError> {
    match cli.resolver {
        Resolver::Dig => Ok(source::DigSource::from_config(
            &source::DigSourceConfig::default(),
        )),
        Resolver::Builtin => source::UpstreamSource::from_config(&source::UpstreamSourceConfig {
            servers: cli
                .dns_servers
                .iter()
                .map(|ip4| SocketAddr::new(IpAddr::V4(ip4.to_owned()), 53))
                .collect(),
            timeout: UPSTREAM_TIMEOUT,
        }),
    }
}
