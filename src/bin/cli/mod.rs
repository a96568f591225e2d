use std::{net::Ipv4Addr, path::PathBuf};

use clap::Parser;
use netplan_dns_sync::config::{
    Config, DEFAULT_APPLY_COMMAND, DEFAULT_CONFIG_FILE, DEFAULT_HOSTNAME, DEFAULT_INTERFACE,
    DEFAULT_IPV4_PREFIX, DEFAULT_IPV6_PREFIX,
};

macro_rules! env_prefix {
    () => {
        "NETPLAN_DNS_"
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Hostname whose A and AAAA records should be configured on the interface
    #[arg(
        long,
        default_value = DEFAULT_HOSTNAME,
        value_name = "HOSTNAME",
        env = concat!(env_prefix!(), "HOSTNAME")
    )]
    pub hostname: String,

    /// Netplan file to patch
    #[arg(
        short = 'c',
        long,
        default_value = DEFAULT_CONFIG_FILE,
        value_name = "PATH",
        env = concat!(env_prefix!(), "CONFIG_FILE")
    )]
    pub config_file: PathBuf,

    /// Interface below `network.ethernets` that receives the addresses
    #[arg(
        long,
        default_value = DEFAULT_INTERFACE,
        value_name = "INTERFACE",
        env = concat!(env_prefix!(), "INTERFACE")
    )]
    pub interface: String,

    /// Prefix length for the IPv4 address
    #[arg(
        long,
        default_value_t = DEFAULT_IPV4_PREFIX,
        value_parser = clap::value_parser!(u8).range(0..=32),
        env = concat!(env_prefix!(), "IPV4_PREFIX")
    )]
    pub ipv4_prefix: u8,

    /// Prefix length for the IPv6 address
    #[arg(
        long,
        default_value_t = DEFAULT_IPV6_PREFIX,
        value_parser = clap::value_parser!(u8).range(0..=128),
        env = concat!(env_prefix!(), "IPV6_PREFIX")
    )]
    pub ipv6_prefix: u8,

    /// How to look up the hostname. dig: run the dig utility, builtin: query DNS servers directly
    #[arg(
        value_enum,
        short = 'r',
        long,
        default_value_t = Resolver::Dig,
        env = concat!(env_prefix!(), "RESOLVER")
    )]
    pub resolver: Resolver,

    /// List of DNS servers to query, as a comma-separated string.
    /// Only has an effect if 'resolver' == 'builtin'
    #[arg(
        long,
        value_name = "SERVER_IP",
        use_value_delimiter = true,
        value_delimiter = ',',
        default_values = ["8.8.8.8", "1.1.1.1"],
        env = concat!(env_prefix!(), "DNS_SERVERS")
    )]
    pub dns_servers: Vec<Ipv4Addr>,

    /// Command that activates the patched configuration
    #[arg(
        long,
        default_value = DEFAULT_APPLY_COMMAND,
        value_name = "COMMAND",
        env = concat!(env_prefix!(), "APPLY_COMMAND")
    )]
    pub apply_command: String,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,

    /// Do not modify or apply the configuration, only show which addresses would be added
    #[arg(long, short = 'd', action, default_value_t = false)]
    pub dry_run: bool,
}

impl From<&Cli> for Config {
    fn from(cli: &Cli) -> Self {
        Config {
            hostname: cli.hostname.to_owned(),
            config_file: cli.config_file.to_owned(),
            interface: cli.interface.to_owned(),
            ipv4_prefix: cli.ipv4_prefix,
            ipv6_prefix: cli.ipv6_prefix,
        }
    }
}

use clap::ValueEnum;
use log::LevelFilter;

/// Which resolver to use for looking up the hostname
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Resolver {
    Dig,
    Builtin,
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log:Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}
