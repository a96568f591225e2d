use std::path::{Path, PathBuf};

pub const DEFAULT_HOSTNAME: &str = "mail.club77.org";
pub const DEFAULT_CONFIG_FILE: &str = "/etc/netplan/50-cloud-init.yaml";
pub const DEFAULT_INTERFACE: &str = "eth0";
pub const DEFAULT_IPV4_PREFIX: u8 = 24;
pub const DEFAULT_IPV6_PREFIX: u8 = 64;
pub const DEFAULT_APPLY_COMMAND: &str = "netplan apply";

const BACKUP_SUFFIX: &str = ".backup";

/// Everything the transaction needs to know about the host it is patching.
/// Built once at startup and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Config {
    /// The hostname whose A and AAAA records should be configured
    pub hostname: String,
    /// Path to the netplan document to patch
    pub config_file: PathBuf,
    /// Name of the interface below `network.ethernets`
    pub interface: String,
    /// Prefix length appended to the IPv4 address
    pub ipv4_prefix: u8,
    /// Prefix length appended to the IPv6 address
    pub ipv6_prefix: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hostname: DEFAULT_HOSTNAME.to_owned(),
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
            interface: DEFAULT_INTERFACE.to_owned(),
            ipv4_prefix: DEFAULT_IPV4_PREFIX,
            ipv6_prefix: DEFAULT_IPV6_PREFIX,
        }
    }
}

impl Config {
    /// The sibling path the configuration file is copied to before it is modified.
    pub fn backup_file(&self) -> PathBuf {
        backup_path(&self.config_file)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(BACKUP_SUFFIX);
    PathBuf::from(s)
}
