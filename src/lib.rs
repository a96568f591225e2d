//! Main crate for the `netplan_dns_sync` application.
//!
//! The application looks up the A and AAAA records of a hostname and makes sure that
//! both addresses are configured on a netplan interface, rolling back the configuration
//! file if applying it fails.
//!
//! For more information, choose one of the modules below.
//! The following modules might be of interest if you want to add new functionality:
//! - [`source`]s are used to look up the addresses of the hostname
//! - [`validate`] decides whether a looked-up string is usable as an address
//! - [`transaction`] performs the backup/patch/apply/rollback sequence on the netplan file

#![allow(clippy::uninlined_format_args)]

pub mod apply;
pub mod backup;
pub mod config;
pub mod netplan;
pub mod source;
pub mod transaction;
pub mod types;
pub mod validate;
