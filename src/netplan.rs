//! Reading and patching netplan YAML documents.
//!
//! Only the `network.ethernets.<interface>.addresses` list is ever touched, every other key
//! is carried through unchanged and in its original order.

use log::trace;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const NETWORK_KEY: &str = "network";
const ETHERNETS_KEY: &str = "ethernets";
const ADDRESSES_KEY: &str = "addresses";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("could not parse netplan document: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error("could not serialize netplan document: {0}")]
    Serialize(#[source] serde_yaml::Error),
    #[error("unexpected netplan structure: `{path}` is not a {expected}")]
    Structure { path: String, expected: &'static str },
}

/// A parsed netplan document.
#[derive(Debug, Clone, PartialEq)]
pub struct NetplanDocument {
    root: Value,
}

impl NetplanDocument {
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        if text.trim().is_empty() {
            return Ok(NetplanDocument { root: Value::Null });
        }
        let root: Value = serde_yaml::from_str(text).map_err(DocumentError::Parse)?;
        Ok(NetplanDocument { root })
    }

    /// Serialize the document in block style, keeping keys in insertion order.
    pub fn to_yaml(&self) -> Result<String, DocumentError> {
        serde_yaml::to_string(&self.root).map_err(DocumentError::Serialize)
    }

    /// The string entries currently configured for `interface`.
    /// Missing keys along the way count as an empty list.
    pub fn addresses(&self, interface: &str) -> Result<Vec<String>, DocumentError> {
        let mut node = Some(&self.root);
        let mut path = String::new();
        for key in [NETWORK_KEY, ETHERNETS_KEY, interface] {
            node = match node {
                None | Some(Value::Null) => return Ok(vec![]),
                Some(Value::Mapping(m)) => m.get(key),
                Some(_) => return Err(not_a(&path, "mapping")),
            };
            push_path(&mut path, key);
        }
        let iface = match node {
            None | Some(Value::Null) => return Ok(vec![]),
            Some(Value::Mapping(m)) => m,
            Some(_) => return Err(not_a(&path, "mapping")),
        };
        push_path(&mut path, ADDRESSES_KEY);
        match iface.get(ADDRESSES_KEY) {
            None | Some(Value::Null) => Ok(vec![]),
            Some(Value::Sequence(s)) => Ok(s
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()),
            Some(_) => Err(not_a(&path, "list")),
        }
    }

    /// Append each of `entries` to the address list of `interface` unless it is already present.
    /// Missing keys along the way are created. Returns the entries that were added, in order.
    pub fn add_addresses(
        &mut self,
        interface: &str,
        entries: &[String],
    ) -> Result<Vec<String>, DocumentError> {
        let list = self.address_list_mut(interface)?;
        let mut added = Vec::new();
        for entry in entries {
            if list.iter().any(|v| v.as_str() == Some(entry.as_str())) {
                trace!("{} is already configured", entry);
                continue;
            }
            list.push(Value::String(entry.to_owned()));
            added.push(entry.to_owned());
        }
        Ok(added)
    }

    fn address_list_mut(&mut self, interface: &str) -> Result<&mut Vec<Value>, DocumentError> {
        if self.root.is_null() {
            self.root = Value::Mapping(Mapping::new());
        }
        let root = match &mut self.root {
            Value::Mapping(m) => m,
            _ => return Err(not_a("", "mapping")),
        };

        let mut path = String::new();
        let mut node = root;
        for key in [NETWORK_KEY, ETHERNETS_KEY, interface] {
            push_path(&mut path, key);
            node = child_mapping(node, key, &path)?;
        }

        push_path(&mut path, ADDRESSES_KEY);
        let slot = node
            .entry(Value::from(ADDRESSES_KEY))
            .or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Sequence(Vec::new());
        }
        match slot {
            Value::Sequence(s) => Ok(s),
            _ => Err(not_a(&path, "list")),
        }
    }
}

// Descend into `key`, replacing a missing or null value with an empty mapping
fn child_mapping<'a>(
    parent: &'a mut Mapping,
    key: &str,
    path: &str,
) -> Result<&'a mut Mapping, DocumentError> {
    let slot = parent.entry(Value::from(key)).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Mapping(Mapping::new());
    }
    match slot {
        Value::Mapping(m) => Ok(m),
        _ => Err(not_a(path, "mapping")),
    }
}

fn push_path(path: &mut String, key: &str) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(key);
}

fn not_a(path: &str, expected: &'static str) -> DocumentError {
    DocumentError::Structure {
        path: if path.is_empty() {
            "<document root>".to_owned()
        } else {
            path.to_owned()
        },
        expected,
    }
}
