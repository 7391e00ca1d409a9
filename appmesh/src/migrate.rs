//! Schema version upgrades of stored resource state

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tfplug::types::{Dynamic, DynamicValue, RawState};
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum MigrationError {
    #[error("failed to decode stored state: {0}")]
    Decode(String),

    #[error("state version {version} is newer than the supported version {current}")]
    UnsupportedVersion { version: i64, current: i64 },

    #[error("no upgrade registered from state version {from}")]
    MissingStep { from: i64 },

    #[error("invalid state: {0}")]
    InvalidState(String),
}

pub type MigrationStep = fn(Dynamic) -> Result<Dynamic, MigrationError>;

/// Upgrade steps of one resource type, keyed by the version they start from
#[derive(Debug, Clone)]
pub struct MigrationTable {
    current: i64,
    steps: BTreeMap<i64, MigrationStep>,
}

impl MigrationTable {
    pub fn new(current: i64) -> Self {
        Self {
            current,
            steps: BTreeMap::new(),
        }
    }

    pub fn step(mut self, from: i64, step: MigrationStep) -> Self {
        self.steps.insert(from, step);
        self
    }

    pub fn current_version(&self) -> i64 {
        self.current
    }

    /// Runs every step from `version` up to the current version in order
    pub fn upgrade(&self, version: i64, mut state: Dynamic) -> Result<Dynamic, MigrationError> {
        if version > self.current {
            return Err(MigrationError::UnsupportedVersion {
                version,
                current: self.current,
            });
        }
        for from in version..self.current {
            let step = self
                .steps
                .get(&from)
                .ok_or(MigrationError::MissingStep { from })?;
            debug!("Upgrading state from version {} to {}", from, from + 1);
            state = step(state)?;
        }
        Ok(state)
    }
}

/// Decodes stored state: JSON when present, otherwise the legacy flatmap
pub fn raw_state_to_dynamic(raw: &RawState) -> Result<Dynamic, MigrationError> {
    if let Some(json) = &raw.json {
        return DynamicValue::decode_json(json)
            .map(|state| state.value)
            .map_err(|e| MigrationError::Decode(e.to_string()));
    }
    match &raw.flatmap {
        Some(flatmap) => Ok(flatmap_to_dynamic(flatmap)),
        None => Ok(Dynamic::Null),
    }
}

#[derive(Debug, Default)]
struct FlatNode {
    value: Option<String>,
    children: BTreeMap<String, FlatNode>,
}

/// Rebuilds a tree from `a.0.b = v` style keys
///
/// A `#` child marks a list or set, a `%` child a map. Leaves stay strings
/// since the flatmap carries no types.
pub fn flatmap_to_dynamic(flatmap: &HashMap<String, String>) -> Dynamic {
    let mut root = FlatNode::default();
    for (key, value) in flatmap {
        let mut node = &mut root;
        for part in key.split('.') {
            node = node.children.entry(part.to_string()).or_default();
        }
        node.value = Some(value.clone());
    }
    flat_node_to_dynamic(&root)
}

fn flat_node_to_dynamic(node: &FlatNode) -> Dynamic {
    if node.children.is_empty() {
        return node
            .value
            .as_ref()
            .map_or(Dynamic::Null, |v| Dynamic::String(v.clone()));
    }

    if node.children.contains_key("#") {
        let mut items: Vec<(&String, &FlatNode)> =
            node.children.iter().filter(|(k, _)| *k != "#").collect();
        // List indexes sort numerically; set hashes have no meaningful order.
        items.sort_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX));
        return Dynamic::List(items.into_iter().map(|(_, n)| flat_node_to_dynamic(n)).collect());
    }

    Dynamic::Map(
        node.children
            .iter()
            .filter(|(k, _)| *k != "%")
            .map(|(k, n)| (k.clone(), flat_node_to_dynamic(n)))
            .collect(),
    )
}

fn spec_blocks_mut(state: &mut Dynamic) -> Result<Vec<&mut HashMap<String, Dynamic>>, MigrationError> {
    let Dynamic::Map(fields) = state else {
        return Err(MigrationError::InvalidState(format!(
            "expected an object, got {}",
            state.type_name()
        )));
    };
    Ok(match fields.get_mut("spec") {
        Some(Dynamic::List(items)) => items
            .iter_mut()
            .filter_map(|item| match item {
                Dynamic::Map(spec) => Some(spec),
                _ => None,
            })
            .collect(),
        Some(Dynamic::Map(spec)) => vec![spec],
        _ => Vec::new(),
    })
}

/// Virtual node v0 to v1: `spec.backends` names become `spec.backend` blocks
pub fn virtual_node_v0_to_v1(mut state: Dynamic) -> Result<Dynamic, MigrationError> {
    if state.is_null() {
        return Ok(state);
    }
    for spec in spec_blocks_mut(&mut state)? {
        let Some(backends) = spec.remove("backends") else {
            continue;
        };
        let names: Vec<String> = match backends {
            Dynamic::List(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Dynamic::String(name) if !name.is_empty() => Some(name),
                    _ => None,
                })
                .collect(),
            Dynamic::Null => Vec::new(),
            other => {
                return Err(MigrationError::InvalidState(format!(
                    "spec.backends: expected a set of strings, got {}",
                    other.type_name()
                )))
            }
        };
        let backend = names
            .into_iter()
            .map(|name| {
                let service = HashMap::from([
                    ("virtual_service_name".to_string(), Dynamic::String(name)),
                    ("client_policy".to_string(), Dynamic::List(Vec::new())),
                ]);
                Dynamic::Map(HashMap::from([(
                    "virtual_service".to_string(),
                    Dynamic::List(vec![Dynamic::Map(service)]),
                )]))
            })
            .collect();
        spec.insert("backend".to_string(), Dynamic::List(backend));
    }
    Ok(state)
}

/// Virtual router v0 to v1: `spec.service_names` is gone
pub fn virtual_router_v0_to_v1(mut state: Dynamic) -> Result<Dynamic, MigrationError> {
    if state.is_null() {
        return Ok(state);
    }
    for spec in spec_blocks_mut(&mut state)? {
        spec.remove("service_names");
    }
    Ok(state)
}

pub fn virtual_node_migrations() -> MigrationTable {
    MigrationTable::new(1).step(0, virtual_node_v0_to_v1)
}

pub fn virtual_router_migrations() -> MigrationTable {
    MigrationTable::new(1).step(0, virtual_router_v0_to_v1)
}
