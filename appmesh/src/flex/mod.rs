//! Conversion between Terraform `spec` blocks and App Mesh wire types
//!
//! Expand reads the dynamic configuration tree into the typed request,
//! checking every mutual-exclusion group on the way. Flatten goes the other
//! way and always emits every schema key: absent scalars as null, absent
//! blocks as empty lists.

pub mod error;

mod gateway_route;
mod mesh;
mod route;
mod shared;
mod virtual_gateway;
mod virtual_node;
mod virtual_router;
mod virtual_service;

use std::collections::{BTreeMap, HashMap};
use tfplug::types::{AttributePath, Dynamic};

pub use error::ValidationError;
pub use gateway_route::validate_gateway_route_spec;
pub use mesh::validate_mesh_spec;
pub use route::validate_route_spec;
pub use virtual_gateway::validate_virtual_gateway_spec;
pub use virtual_node::validate_virtual_node_spec;
pub use virtual_router::validate_virtual_router_spec;
pub use virtual_service::validate_virtual_service_spec;

pub type Result<T> = std::result::Result<T, ValidationError>;

/// Builds a wire value from a configuration block
pub trait Expand: Sized {
    fn expand(block: &Block<'_>) -> Result<Self>;
}

/// Builds a union from the block holding its members
///
/// Yields `None` when the chosen member is not known yet.
pub trait ExpandUnion: Sized {
    fn expand_union(block: &Block<'_>) -> Result<Option<Self>>;
}

/// Renders a wire value as the object of its configuration block
pub trait Flatten {
    fn flatten(&self) -> Dynamic;
}

/// The top-level `spec` block of a resource
pub trait SpecCodec: Expand + Flatten + Default {
    /// Whether the resource schema requires the `spec` block
    const REQUIRED: bool = false;

    fn expand_spec(value: Option<&Dynamic>) -> Result<Self> {
        let path = AttributePath::new("spec");
        match Block::singleton(value, path.clone())? {
            Some(block) => Self::expand(&block),
            None if Self::REQUIRED => Err(ValidationError::MissingRequired { path }),
            None => Ok(Self::default()),
        }
    }

    fn flatten_spec(spec: Option<&Self>) -> Dynamic {
        Dynamic::List(spec.map(|s| vec![s.flatten()]).unwrap_or_default())
    }
}

/// Runs the expand checks of a spec without keeping the result
///
/// An unknown spec passes; it is checked again once known.
fn validate_spec<S: SpecCodec>(value: &Dynamic) -> Result<()> {
    if value.is_unknown() {
        return Ok(());
    }
    S::expand_spec(Some(value)).map(|_| ())
}

fn invalid_type(path: AttributePath, expected: &'static str, actual: &Dynamic) -> ValidationError {
    ValidationError::InvalidType {
        path,
        expected,
        actual: actual.type_name(),
    }
}

/// Read access to one object of a configuration block
pub struct Block<'a> {
    path: AttributePath,
    fields: &'a HashMap<String, Dynamic>,
}

impl<'a> Block<'a> {
    /// Reads a singleton block: a list of at most one object, or a bare object
    pub fn singleton(value: Option<&'a Dynamic>, path: AttributePath) -> Result<Option<Block<'a>>> {
        match value {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(None),
            Some(Dynamic::Map(fields)) => Ok(Some(Block { path, fields })),
            Some(Dynamic::List(items)) => match items.first() {
                None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(None),
                Some(Dynamic::Map(fields)) => Ok(Some(Block {
                    path: path.index(0),
                    fields,
                })),
                Some(other) => Err(invalid_type(path.index(0), "object", other)),
            },
            Some(other) => Err(invalid_type(path, "list of objects", other)),
        }
    }

    pub fn path(&self) -> &AttributePath {
        &self.path
    }

    fn value(&self, name: &str) -> Option<&'a Dynamic> {
        self.fields.get(name)
    }

    fn child(&self, name: &str) -> AttributePath {
        self.path.clone().attribute(name)
    }

    pub fn block(&self, name: &str) -> Result<Option<Block<'a>>> {
        Block::singleton(self.value(name), self.child(name))
    }

    pub fn blocks(&self, name: &str) -> Result<Vec<Block<'a>>> {
        let path = self.child(name);
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(Vec::new()),
            Some(Dynamic::List(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    let item_path = path.clone().index(i as i64);
                    match item {
                        Dynamic::Map(fields) => Some(Ok(Block {
                            path: item_path,
                            fields,
                        })),
                        Dynamic::Null | Dynamic::Unknown => None,
                        other => Some(Err(invalid_type(item_path, "object", other))),
                    }
                })
                .collect(),
            Some(other) => Err(invalid_type(path, "list of objects", other)),
        }
    }

    /// Null, unknown and `""` read as unset
    pub fn string(&self, name: &str) -> Result<Option<String>> {
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(None),
            Some(Dynamic::String(s)) if s.is_empty() => Ok(None),
            Some(Dynamic::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(invalid_type(self.child(name), "string", other)),
        }
    }

    /// Null, unknown and `0` read as unset
    pub fn int(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.int_raw(name)?.filter(|n| *n != 0))
    }

    /// Like [`Block::int`] but keeps an explicit `0`
    pub fn int_raw(&self, name: &str) -> Result<Option<i64>> {
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(None),
            Some(Dynamic::Number(n)) => Ok(Some(*n as i64)),
            Some(other) => Err(invalid_type(self.child(name), "number", other)),
        }
    }

    pub fn bool(&self, name: &str) -> Result<Option<bool>> {
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(None),
            Some(Dynamic::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(invalid_type(self.child(name), "bool", other)),
        }
    }

    pub fn strings(&self, name: &str) -> Result<Vec<String>> {
        let path = self.child(name);
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(Vec::new()),
            Some(Dynamic::List(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| match item {
                    Dynamic::String(s) if !s.is_empty() => Some(Ok(s.clone())),
                    Dynamic::String(_) | Dynamic::Null | Dynamic::Unknown => None,
                    other => Some(Err(invalid_type(path.clone().index(i as i64), "string", other))),
                })
                .collect(),
            Some(other) => Err(invalid_type(path, "set of strings", other)),
        }
    }

    pub fn ints(&self, name: &str) -> Result<Vec<i64>> {
        let path = self.child(name);
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(Vec::new()),
            Some(Dynamic::List(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| match item {
                    Dynamic::Number(n) => Some(Ok(*n as i64)),
                    Dynamic::Null | Dynamic::Unknown => None,
                    other => Some(Err(invalid_type(path.clone().index(i as i64), "number", other))),
                })
                .collect(),
            Some(other) => Err(invalid_type(path, "set of numbers", other)),
        }
    }

    pub fn string_map(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let path = self.child(name);
        match self.value(name) {
            None | Some(Dynamic::Null) | Some(Dynamic::Unknown) => Ok(BTreeMap::new()),
            Some(Dynamic::Map(entries)) => entries
                .iter()
                .filter_map(|(k, v)| match v {
                    Dynamic::String(s) => Some(Ok((k.clone(), s.clone()))),
                    Dynamic::Null | Dynamic::Unknown => None,
                    other => Some(Err(invalid_type(path.clone().key(k), "string", other))),
                })
                .collect(),
            Some(other) => Err(invalid_type(path, "map of strings", other)),
        }
    }

    /// Whether the key is present at all, even as an empty block
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.value(name), Some(v) if !v.is_null())
    }

    /// Whether the member has a value; unknown counts as set
    pub fn is_populated(&self, name: &str) -> bool {
        match self.value(name) {
            None | Some(Dynamic::Null) => false,
            Some(Dynamic::Unknown) | Some(Dynamic::Bool(_)) => true,
            Some(Dynamic::String(s)) => !s.is_empty(),
            Some(Dynamic::Number(n)) => *n != 0.0,
            Some(Dynamic::List(items)) => !items.is_empty(),
            Some(Dynamic::Map(entries)) => !entries.is_empty(),
        }
    }

    fn populated(&self, members: &'static [&'static str]) -> Vec<&'static str> {
        members
            .iter()
            .copied()
            .filter(|m| self.is_populated(m))
            .collect()
    }

    /// Checks that exactly one member of the group is set and returns it
    pub fn exactly_one_of(&self, members: &'static [&'static str]) -> Result<&'static str> {
        let populated = self.populated(members);
        match populated.len() {
            1 => Ok(populated[0]),
            0 => Err(ValidationError::MissingOneOf {
                group: self.path.clone(),
                members,
            }),
            _ => Err(ValidationError::ExactlyOneOf {
                group: self.path.clone(),
                members,
                populated,
            }),
        }
    }

    pub fn at_most_one_of(&self, members: &'static [&'static str]) -> Result<Option<&'static str>> {
        let populated = self.populated(members);
        match populated.len() {
            0 => Ok(None),
            1 => Ok(Some(populated[0])),
            _ => Err(ValidationError::AtMostOneOf {
                group: self.path.clone(),
                members,
                populated,
            }),
        }
    }

    pub fn expand<T: Expand>(&self, name: &str) -> Result<Option<T>> {
        self.block(name)?.map(|b| T::expand(&b)).transpose()
    }

    pub fn expand_all<T: Expand>(&self, name: &str) -> Result<Vec<T>> {
        self.blocks(name)?.iter().map(T::expand).collect()
    }

    pub fn expand_union<T: ExpandUnion>(&self, name: &str) -> Result<Option<T>> {
        match self.block(name)? {
            Some(block) => T::expand_union(&block),
            None => Ok(None),
        }
    }
}

/// Assembles the object of one flattened block
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    fields: HashMap<String, Dynamic>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn string(mut self, name: &str, value: Option<&str>) -> Self {
        let value = value.map_or(Dynamic::Null, |s| Dynamic::String(s.to_string()));
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn int(mut self, name: &str, value: Option<i64>) -> Self {
        let value = value.map_or(Dynamic::Null, |n| Dynamic::Number(n as f64));
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn bool(mut self, name: &str, value: Option<bool>) -> Self {
        self.fields
            .insert(name.to_string(), value.map_or(Dynamic::Null, Dynamic::Bool));
        self
    }

    /// An empty set flattens to null
    pub fn strings(mut self, name: &str, values: &[String]) -> Self {
        let value = if values.is_empty() {
            Dynamic::Null
        } else {
            Dynamic::List(values.iter().cloned().map(Dynamic::String).collect())
        };
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn ints(mut self, name: &str, values: &[i64]) -> Self {
        let value = if values.is_empty() {
            Dynamic::Null
        } else {
            Dynamic::List(values.iter().map(|n| Dynamic::Number(*n as f64)).collect())
        };
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn string_map<'s>(
        mut self,
        name: &str,
        entries: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> Self {
        let map: HashMap<String, Dynamic> = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), Dynamic::String(v.to_string())))
            .collect();
        let value = if map.is_empty() {
            Dynamic::Null
        } else {
            Dynamic::Map(map)
        };
        self.fields.insert(name.to_string(), value);
        self
    }

    /// A present block is a one-element list, an absent one `[]`
    pub fn block<T: Flatten>(mut self, name: &str, value: Option<&T>) -> Self {
        let items = value.map(|v| vec![v.flatten()]).unwrap_or_default();
        self.fields.insert(name.to_string(), Dynamic::List(items));
        self
    }

    pub fn blocks<T: Flatten>(mut self, name: &str, values: &[T]) -> Self {
        self.fields.insert(
            name.to_string(),
            Dynamic::List(values.iter().map(Flatten::flatten).collect()),
        );
        self
    }

    pub fn build(self) -> Dynamic {
        Dynamic::Map(self.fields)
    }
}

/// Drops nulls and empty lists so trees that differ only in unset values compare equal
pub fn normalize(value: &Dynamic) -> Dynamic {
    match value {
        Dynamic::Map(fields) => Dynamic::Map(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), normalize(v)))
                .filter(|(_, v)| !is_empty_value(v))
                .collect(),
        ),
        Dynamic::List(items) => Dynamic::List(items.iter().map(normalize).collect()),
        other => other.clone(),
    }
}

fn is_empty_value(value: &Dynamic) -> bool {
    match value {
        Dynamic::Null => true,
        Dynamic::List(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dynamic(value: serde_json::Value) -> Dynamic {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn singleton_accepts_list_or_bare_object() {
        let listed = dynamic(json!([{"type": "ALLOW_ALL"}]));
        let block = Block::singleton(Some(&listed), AttributePath::new("spec"))
            .unwrap()
            .unwrap();
        assert_eq!(block.path().to_string(), "spec[0]");
        assert_eq!(block.string("type").unwrap().as_deref(), Some("ALLOW_ALL"));

        let bare = dynamic(json!({"type": "DROP_ALL"}));
        let block = Block::singleton(Some(&bare), AttributePath::new("spec"))
            .unwrap()
            .unwrap();
        assert_eq!(block.path().to_string(), "spec");

        let empty = dynamic(json!([]));
        assert!(Block::singleton(Some(&empty), AttributePath::new("spec"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn unset_scalars_read_as_none() {
        let value = dynamic(json!({"s": "", "n": 0, "w": 0, "b": false}));
        let block = Block::singleton(Some(&value), AttributePath::root())
            .unwrap()
            .unwrap();

        assert_eq!(block.string("s").unwrap(), None);
        assert_eq!(block.int("n").unwrap(), None);
        assert_eq!(block.int_raw("w").unwrap(), Some(0));
        assert_eq!(block.bool("b").unwrap(), Some(false));
        assert_eq!(block.string("missing").unwrap(), None);
    }

    #[test]
    fn wrong_scalar_type_is_reported_with_path() {
        let value = dynamic(json!([{"port": "eighty"}]));
        let block = Block::singleton(Some(&value), AttributePath::new("port_mapping"))
            .unwrap()
            .unwrap();

        let err = block.int("port").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidType {
                path: AttributePath::new("port_mapping").index(0).attribute("port"),
                expected: "number",
                actual: "string",
            }
        );
    }

    #[test]
    fn exactly_one_of_reports_all_populated_members() {
        let value = dynamic(json!({"acm": [{}], "file": [{"certificate_chain": "c"}], "sds": []}));
        let block = Block::singleton(Some(&value), AttributePath::new("certificate"))
            .unwrap()
            .unwrap();

        match block.exactly_one_of(&["acm", "file", "sds"]) {
            Err(ValidationError::ExactlyOneOf { populated, .. }) => {
                assert_eq!(populated, vec!["acm", "file"])
            }
            other => panic!("expected ExactlyOneOf, got {:?}", other),
        }
    }

    #[test]
    fn unknown_member_counts_as_populated() {
        let value = Dynamic::Map(HashMap::from([("sds".to_string(), Dynamic::Unknown)]));
        let block = Block::singleton(Some(&value), AttributePath::root())
            .unwrap()
            .unwrap();
        assert_eq!(block.exactly_one_of(&["file", "sds"]).unwrap(), "sds");
    }

    #[test]
    fn normalize_prunes_unset_values() {
        let value = dynamic(json!({"a": null, "b": [], "c": [{"d": null, "e": "x"}], "f": 0}));
        assert_eq!(
            normalize(&value),
            dynamic(json!({"c": [{"e": "x"}], "f": 0}))
        );
    }
}
