//! Common types and utilities for the App Mesh API

use chrono::{DateTime, SecondsFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub const API_VERSION_PATH: &str = "/v20190125";

/// Status value App Mesh reports for an entity that is being torn down
pub const STATUS_DELETED: &str = "DELETED";

/// Error body App Mesh sends alongside the `x-amzn-ErrorType` header
#[derive(Debug, Deserialize)]
pub struct AwsErrorBody {
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    #[serde(default)]
    pub arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh_owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_owner: Option<String>,
    #[serde(default)]
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl ResourceMetadata {
    pub fn created_date(&self) -> Option<String> {
        epoch_to_rfc3339(self.created_at)
    }

    pub fn last_updated_date(&self) -> Option<String> {
        epoch_to_rfc3339(self.last_updated_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub status: String,
}

impl ResourceStatus {
    pub fn is_deleted(&self) -> bool {
        self.status == STATUS_DELETED
    }
}

/// Epoch seconds (possibly fractional) as an RFC 3339 UTC timestamp
pub fn epoch_to_rfc3339(timestamp: Option<f64>) -> Option<String> {
    let ts = timestamp?;
    let secs = ts.floor() as i64;
    let nanos = ((ts - ts.floor()) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(secs, nanos).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Identifies one entity within a mesh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityKey {
    pub mesh_name: String,
    pub mesh_owner: Option<String>,
    /// Owning virtual router or virtual gateway for routes
    pub parent: Option<String>,
    pub name: String,
}

impl EntityKey {
    pub fn mesh(name: &str) -> Self {
        Self {
            mesh_name: name.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn new(mesh_name: &str, name: &str) -> Self {
        Self {
            mesh_name: mesh_name.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_owner(mut self, mesh_owner: Option<String>) -> Self {
        self.mesh_owner = mesh_owner.filter(|o| !o.is_empty());
        self
    }

    /// `mesh/name` or `mesh/parent/name`, used in messages and import IDs
    pub fn display_id(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}/{}/{}", self.mesh_name, parent, self.name),
            None if self.mesh_name == self.name => self.name.clone(),
            None => format!("{}/{}", self.mesh_name, self.name),
        }
    }

    pub(crate) fn encoded_mesh(&self) -> String {
        urlencoding::encode(&self.mesh_name).into_owned()
    }

    pub(crate) fn encoded_parent(&self) -> String {
        urlencoding::encode(self.parent.as_deref().unwrap_or_default()).into_owned()
    }
}

/// An App Mesh entity as returned by its describe call
pub trait MeshEntity: DeserializeOwned + Debug + Send + Sync + 'static {
    type Spec: Serialize + DeserializeOwned + Clone + Debug + Default + PartialEq + Send + Sync;

    /// JSON field carrying the entity name in create requests
    const NAME_FIELD: &'static str;

    /// Whether calls on this entity take the `meshOwner` parameter
    const SCOPED_TO_MESH: bool = true;

    fn collection_path(key: &EntityKey) -> String;

    fn resource_path(key: &EntityKey) -> String {
        format!(
            "{}/{}",
            Self::collection_path(key),
            urlencoding::encode(&key.name)
        )
    }

    fn metadata(&self) -> Option<&ResourceMetadata>;
    fn status(&self) -> Option<&ResourceStatus>;
    fn spec(&self) -> Option<&Self::Spec>;
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn add_optional<K: Into<String>, V: ToString>(mut self, key: K, value: Option<V>) -> Self {
        if let Some(v) = value {
            self.params.push((key.into(), v.to_string()));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }

        let query = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        format!("?{}", query)
    }
}
