//! Mesh API types

use serde::{Deserialize, Serialize};

use super::common::{EntityKey, MeshEntity, ResourceMetadata, ResourceStatus, API_VERSION_PATH};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EgressFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshServiceDiscovery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_preference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_filter: Option<EgressFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_discovery: Option<MeshServiceDiscovery>,
}

/// Response of the mesh create, describe and update calls
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshData {
    #[serde(default)]
    pub mesh_name: String,
    pub metadata: Option<ResourceMetadata>,
    pub spec: Option<MeshSpec>,
    pub status: Option<ResourceStatus>,
}

impl MeshEntity for MeshData {
    type Spec = MeshSpec;

    const NAME_FIELD: &'static str = "meshName";
    const SCOPED_TO_MESH: bool = false;

    fn collection_path(_key: &EntityKey) -> String {
        format!("{}/meshes", API_VERSION_PATH)
    }

    fn metadata(&self) -> Option<&ResourceMetadata> {
        self.metadata.as_ref()
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn spec(&self) -> Option<&MeshSpec> {
        self.spec.as_ref()
    }
}
