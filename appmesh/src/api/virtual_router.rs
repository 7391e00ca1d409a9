//! Virtual router API types

use serde::{Deserialize, Serialize};

use super::common::{EntityKey, MeshEntity, ResourceMetadata, ResourceStatus, API_VERSION_PATH};
use super::shapes::PortMapping;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterListener {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_mapping: Option<PortMapping>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<VirtualRouterListener>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterData {
    #[serde(default)]
    pub mesh_name: String,
    #[serde(default)]
    pub virtual_router_name: String,
    pub metadata: Option<ResourceMetadata>,
    pub spec: Option<VirtualRouterSpec>,
    pub status: Option<ResourceStatus>,
}

impl MeshEntity for VirtualRouterData {
    type Spec = VirtualRouterSpec;

    const NAME_FIELD: &'static str = "virtualRouterName";

    fn collection_path(key: &EntityKey) -> String {
        format!(
            "{}/meshes/{}/virtualRouters",
            API_VERSION_PATH,
            key.encoded_mesh()
        )
    }

    fn metadata(&self) -> Option<&ResourceMetadata> {
        self.metadata.as_ref()
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn spec(&self) -> Option<&VirtualRouterSpec> {
        self.spec.as_ref()
    }
}
