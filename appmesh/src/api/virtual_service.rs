//! Virtual service API types

use serde::{Deserialize, Serialize};

use super::common::{EntityKey, MeshEntity, ResourceMetadata, ResourceStatus, API_VERSION_PATH};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNodeServiceProvider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_node_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualRouterServiceProvider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_router_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VirtualServiceProvider {
    VirtualNode(VirtualNodeServiceProvider),
    VirtualRouter(VirtualRouterServiceProvider),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<VirtualServiceProvider>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualServiceData {
    #[serde(default)]
    pub mesh_name: String,
    #[serde(default)]
    pub virtual_service_name: String,
    pub metadata: Option<ResourceMetadata>,
    pub spec: Option<VirtualServiceSpec>,
    pub status: Option<ResourceStatus>,
}

impl MeshEntity for VirtualServiceData {
    type Spec = VirtualServiceSpec;

    const NAME_FIELD: &'static str = "virtualServiceName";

    fn collection_path(key: &EntityKey) -> String {
        format!(
            "{}/meshes/{}/virtualServices",
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

    fn spec(&self) -> Option<&VirtualServiceSpec> {
        self.spec.as_ref()
    }
}
