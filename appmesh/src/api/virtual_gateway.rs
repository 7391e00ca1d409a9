//! Virtual gateway API types
//!
//! TLS, health check, backend default and logging shapes are the same as the
//! virtual node ones and are shared through `shapes`.

use serde::{Deserialize, Serialize};

use super::common::{EntityKey, MeshEntity, ResourceMetadata, ResourceStatus, API_VERSION_PATH};
use super::shapes::{
    BackendDefaults, GrpcConnectionPool, HealthCheckPolicy, Http2ConnectionPool,
    HttpConnectionPool, ListenerTls, Logging, PortMapping,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VirtualGatewayConnectionPool {
    Grpc(GrpcConnectionPool),
    Http(HttpConnectionPool),
    Http2(Http2ConnectionPool),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualGatewayListener {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_pool: Option<VirtualGatewayConnectionPool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_mapping: Option<PortMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<ListenerTls>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualGatewaySpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_defaults: Option<BackendDefaults>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub listeners: Vec<VirtualGatewayListener>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<Logging>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualGatewayData {
    #[serde(default)]
    pub mesh_name: String,
    #[serde(default)]
    pub virtual_gateway_name: String,
    pub metadata: Option<ResourceMetadata>,
    pub spec: Option<VirtualGatewaySpec>,
    pub status: Option<ResourceStatus>,
}

impl MeshEntity for VirtualGatewayData {
    type Spec = VirtualGatewaySpec;

    const NAME_FIELD: &'static str = "virtualGatewayName";

    fn collection_path(key: &EntityKey) -> String {
        format!(
            "{}/meshes/{}/virtualGateways",
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

    fn spec(&self) -> Option<&VirtualGatewaySpec> {
        self.spec.as_ref()
    }
}
