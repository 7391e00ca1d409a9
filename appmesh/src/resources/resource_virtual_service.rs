use std::sync::OnceLock;

use tfplug::schema::{NestedBlock, Schema};
use tfplug::types::Dynamic;

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{block, required_string};
use crate::api::virtual_service::{VirtualServiceData, VirtualServiceSpec};
use crate::flex;

pub struct VirtualService;

pub type VirtualServiceResource = AppMeshResource<VirtualService>;

impl EntityKind for VirtualService {
    type Spec = VirtualServiceSpec;
    type Entity = VirtualServiceData;

    const TYPE_NAME: &'static str = "aws_appmesh_virtual_service";
    const DISPLAY_NAME: &'static str = "App Mesh Virtual Service";
    const IMPORT_FORMAT: &'static str = "mesh-name/virtual-service-name";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            resource_schema::<Self>("Provides an AWS App Mesh virtual service", 0)
        })
    }

    fn spec_block() -> NestedBlock {
        // Exactly one of virtual_node or virtual_router, checked on expand.
        let provider = block("provider")
            .block(
                block("virtual_node")
                    .attribute(required_string("virtual_node_name"))
                    .build(),
            )
            .block(
                block("virtual_router")
                    .attribute(required_string("virtual_router_name"))
                    .build(),
            )
            .build();

        block("spec")
            .description("Virtual service specification")
            .block(provider)
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_virtual_service_spec(spec)
    }
}
