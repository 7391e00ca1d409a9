use std::sync::OnceLock;

use tfplug::schema::{NestedBlock, NestedBlockBuilder, Schema};
use tfplug::types::Dynamic;

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{
    backend_defaults_block, connection_pool_block, health_check_block, listener_tls_block,
    logging_block, port_mapping_block, required_block, GATEWAY_PORT_PROTOCOLS,
};
use crate::api::virtual_gateway::{VirtualGatewayData, VirtualGatewaySpec};
use crate::flex;

pub struct VirtualGateway;

pub type VirtualGatewayResource = AppMeshResource<VirtualGateway>;

impl EntityKind for VirtualGateway {
    type Spec = VirtualGatewaySpec;
    type Entity = VirtualGatewayData;

    const TYPE_NAME: &'static str = "aws_appmesh_virtual_gateway";
    const DISPLAY_NAME: &'static str = "App Mesh Virtual Gateway";
    const IMPORT_FORMAT: &'static str = "mesh-name/virtual-gateway-name";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            resource_schema::<Self>("Provides an AWS App Mesh virtual gateway", 0)
        })
    }

    fn spec_block() -> NestedBlock {
        let listener = NestedBlockBuilder::new("listener")
            .min_items(1)
            .block(connection_pool_block(false))
            .block(health_check_block(GATEWAY_PORT_PROTOCOLS))
            .block(port_mapping_block(GATEWAY_PORT_PROTOCOLS))
            .block(listener_tls_block())
            .build();

        required_block("spec")
            .description("Virtual gateway specification")
            .block(backend_defaults_block())
            .block(listener)
            .block(logging_block())
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_virtual_gateway_spec(spec)
    }
}
