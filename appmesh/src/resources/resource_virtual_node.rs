use std::sync::OnceLock;

use tfplug::schema::{NestedBlock, NestedBlockBuilder, Schema};
use tfplug::types::Dynamic;
use tfplug::validator::{IntAtLeast, IntBetween};

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{
    backend_defaults_block, block, client_policy_block, connection_pool_block, duration_block,
    health_check_block, listener_tls_block, logging_block, number, port_mapping_block,
    protocol_timeout_block, required_block, required_string, service_discovery_block,
    NODE_PORT_PROTOCOLS,
};
use crate::api::virtual_node::{VirtualNodeData, VirtualNodeSpec};
use crate::flex;
use crate::migrate::{virtual_node_migrations, MigrationTable};

pub struct VirtualNode;

pub type VirtualNodeResource = AppMeshResource<VirtualNode>;

fn backend_block() -> NestedBlock {
    NestedBlockBuilder::new("backend")
        .set()
        .max_items(50)
        .block(
            required_block("virtual_service")
                .attribute(required_string("virtual_service_name"))
                .block(client_policy_block())
                .build(),
        )
        .build()
}

fn outlier_detection_block() -> NestedBlock {
    block("outlier_detection")
        .block(duration_block("base_ejection_duration", true))
        .block(duration_block("interval", true))
        .attribute(
            number("max_ejection_percent")
                .required()
                .validator(IntBetween::create(0, 100))
                .build(),
        )
        .attribute(
            number("max_server_errors")
                .required()
                .validator(IntAtLeast::create(1))
                .build(),
        )
        .build()
}

fn listener_timeout_block() -> NestedBlock {
    block("timeout")
        .block(protocol_timeout_block("grpc", true))
        .block(protocol_timeout_block("http", true))
        .block(protocol_timeout_block("http2", true))
        .block(protocol_timeout_block("tcp", false))
        .build()
}

fn listener_block() -> NestedBlock {
    NestedBlockBuilder::new("listener")
        .max_items(50)
        .block(connection_pool_block(true))
        .block(health_check_block(NODE_PORT_PROTOCOLS))
        .block(outlier_detection_block())
        .block(port_mapping_block(NODE_PORT_PROTOCOLS))
        .block(listener_timeout_block())
        .block(listener_tls_block())
        .build()
}

impl EntityKind for VirtualNode {
    type Spec = VirtualNodeSpec;
    type Entity = VirtualNodeData;

    const TYPE_NAME: &'static str = "aws_appmesh_virtual_node";
    const DISPLAY_NAME: &'static str = "App Mesh Virtual Node";
    const IMPORT_FORMAT: &'static str = "mesh-name/virtual-node-name";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| resource_schema::<Self>("Provides an AWS App Mesh virtual node", 1))
    }

    fn spec_block() -> NestedBlock {
        block("spec")
            .description("Virtual node specification")
            .block(backend_block())
            .block(backend_defaults_block())
            .block(listener_block())
            .block(logging_block())
            .block(service_discovery_block())
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_virtual_node_spec(spec)
    }

    fn migrations() -> MigrationTable {
        virtual_node_migrations()
    }
}
