use std::sync::OnceLock;

use tfplug::schema::{NestedBlock, NestedBlockBuilder, Schema};
use tfplug::types::Dynamic;

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{block, port_mapping_block, NODE_PORT_PROTOCOLS};
use crate::api::virtual_router::{VirtualRouterData, VirtualRouterSpec};
use crate::flex;
use crate::migrate::{virtual_router_migrations, MigrationTable};

pub struct VirtualRouter;

pub type VirtualRouterResource = AppMeshResource<VirtualRouter>;

impl EntityKind for VirtualRouter {
    type Spec = VirtualRouterSpec;
    type Entity = VirtualRouterData;

    const TYPE_NAME: &'static str = "aws_appmesh_virtual_router";
    const DISPLAY_NAME: &'static str = "App Mesh Virtual Router";
    const IMPORT_FORMAT: &'static str = "mesh-name/virtual-router-name";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            resource_schema::<Self>("Provides an AWS App Mesh virtual router", 1)
        })
    }

    fn spec_block() -> NestedBlock {
        block("spec")
            .description("Virtual router specification")
            .block(
                NestedBlockBuilder::new("listener")
                    .min_items(1)
                    .block(port_mapping_block(NODE_PORT_PROTOCOLS))
                    .build(),
            )
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_virtual_router_spec(spec)
    }

    fn migrations() -> MigrationTable {
        virtual_router_migrations()
    }
}
