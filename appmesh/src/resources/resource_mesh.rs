use std::sync::OnceLock;

use tfplug::defaults::StaticDefault;
use tfplug::schema::{NestedBlock, Schema};
use tfplug::types::Dynamic;
use tfplug::validator::StringOneOf;

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{block, ip_preference_attribute, string, EGRESS_FILTER_TYPES};
use crate::api::mesh::{MeshData, MeshSpec};
use crate::flex;

pub struct Mesh;

pub type MeshResource = AppMeshResource<Mesh>;

impl EntityKind for Mesh {
    type Spec = MeshSpec;
    type Entity = MeshData;

    const TYPE_NAME: &'static str = "aws_appmesh_mesh";
    const DISPLAY_NAME: &'static str = "App Mesh Service Mesh";
    const IMPORT_FORMAT: &'static str = "mesh-name";

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| resource_schema::<Self>("Provides an AWS App Mesh service mesh", 0))
    }

    fn spec_block() -> NestedBlock {
        let egress_filter = block("egress_filter")
            .attribute(
                string("type")
                    .optional()
                    .computed()
                    .default(StaticDefault::string("DROP_ALL"))
                    .validator(StringOneOf::create(EGRESS_FILTER_TYPES))
                    .build(),
            )
            .build();

        block("spec")
            .description("Service mesh specification")
            .block(egress_filter)
            .block(
                block("service_discovery")
                    .attribute(ip_preference_attribute())
                    .build(),
            )
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_mesh_spec(spec)
    }
}
