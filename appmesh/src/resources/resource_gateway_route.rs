use std::sync::OnceLock;

use tfplug::schema::{NestedBlock, Schema};
use tfplug::types::Dynamic;
use tfplug::validator::{StringLenBetween, StringOneOf};

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{
    block, http_method_attribute, named_match_set, path_match_block, port_attribute,
    priority_attribute, query_parameter_set, required_block, required_string, string,
};
use crate::api::gateway_route::{GatewayRouteData, GatewayRouteSpec};
use crate::flex;

const DEFAULT_TARGET_HOSTNAME: &[&str] = &["ENABLED", "DISABLED"];

pub struct GatewayRoute;

pub type GatewayRouteResource = AppMeshResource<GatewayRoute>;

fn target_block() -> NestedBlock {
    required_block("target")
        .attribute(port_attribute(false))
        .block(
            required_block("virtual_service")
                .attribute(required_string("virtual_service_name"))
                .build(),
        )
        .build()
}

fn hostname_rewrite_block() -> NestedBlock {
    block("hostname")
        .attribute(
            string("default_target_hostname")
                .required()
                .validator(StringOneOf::create(DEFAULT_TARGET_HOSTNAME))
                .build(),
        )
        .build()
}

fn hostname_match_block() -> NestedBlock {
    block("hostname")
        .attribute(
            string("exact")
                .optional()
                .validator(StringLenBetween::create(1, 253))
                .build(),
        )
        .attribute(
            string("suffix")
                .optional()
                .validator(StringLenBetween::create(1, 253))
                .build(),
        )
        .build()
}

fn grpc_route_block() -> NestedBlock {
    let action = required_block("action")
        .block(block("rewrite").block(hostname_rewrite_block()).build())
        .block(target_block())
        .build();

    let grpc_match = required_block("match")
        .block(hostname_match_block())
        .block(named_match_set("metadata", 10))
        .attribute(port_attribute(false))
        .attribute(string("service_name").optional().build())
        .build();

    block("grpc_route").block(action).block(grpc_match).build()
}

/// Shared by `http_route` and `http2_route`
fn http_route_block(name: &str) -> NestedBlock {
    let rewrite = block("rewrite")
        .block(hostname_rewrite_block())
        .block(
            block("path")
                .attribute(string("exact").required().validator(StringLenBetween::create(1, 255)).build())
                .build(),
        )
        .block(
            block("prefix")
                .attribute(
                    string("default_prefix")
                        .optional()
                        .validator(StringOneOf::create(DEFAULT_TARGET_HOSTNAME))
                        .build(),
                )
                .attribute(string("value").optional().build())
                .build(),
        )
        .build();

    let action = required_block("action")
        .block(rewrite)
        .block(target_block())
        .build();

    let http_match = required_block("match")
        .block(named_match_set("header", 10))
        .block(hostname_match_block())
        .attribute(http_method_attribute())
        .block(path_match_block())
        .attribute(port_attribute(false))
        .attribute(string("prefix").optional().build())
        .block(query_parameter_set())
        .build();

    block(name).block(action).block(http_match).build()
}

impl EntityKind for GatewayRoute {
    type Spec = GatewayRouteSpec;
    type Entity = GatewayRouteData;

    const TYPE_NAME: &'static str = "aws_appmesh_gateway_route";
    const DISPLAY_NAME: &'static str = "App Mesh Gateway Route";
    const IMPORT_FORMAT: &'static str = "mesh-name/virtual-gateway-name/gateway-route-name";
    const PARENT_ATTRIBUTE: Option<&'static str> = Some("virtual_gateway_name");

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            resource_schema::<Self>("Provides an AWS App Mesh gateway route", 0)
        })
    }

    fn spec_block() -> NestedBlock {
        required_block("spec")
            .description("Gateway route specification")
            .block(grpc_route_block())
            .block(http_route_block("http2_route"))
            .block(http_route_block("http_route"))
            .attribute(priority_attribute())
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_gateway_route_spec(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tfplug::types::DynamicValue;

    #[test]
    fn default_target_hostname_is_an_enum() {
        let config = DynamicValue::new(
            serde_json::from_value(json!({
                "name": "gateway-route",
                "mesh_name": "simpleapp",
                "virtual_gateway_name": "gateway",
                "spec": [{
                    "grpc_route": [{
                        "action": [{
                            "rewrite": [{"hostname": [{"default_target_hostname": "SOMETIMES"}]}],
                            "target": [{"virtual_service": [{"virtual_service_name": "svc"}]}]
                        }],
                        "match": [{"service_name": "svc"}]
                    }]
                }]
            }))
            .unwrap(),
        );
        let diagnostics = GatewayRoute::schema().validate_config(&config);
        assert_eq!(diagnostics.len(), 1, "{:?}", diagnostics);
    }
}
