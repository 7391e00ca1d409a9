use std::sync::OnceLock;

use tfplug::schema::{Attribute, NestedBlock, NestedBlockBuilder, Schema};
use tfplug::types::Dynamic;
use tfplug::validator::{IntBetween, StringLenBetween, StringOneOf};

use super::entity::{resource_schema, AppMeshResource, EntityKind};
use super::schema::{
    block, duration_block, http_method_attribute, max_retries_attribute,
    named_match_set, number, path_match_block, port_attribute, priority_attribute,
    protocol_timeout_block, query_parameter_set, required_block, required_string,
    string, string_enum_set, string_set, GRPC_RETRY_EVENTS, HTTP_SCHEMES, TCP_RETRY_EVENTS,
};
use crate::api::route::{RouteData, RouteSpec};
use crate::flex;

pub struct Route;

pub type RouteResource = AppMeshResource<Route>;

fn action_block() -> NestedBlock {
    let weighted_target = NestedBlockBuilder::new("weighted_target")
        .set()
        .min_items(1)
        .max_items(10)
        .attribute(port_attribute(false))
        .attribute(required_string("virtual_node"))
        .attribute(
            number("weight")
                .required()
                .validator(IntBetween::create(0, 100))
                .build(),
        )
        .build();

    required_block("action").block(weighted_target).build()
}

fn http_retry_events_attribute() -> Attribute {
    string_set("http_retry_events").optional().build()
}

fn grpc_route_block() -> NestedBlock {
    let grpc_match = block("match")
        .block(named_match_set("metadata", 10))
        .attribute(
            string("method_name")
                .optional()
                .validator(StringLenBetween::create(1, 50))
                .build(),
        )
        .attribute(port_attribute(false))
        .attribute(
            string("service_name")
                .optional()
                .validator(StringLenBetween::create(1, 50))
                .build(),
        )
        .build();

    let retry_policy = block("retry_policy")
        .attribute(string_enum_set("grpc_retry_events", GRPC_RETRY_EVENTS))
        .attribute(http_retry_events_attribute())
        .attribute(max_retries_attribute())
        .block(duration_block("per_retry_timeout", true))
        .attribute(string_enum_set("tcp_retry_events", TCP_RETRY_EVENTS))
        .build();

    block("grpc_route")
        .block(action_block())
        .block(grpc_match)
        .block(retry_policy)
        .block(protocol_timeout_block("timeout", true))
        .build()
}

/// Shared by `http_route` and `http2_route`
fn http_route_block(name: &str) -> NestedBlock {
    let http_match = required_block("match")
        .block(named_match_set("header", 10))
        .attribute(http_method_attribute())
        .block(path_match_block())
        .attribute(port_attribute(false))
        .attribute(string("prefix").optional().build())
        .block(query_parameter_set())
        .attribute(
            string("scheme")
                .optional()
                .validator(StringOneOf::create(HTTP_SCHEMES))
                .build(),
        )
        .build();

    let retry_policy = block("retry_policy")
        .attribute(http_retry_events_attribute())
        .attribute(max_retries_attribute())
        .block(duration_block("per_retry_timeout", true))
        .attribute(string_enum_set("tcp_retry_events", TCP_RETRY_EVENTS))
        .build();

    block(name)
        .block(action_block())
        .block(http_match)
        .block(retry_policy)
        .block(protocol_timeout_block("timeout", true))
        .build()
}

fn tcp_route_block() -> NestedBlock {
    block("tcp_route")
        .block(action_block())
        .block(block("match").attribute(port_attribute(false)).build())
        .block(protocol_timeout_block("timeout", false))
        .build()
}

impl EntityKind for Route {
    type Spec = RouteSpec;
    type Entity = RouteData;

    const TYPE_NAME: &'static str = "aws_appmesh_route";
    const DISPLAY_NAME: &'static str = "App Mesh Route";
    const IMPORT_FORMAT: &'static str = "mesh-name/virtual-router-name/route-name";
    const PARENT_ATTRIBUTE: Option<&'static str> = Some("virtual_router_name");

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| resource_schema::<Self>("Provides an AWS App Mesh route", 0))
    }

    fn spec_block() -> NestedBlock {
        // One of grpc_route, http2_route, http_route or tcp_route; checked on expand.
        block("spec")
            .description("Route specification")
            .block(grpc_route_block())
            .block(http_route_block("http2_route"))
            .block(http_route_block("http_route"))
            .attribute(priority_attribute())
            .block(tcp_route_block())
            .build()
    }

    fn validate_spec(spec: &Dynamic) -> flex::Result<()> {
        flex::validate_route_spec(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tfplug::types::DynamicValue;

    fn config(value: serde_json::Value) -> DynamicValue {
        DynamicValue::new(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn route_schema_carries_the_router_name() {
        let block = &Route::schema().block;
        assert!(block.attribute("virtual_router_name").unwrap().required);
        assert!(block.attribute("mesh_owner").is_some());
    }

    #[test]
    fn weights_and_priority_are_bounded() {
        let diagnostics = Route::schema().validate_config(&config(json!({
            "name": "serviceB",
            "mesh_name": "simpleapp",
            "virtual_router_name": "serviceB",
            "spec": [{
                "priority": 1001,
                "http_route": [{
                    "match": [{"prefix": "/"}],
                    "action": [{"weighted_target": [{"virtual_node": "serviceBv1", "weight": 101}]}]
                }]
            }]
        })));
        assert_eq!(diagnostics.len(), 2, "{:?}", diagnostics);
    }

    #[test]
    fn weighted_targets_are_limited_to_ten() {
        let targets: Vec<_> = (0..11)
            .map(|i| json!({"virtual_node": format!("node{}", i), "weight": 1}))
            .collect();
        let diagnostics = Route::schema().validate_config(&config(json!({
            "name": "serviceB",
            "mesh_name": "simpleapp",
            "virtual_router_name": "serviceB",
            "spec": [{"tcp_route": [{"action": [{"weighted_target": targets}]}]}]
        })));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Too many weighted_target blocks");
    }
}
