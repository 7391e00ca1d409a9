//! Schema pieces shared by the App Mesh resources
//!
//! Nested `spec` blocks follow the singleton-list convention: a block that may
//! appear once is a list block with `max_items(1)`. Exclusive groups such as
//! `certificate { acm | file | sds }` are declared as plain optional blocks;
//! the exactly-one-of checks live in the expand layer.

use tfplug::defaults::StaticDefault;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType, NestedBlock, NestedBlockBuilder};
use tfplug::validator::{
    account_id, arn, IntAtLeast, IntBetween, IsPortNumber, StringLenBetween, StringOneOf,
};

pub const EGRESS_FILTER_TYPES: &[&str] = &["ALLOW_ALL", "DROP_ALL"];
pub const IP_PREFERENCES: &[&str] = &["IPv6_PREFERRED", "IPv4_PREFERRED", "IPv4_ONLY", "IPv6_ONLY"];
pub const NODE_PORT_PROTOCOLS: &[&str] = &["http", "tcp", "http2", "grpc"];
pub const GATEWAY_PORT_PROTOCOLS: &[&str] = &["http", "http2", "grpc"];
pub const LISTENER_TLS_MODES: &[&str] = &["STRICT", "PERMISSIVE", "DISABLED"];
pub const DURATION_UNITS: &[&str] = &["s", "ms"];
pub const HTTP_METHODS: &[&str] = &[
    "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
];
pub const HTTP_SCHEMES: &[&str] = &["http", "https"];
pub const DNS_RESPONSE_TYPES: &[&str] = &["LOADBALANCER", "ENDPOINTS"];
pub const GRPC_RETRY_EVENTS: &[&str] = &[
    "cancelled",
    "deadline-exceeded",
    "internal",
    "resource-exhausted",
    "unavailable",
];
pub const TCP_RETRY_EVENTS: &[&str] = &["connection-error"];

pub(crate) fn string(name: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::String)
}

pub(crate) fn number(name: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::Number)
}

pub(crate) fn string_set(name: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::Set(Box::new(AttributeType::String)))
}

fn tags_map(name: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::Map(Box::new(AttributeType::String)))
}

/// A block that may appear at most once
pub(crate) fn block(name: &str) -> NestedBlockBuilder {
    NestedBlockBuilder::new(name).max_items(1)
}

/// A block that must appear exactly once
pub(crate) fn required_block(name: &str) -> NestedBlockBuilder {
    block(name).min_items(1)
}

fn name_string(name: &str) -> Attribute {
    string(name)
        .required()
        .validator(StringLenBetween::create(1, 255))
        .build()
}

// Top-level attributes

pub fn id_attribute() -> Attribute {
    string("id")
        .description("The ID of the resource")
        .computed()
        .plan_modifier(UseStateForUnknown::create())
        .build()
}

pub fn name_attribute(description: &str) -> Attribute {
    string("name")
        .description(description)
        .required()
        .validator(StringLenBetween::create(1, 255))
        .plan_modifier(RequiresReplace::create())
        .build()
}

pub fn mesh_name_attribute() -> Attribute {
    string("mesh_name")
        .description("Name of the service mesh in which to create the resource")
        .required()
        .validator(StringLenBetween::create(1, 255))
        .plan_modifier(RequiresReplace::create())
        .build()
}

pub fn mesh_owner_attribute() -> Attribute {
    string("mesh_owner")
        .description("AWS account ID of the service mesh's owner")
        .optional()
        .computed()
        .validator(account_id())
        .plan_modifier(RequiresReplace::create())
        .build()
}

/// `virtual_router_name` on routes, `virtual_gateway_name` on gateway routes
pub fn parent_attribute(name: &str, description: &str) -> Attribute {
    string(name)
        .description(description)
        .required()
        .validator(StringLenBetween::create(1, 255))
        .plan_modifier(RequiresReplace::create())
        .build()
}

/// arn, created_date, last_updated_date and resource_owner
pub fn metadata_attributes() -> Vec<Attribute> {
    vec![
        string("arn")
            .description("ARN of the resource")
            .computed()
            .plan_modifier(UseStateForUnknown::create())
            .build(),
        string("created_date")
            .description("Creation date of the resource")
            .computed()
            .plan_modifier(UseStateForUnknown::create())
            .build(),
        string("last_updated_date")
            .description("Last update date of the resource")
            .computed()
            .build(),
        string("resource_owner")
            .description("Resource owner's AWS account ID")
            .computed()
            .plan_modifier(UseStateForUnknown::create())
            .build(),
    ]
}

pub fn tags_attribute() -> Attribute {
    tags_map("tags")
        .description("Map of tags to assign to the resource")
        .optional()
        .build()
}

pub fn tags_all_attribute() -> Attribute {
    tags_map("tags_all")
        .description("Map of tags assigned to the resource, including those inherited from the provider default_tags")
        .computed()
        .build()
}

// Building blocks

pub fn duration_block(name: &str, required: bool) -> NestedBlock {
    let builder = if required {
        required_block(name)
    } else {
        block(name)
    };
    builder
        .attribute(
            string("unit")
                .required()
                .validator(StringOneOf::create(DURATION_UNITS))
                .build(),
        )
        .attribute(number("value").required().validator(IntAtLeast::create(0)).build())
        .build()
}

pub fn port_mapping_block(protocols: &[&str]) -> NestedBlock {
    required_block("port_mapping")
        .attribute(number("port").required().validator(IsPortNumber::create()).build())
        .attribute(
            string("protocol")
                .required()
                .validator(StringOneOf::create(protocols))
                .build(),
        )
        .build()
}

fn file_certificate_block() -> NestedBlock {
    block("file")
        .attribute(name_string("certificate_chain"))
        .attribute(name_string("private_key"))
        .build()
}

fn sds_block(validate_length: bool) -> NestedBlock {
    let secret_name = if validate_length {
        name_string("secret_name")
    } else {
        string("secret_name").required().build()
    };
    block("sds").attribute(secret_name).build()
}

fn subject_alternative_names_block() -> NestedBlock {
    block("subject_alternative_names")
        .block(
            required_block("match")
                .attribute(string_set("exact").required().build())
                .build(),
        )
        .build()
}

/// TLS settings a client applies to its backends
pub fn client_policy_block() -> NestedBlock {
    let certificate = block("certificate")
        .block(file_certificate_block())
        .block(sds_block(false))
        .build();

    let trust = required_block("trust")
        .block(
            block("acm")
                .attribute(
                    string_set("certificate_authority_arns")
                        .required()
                        .validator(arn())
                        .build(),
                )
                .build(),
        )
        .block(
            block("file")
                .attribute(name_string("certificate_chain"))
                .build(),
        )
        .block(sds_block(true))
        .build();

    let tls = block("tls")
        .attribute(
            AttributeBuilder::new("enforce", AttributeType::Bool)
                .optional()
                .computed()
                .default(StaticDefault::bool(true))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("ports", AttributeType::Set(Box::new(AttributeType::Number)))
                .optional()
                .validator(IsPortNumber::create())
                .build(),
        )
        .block(certificate)
        .block(
            required_block("validation")
                .block(subject_alternative_names_block())
                .block(trust)
                .build(),
        )
        .build();

    block("client_policy").block(tls).build()
}

pub fn backend_defaults_block() -> NestedBlock {
    block("backend_defaults")
        .description("Default settings for all backends")
        .block(client_policy_block())
        .build()
}

/// Listener TLS: server certificate, mode and optional client validation
pub fn listener_tls_block() -> NestedBlock {
    let certificate = required_block("certificate")
        .block(
            block("acm")
                .attribute(string("certificate_arn").required().validator(arn()).build())
                .build(),
        )
        .block(file_certificate_block())
        .block(sds_block(false))
        .build();

    let validation = block("validation")
        .block(subject_alternative_names_block())
        .block(
            required_block("trust")
                .block(
                    block("file")
                        .attribute(name_string("certificate_chain"))
                        .build(),
                )
                .block(sds_block(true))
                .build(),
        )
        .build();

    block("tls")
        .attribute(
            string("mode")
                .required()
                .validator(StringOneOf::create(LISTENER_TLS_MODES))
                .build(),
        )
        .block(certificate)
        .block(validation)
        .build()
}

pub fn health_check_block(protocols: &[&str]) -> NestedBlock {
    block("health_check")
        .attribute(
            number("healthy_threshold")
                .required()
                .validator(IntBetween::create(2, 10))
                .build(),
        )
        .attribute(
            number("interval_millis")
                .required()
                .validator(IntBetween::create(5000, 300000))
                .build(),
        )
        .attribute(string("path").optional().build())
        .attribute(
            number("port")
                .optional()
                .computed()
                .validator(IsPortNumber::create())
                .build(),
        )
        .attribute(
            string("protocol")
                .required()
                .validator(StringOneOf::create(protocols))
                .build(),
        )
        .attribute(
            number("timeout_millis")
                .required()
                .validator(IntBetween::create(2000, 60000))
                .build(),
        )
        .attribute(
            number("unhealthy_threshold")
                .required()
                .validator(IntBetween::create(2, 10))
                .build(),
        )
        .build()
}

fn max_requests_pool(name: &str) -> NestedBlock {
    block(name)
        .attribute(number("max_requests").required().validator(IntAtLeast::create(1)).build())
        .build()
}

fn http_pool() -> NestedBlock {
    block("http")
        .attribute(
            number("max_connections")
                .required()
                .validator(IntAtLeast::create(1))
                .build(),
        )
        .attribute(
            number("max_pending_requests")
                .optional()
                .validator(IntAtLeast::create(1))
                .build(),
        )
        .build()
}

/// Listener connection pool; `tcp` only exists on virtual nodes
pub fn connection_pool_block(with_tcp: bool) -> NestedBlock {
    let mut builder = block("connection_pool")
        .block(max_requests_pool("grpc"))
        .block(http_pool())
        .block(max_requests_pool("http2"));
    if with_tcp {
        builder = builder.block(
            block("tcp")
                .attribute(
                    number("max_connections")
                        .required()
                        .validator(IntAtLeast::create(1))
                        .build(),
                )
                .build(),
        );
    }
    builder.build()
}

pub fn logging_block() -> NestedBlock {
    let format = block("format")
        .block(
            NestedBlockBuilder::new("json")
                .attribute(
                    string("key")
                        .required()
                        .validator(StringLenBetween::create(1, 100))
                        .build(),
                )
                .attribute(
                    string("value")
                        .required()
                        .validator(StringLenBetween::create(1, 100))
                        .build(),
                )
                .build(),
        )
        .attribute(
            string("text")
                .optional()
                .validator(StringLenBetween::create(1, 1000))
                .build(),
        )
        .build();

    let file = block("file")
        .attribute(name_string("path"))
        .block(format)
        .build();

    block("logging")
        .description("Inbound and outbound access logging information")
        .block(block("access_log").block(file).build())
        .build()
}

/// The `idle` and optionally `per_request` durations of one protocol
pub fn protocol_timeout_block(name: &str, with_per_request: bool) -> NestedBlock {
    let mut builder = block(name).block(duration_block("idle", false));
    if with_per_request {
        builder = builder.block(duration_block("per_request", false));
    }
    builder.build()
}

/// Header or metadata match: `{exact | prefix | range | regex | suffix}`
pub fn header_match_block() -> NestedBlock {
    block("match")
        .attribute(string("exact").optional().validator(StringLenBetween::create(1, 255)).build())
        .attribute(string("prefix").optional().validator(StringLenBetween::create(1, 255)).build())
        .attribute(string("regex").optional().validator(StringLenBetween::create(1, 255)).build())
        .attribute(string("suffix").optional().validator(StringLenBetween::create(1, 255)).build())
        .block(
            block("range")
                .attribute(number("end").required().build())
                .attribute(number("start").required().build())
                .build(),
        )
        .build()
}

/// `header` on HTTP matches, `metadata` on gRPC matches
pub fn named_match_set(name: &str, max_items: i64) -> NestedBlock {
    NestedBlockBuilder::new(name)
        .set()
        .min_items(0)
        .max_items(max_items)
        .attribute(
            AttributeBuilder::new("invert", AttributeType::Bool)
                .optional()
                .computed()
                .default(StaticDefault::bool(false))
                .build(),
        )
        .attribute(
            string("name")
                .required()
                .validator(StringLenBetween::create(1, 50))
                .build(),
        )
        .block(header_match_block())
        .build()
}

pub fn path_match_block() -> NestedBlock {
    block("path")
        .attribute(string("exact").optional().validator(StringLenBetween::create(1, 255)).build())
        .attribute(string("regex").optional().validator(StringLenBetween::create(1, 255)).build())
        .build()
}

pub fn query_parameter_set() -> NestedBlock {
    NestedBlockBuilder::new("query_parameter")
        .set()
        .max_items(10)
        .attribute(string("name").required().build())
        .block(block("match").attribute(string("exact").optional().build()).build())
        .build()
}

pub fn http_method_attribute() -> Attribute {
    string("method")
        .optional()
        .validator(StringOneOf::create(HTTP_METHODS))
        .build()
}

pub fn port_attribute(required: bool) -> Attribute {
    let builder = number("port").validator(IsPortNumber::create());
    if required {
        builder.required().build()
    } else {
        builder.optional().build()
    }
}

pub fn service_discovery_block() -> NestedBlock {
    let cloud_map = block("aws_cloud_map")
        .attribute(
            tags_map("attributes")
                .optional()
                .build(),
        )
        .attribute(ip_preference_attribute())
        .attribute(
            string("namespace_name")
                .required()
                .validator(StringLenBetween::create(1, 1024))
                .build(),
        )
        .attribute(
            string("service_name")
                .required()
                .validator(StringLenBetween::create(1, 1024))
                .build(),
        )
        .build();

    let dns = block("dns")
        .attribute(string("hostname").required().build())
        .attribute(ip_preference_attribute())
        .attribute(
            string("response_type")
                .optional()
                .validator(StringOneOf::create(DNS_RESPONSE_TYPES))
                .build(),
        )
        .build();

    block("service_discovery").block(cloud_map).block(dns).build()
}

pub fn ip_preference_attribute() -> Attribute {
    string("ip_preference")
        .optional()
        .validator(StringOneOf::create(IP_PREFERENCES))
        .build()
}

pub fn string_enum_set(name: &str, allowed: &[&str]) -> Attribute {
    string_set(name)
        .optional()
        .validator(StringOneOf::create(allowed))
        .build()
}

pub fn max_retries_attribute() -> Attribute {
    number("max_retries").required().validator(IntAtLeast::create(0)).build()
}

pub fn priority_attribute() -> Attribute {
    number("priority")
        .optional()
        .validator(IntBetween::create(0, 1000))
        .build()
}

pub fn required_string(name: &str) -> Attribute {
    name_string(name)
}

pub fn optional_string(name: &str) -> Attribute {
    string(name).optional().build()
}
