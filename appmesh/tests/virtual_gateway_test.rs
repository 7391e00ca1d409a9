#![allow(clippy::disallowed_methods)]

use appmesh::api::test_helpers::create_test_client;
use appmesh::data_sources::GatewayRouteDataSource;
use appmesh::resources::VirtualGatewayResource;
use appmesh::retry::PropagationWait;
use appmesh::AppMeshProviderData;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, DataSource, DataSourceWithConfigure, ReadDataSourceRequest,
};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, ImportResourceStateRequest, Resource,
    ResourceWithConfigure, ResourceWithImportState,
};
use tfplug::types::{AttributePath, ClientCapabilities, DynamicValue};

const GATEWAY_ARN: &str =
    "arn:aws:appmesh:us-west-2:123456789012:mesh/simpleapp/virtualGateway/gateway";
const GATEWAY_UID: &str = "0d0fcd4e-5b50-4a18-a31a-7ccb9c4c1d9a";
const ROUTE_ARN: &str =
    "arn:aws:appmesh:us-west-2:123456789012:mesh/simpleapp/virtualGateway/gateway/gatewayRoute/route";

fn gateway_body() -> String {
    json!({
        "meshName": "simpleapp",
        "virtualGatewayName": "gateway",
        "metadata": {
            "arn": GATEWAY_ARN,
            "createdAt": 1600000000.0,
            "lastUpdatedAt": 1600000000.0,
            "meshOwner": "123456789012",
            "resourceOwner": "123456789012",
            "uid": GATEWAY_UID,
            "version": 1
        },
        "spec": {"listeners": [{"portMapping": {"port": 8080, "protocol": "http"}}]},
        "status": {"status": "ACTIVE"}
    })
    .to_string()
}

fn capabilities() -> ClientCapabilities {
    ClientCapabilities {
        deferral_allowed: false,
        write_only_attributes_allowed: false,
    }
}

fn provider_data(server: &ServerGuard) -> Arc<AppMeshProviderData> {
    let data = AppMeshProviderData::new(create_test_client(&server.url())).with_propagation(
        PropagationWait {
            timeout: Duration::from_secs(5),
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(20),
        },
    );
    Arc::new(data)
}

async fn configured_gateway(server: &ServerGuard) -> VirtualGatewayResource {
    let mut resource = VirtualGatewayResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    resource
}

async fn mock_empty_tags(server: &mut ServerGuard, arn: &str) -> mockito::Mock {
    server
        .mock("GET", "/v20190125/tags")
        .match_query(Matcher::UrlEncoded("resourceArn".to_string(), arn.to_string()))
        .with_status(200)
        .with_body(r#"{"tags":[]}"#)
        .create_async()
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn create_waits_for_the_gateway_to_propagate() {
    let mut server = Server::new_async().await;

    let create = server
        .mock("PUT", "/v20190125/meshes/simpleapp/virtualGateways")
        .match_body(Matcher::PartialJson(json!({
            "virtualGatewayName": "gateway",
            "spec": {"listeners": [{"portMapping": {"port": 8080, "protocol": "http"}}]},
            "tags": [{"key": "Name", "value": "gateway"}]
        })))
        .with_status(200)
        .with_body(gateway_body())
        .expect(1)
        .create_async()
        .await;
    let not_yet = server
        .mock("GET", "/v20190125/meshes/simpleapp/virtualGateways/gateway")
        .with_status(404)
        .with_header("x-amzn-ErrorType", "NotFoundException")
        .with_body(r#"{"message":"VirtualGateway not found"}"#)
        .expect(2)
        .create_async()
        .await;
    let visible = server
        .mock("GET", "/v20190125/meshes/simpleapp/virtualGateways/gateway")
        .with_status(200)
        .with_body(gateway_body())
        .expect(1)
        .create_async()
        .await;
    let _tags = server
        .mock("GET", "/v20190125/tags")
        .match_query(Matcher::UrlEncoded(
            "resourceArn".to_string(),
            GATEWAY_ARN.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"tags":[{"key":"Name","value":"gateway"}]}"#)
        .create_async()
        .await;

    let resource = configured_gateway(&server).await;

    let planned = DynamicValue::new(
        serde_json::from_value(json!({
            "name": "gateway",
            "mesh_name": "simpleapp",
            "tags": {"Name": "gateway"},
            "spec": [{
                "listener": [{"port_mapping": [{"port": 8080, "protocol": "http"}]}]
            }]
        }))
        .unwrap(),
    );
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "aws_appmesh_virtual_gateway".to_string(),
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let state = created.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), GATEWAY_UID);
    assert_eq!(
        state.get_string(&AttributePath::new("mesh_owner")).unwrap(),
        "123456789012"
    );
    assert_eq!(
        state
            .get_number(
                &AttributePath::new("spec")
                    .index(0)
                    .attribute("listener")
                    .index(0)
                    .attribute("port_mapping")
                    .index(0)
                    .attribute("port"),
            )
            .unwrap(),
        8080.0
    );
    let tags_all = state.get_map(&AttributePath::new("tags_all")).unwrap();
    assert_eq!(tags_all.len(), 1);

    create.assert_async().await;
    not_yet.assert_async().await;
    visible.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn import_sets_identity_from_the_describe_call() {
    let mut server = Server::new_async().await;

    let describe = server
        .mock("GET", "/v20190125/meshes/simpleapp/virtualGateways/gateway")
        .with_status(200)
        .with_body(gateway_body())
        .expect(1)
        .create_async()
        .await;

    let resource = configured_gateway(&server).await;
    let response = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "aws_appmesh_virtual_gateway".to_string(),
                id: "simpleapp/gateway".to_string(),
                client_capabilities: capabilities(),
                identity: None,
            },
        )
        .await;

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(response.imported_resources.len(), 1);
    let state = &response.imported_resources[0].state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), GATEWAY_UID);
    assert_eq!(state.get_string(&AttributePath::new("name")).unwrap(), "gateway");
    assert_eq!(
        state.get_string(&AttributePath::new("mesh_name")).unwrap(),
        "simpleapp"
    );
    describe.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn import_rejects_a_malformed_id() {
    let server = Server::new_async().await;
    let resource = configured_gateway(&server).await;

    let response = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "aws_appmesh_virtual_gateway".to_string(),
                id: "gateway".to_string(),
                client_capabilities: capabilities(),
                identity: None,
            },
        )
        .await;

    assert!(response.imported_resources.is_empty());
    assert_eq!(response.diagnostics.len(), 1);
    assert!(response.diagnostics[0]
        .detail
        .contains("use: 'mesh-name/virtual-gateway-name'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn gateway_route_data_source_reads_spec_and_tags() {
    let mut server = Server::new_async().await;

    let body = json!({
        "meshName": "simpleapp",
        "virtualGatewayName": "gateway",
        "gatewayRouteName": "route",
        "metadata": {
            "arn": ROUTE_ARN,
            "createdAt": 1600000000.0,
            "lastUpdatedAt": 1600000000.0,
            "meshOwner": "123456789012",
            "resourceOwner": "123456789012",
            "uid": "route-uid",
            "version": 1
        },
        "spec": {
            "httpRoute": {
                "action": {"target": {"virtualService": {"virtualServiceName": "svc.simpleapp.local"}}},
                "match": {"prefix": "/"}
            }
        },
        "status": {"status": "ACTIVE"}
    });
    let describe = server
        .mock(
            "GET",
            "/v20190125/meshes/simpleapp/virtualGateway/gateway/gatewayRoutes/route",
        )
        .with_status(200)
        .with_body(body.to_string())
        .expect(1)
        .create_async()
        .await;
    let tags = server
        .mock("GET", "/v20190125/tags")
        .match_query(Matcher::UrlEncoded(
            "resourceArn".to_string(),
            ROUTE_ARN.to_string(),
        ))
        .with_status(200)
        .with_body(
            r#"{"tags":[{"key":"team","value":"mesh"},{"key":"aws:cloudformation:stack-name","value":"x"}]}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let mut data_source = GatewayRouteDataSource::new();
    let configured = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data(&server)),
            },
        )
        .await;
    assert!(configured.diagnostics.is_empty());

    let response = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "aws_appmesh_gateway_route".to_string(),
                config: DynamicValue::new(
                    serde_json::from_value(json!({
                        "name": "route",
                        "mesh_name": "simpleapp",
                        "virtual_gateway_name": "gateway"
                    }))
                    .unwrap(),
                ),
                provider_meta: None,
                client_capabilities: capabilities(),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);

    let state = response.state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), "route-uid");
    assert_eq!(state.get_string(&AttributePath::new("arn")).unwrap(), ROUTE_ARN);
    assert_eq!(
        state
            .get_string(
                &AttributePath::new("spec")
                    .index(0)
                    .attribute("http_route")
                    .index(0)
                    .attribute("match")
                    .index(0)
                    .attribute("prefix"),
            )
            .unwrap(),
        "/"
    );
    let tags_map = state.get_map(&AttributePath::new("tags")).unwrap();
    assert_eq!(tags_map.len(), 1);
    assert!(tags_map.contains_key("team"));

    describe.assert_async().await;
    tags.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn data_source_surfaces_missing_entities() {
    let mut server = Server::new_async().await;

    let _describe = server
        .mock(
            "GET",
            "/v20190125/meshes/simpleapp/virtualGateway/gateway/gatewayRoutes/missing",
        )
        .with_status(404)
        .with_body(r#"{"message":"GatewayRoute not found"}"#)
        .create_async()
        .await;
    let _tags = mock_empty_tags(&mut server, ROUTE_ARN).await;

    let mut data_source = GatewayRouteDataSource::new();
    data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data(&server)),
            },
        )
        .await;

    let response = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "aws_appmesh_gateway_route".to_string(),
                config: DynamicValue::new(
                    serde_json::from_value(json!({
                        "name": "missing",
                        "mesh_name": "simpleapp",
                        "virtual_gateway_name": "gateway"
                    }))
                    .unwrap(),
                ),
                provider_meta: None,
                client_capabilities: capabilities(),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].summary,
        "Failed to read App Mesh Gateway Route"
    );
}
