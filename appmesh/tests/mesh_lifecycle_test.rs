#![allow(clippy::disallowed_methods)]

use appmesh::api::test_helpers::create_test_client;
use appmesh::resources::MeshResource;
use appmesh::AppMeshProviderData;
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest, ReadResourceRequest,
    Resource, ResourceWithConfigure, UpdateResourceRequest,
};
use tfplug::types::{AttributePath, ClientCapabilities, DynamicValue};
use tokio_test::assert_ok;

const MESH_ARN: &str = "arn:aws:appmesh:us-west-2:123456789012:mesh/simpleapp";

fn mesh_body(egress: &str) -> String {
    json!({
        "meshName": "simpleapp",
        "metadata": {
            "arn": MESH_ARN,
            "createdAt": 1600000000.0,
            "lastUpdatedAt": 1600000100.0,
            "meshOwner": "123456789012",
            "resourceOwner": "123456789012",
            "uid": "a385048d-aba8-4235-9581-2c4bb3f5e1e2",
            "version": 1
        },
        "spec": {"egressFilter": {"type": egress}},
        "status": {"status": "ACTIVE"}
    })
    .to_string()
}

fn state(value: serde_json::Value) -> DynamicValue {
    DynamicValue::new(serde_json::from_value(value).unwrap())
}

fn egress_type(state: &DynamicValue) -> String {
    state
        .get_string(
            &AttributePath::new("spec")
                .index(0)
                .attribute("egress_filter")
                .index(0)
                .attribute("type"),
        )
        .unwrap()
}

async fn configured_resource(server: &ServerGuard) -> MeshResource {
    let data = AppMeshProviderData::new(create_test_client(&server.url()));
    let mut resource = MeshResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(Arc::new(data)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    resource
}

fn read_request(current_state: DynamicValue) -> ReadResourceRequest {
    ReadResourceRequest {
        type_name: "aws_appmesh_mesh".to_string(),
        current_state,
        private: vec![],
        provider_meta: None,
        client_capabilities: ClientCapabilities {
            deferral_allowed: false,
            write_only_attributes_allowed: false,
        },
        current_identity: None,
    }
}

async fn mock_tags(server: &mut ServerGuard, tags: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", "/v20190125/tags")
        .match_query(Matcher::UrlEncoded(
            "resourceArn".to_string(),
            MESH_ARN.to_string(),
        ))
        .with_status(200)
        .with_body(json!({ "tags": tags }).to_string())
        .create_async()
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn mesh_create_read_update_delete() {
    let mut server = Server::new_async().await;

    let create = server
        .mock("PUT", "/v20190125/meshes")
        .match_body(Matcher::PartialJson(json!({
            "meshName": "simpleapp",
            "spec": {"egressFilter": {"type": "ALLOW_ALL"}}
        })))
        .with_status(200)
        .with_body(mesh_body("ALLOW_ALL"))
        .expect(1)
        .create_async()
        .await;
    let describe_before = server
        .mock("GET", "/v20190125/meshes/simpleapp")
        .with_status(200)
        .with_body(mesh_body("ALLOW_ALL"))
        .expect(2)
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/v20190125/meshes/simpleapp")
        .match_body(Matcher::PartialJson(json!({
            "spec": {"egressFilter": {"type": "DROP_ALL"}}
        })))
        .with_status(200)
        .with_body(mesh_body("DROP_ALL"))
        .expect(1)
        .create_async()
        .await;
    let describe_after = server
        .mock("GET", "/v20190125/meshes/simpleapp")
        .with_status(200)
        .with_body(mesh_body("DROP_ALL"))
        .expect(2)
        .create_async()
        .await;
    let _tags = mock_tags(&mut server, json!([])).await;
    let delete = server
        .mock("DELETE", "/v20190125/meshes/simpleapp")
        .with_status(200)
        .with_body(mesh_body("DROP_ALL"))
        .expect(1)
        .create_async()
        .await;

    let resource = configured_resource(&server).await;

    let planned = state(json!({
        "name": "simpleapp",
        "spec": [{"egress_filter": [{"type": "ALLOW_ALL"}]}]
    }));
    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "aws_appmesh_mesh".to_string(),
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty(), "{:?}", created.diagnostics);

    let created_state = created.new_state;
    assert_eq!(assert_ok!(created_state.get_string(&AttributePath::new("id"))), "simpleapp");
    assert_eq!(
        assert_ok!(created_state.get_string(&AttributePath::new("arn"))),
        MESH_ARN
    );
    assert_eq!(
        assert_ok!(created_state.get_string(&AttributePath::new("created_date"))),
        "2020-09-13T12:26:40Z"
    );
    assert_eq!(egress_type(&created_state), "ALLOW_ALL");

    let read = resource
        .read(Context::new(), read_request(created_state.clone()))
        .await;
    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    let read_state = read.new_state.unwrap();
    assert_eq!(egress_type(&read_state), "ALLOW_ALL");

    let planned = state(json!({
        "id": "simpleapp",
        "name": "simpleapp",
        "arn": MESH_ARN,
        "spec": [{"egress_filter": [{"type": "DROP_ALL"}]}]
    }));
    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "aws_appmesh_mesh".to_string(),
                prior_state: read_state,
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
                planned_identity: None,
            },
        )
        .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);
    assert_eq!(egress_type(&updated.new_state), "DROP_ALL");

    let read = resource
        .read(Context::new(), read_request(updated.new_state.clone()))
        .await;
    assert_eq!(egress_type(read.new_state.as_ref().unwrap()), "DROP_ALL");

    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "aws_appmesh_mesh".to_string(),
                prior_state: updated.new_state,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);

    create.assert_async().await;
    describe_before.assert_async().await;
    update.assert_async().await;
    describe_after.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn tag_only_update_skips_the_spec_call() {
    let mut server = Server::new_async().await;

    let update = server
        .mock("PUT", "/v20190125/meshes/simpleapp")
        .expect(0)
        .create_async()
        .await;
    let tag = server
        .mock("PUT", "/v20190125/tag")
        .match_query(Matcher::UrlEncoded(
            "resourceArn".to_string(),
            MESH_ARN.to_string(),
        ))
        .match_body(Matcher::Json(json!({"tags": [{"key": "c", "value": "3"}]})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let untag = server
        .mock("PUT", "/v20190125/untag")
        .match_query(Matcher::UrlEncoded(
            "resourceArn".to_string(),
            MESH_ARN.to_string(),
        ))
        .match_body(Matcher::Json(json!({"tagKeys": ["b"]})))
        .with_status(200)
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let _describe = server
        .mock("GET", "/v20190125/meshes/simpleapp")
        .with_status(200)
        .with_body(mesh_body("ALLOW_ALL"))
        .create_async()
        .await;
    let _tags = mock_tags(
        &mut server,
        json!([{"key": "a", "value": "1"}, {"key": "c", "value": "3"}]),
    )
    .await;

    let resource = configured_resource(&server).await;

    let spec = json!([{"egress_filter": [{"type": "ALLOW_ALL"}]}]);
    let prior = state(json!({
        "id": "simpleapp",
        "name": "simpleapp",
        "arn": MESH_ARN,
        "spec": spec,
        "tags": {"a": "1", "b": "2"},
        "tags_all": {"a": "1", "b": "2"}
    }));
    let planned = state(json!({
        "id": "simpleapp",
        "name": "simpleapp",
        "arn": MESH_ARN,
        "spec": spec,
        "tags": {"a": "1", "c": "3"}
    }));

    let updated = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "aws_appmesh_mesh".to_string(),
                prior_state: prior,
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
                planned_identity: None,
            },
        )
        .await;
    assert!(updated.diagnostics.is_empty(), "{:?}", updated.diagnostics);

    let tags = assert_ok!(updated.new_state.get_map(&AttributePath::new("tags")));
    assert_eq!(tags.len(), 2);
    assert!(tags.contains_key("c"));

    update.assert_async().await;
    tag.assert_async().await;
    untag.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn deleted_mesh_leaves_state() {
    let mut server = Server::new_async().await;

    let _describe = server
        .mock("GET", "/v20190125/meshes/simpleapp")
        .with_status(404)
        .with_header("x-amzn-ErrorType", "NotFoundException")
        .with_body(r#"{"message":"Mesh not found"}"#)
        .create_async()
        .await;

    let resource = configured_resource(&server).await;
    let read = resource
        .read(
            Context::new(),
            read_request(state(json!({"id": "simpleapp", "name": "simpleapp"}))),
        )
        .await;

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    assert!(read.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn soft_deleted_mesh_leaves_state() {
    let mut server = Server::new_async().await;

    let body = json!({
        "meshName": "simpleapp",
        "metadata": {"arn": MESH_ARN, "uid": "u-1"},
        "spec": {},
        "status": {"status": "DELETED"}
    });
    let _describe = server
        .mock("GET", "/v20190125/meshes/simpleapp")
        .with_status(200)
        .with_body(body.to_string())
        .create_async()
        .await;

    let resource = configured_resource(&server).await;
    let read = resource
        .read(
            Context::new(),
            read_request(state(json!({"id": "simpleapp", "name": "simpleapp"}))),
        )
        .await;

    assert!(read.diagnostics.is_empty(), "{:?}", read.diagnostics);
    assert!(read.new_state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_of_missing_mesh_succeeds() {
    let mut server = Server::new_async().await;

    let delete = server
        .mock("DELETE", "/v20190125/meshes/simpleapp")
        .with_status(404)
        .with_header("x-amzn-ErrorType", "NotFoundException")
        .with_body(r#"{"message":"Mesh not found"}"#)
        .expect(1)
        .create_async()
        .await;

    let resource = configured_resource(&server).await;
    let deleted = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "aws_appmesh_mesh".to_string(),
                prior_state: state(json!({"id": "simpleapp", "name": "simpleapp"})),
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;

    assert!(deleted.diagnostics.is_empty(), "{:?}", deleted.diagnostics);
    delete.assert_async().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn unconfigured_resource_reports_an_error() {
    let resource = MeshResource::new();
    let read = resource
        .read(
            Context::new(),
            read_request(state(json!({"id": "simpleapp", "name": "simpleapp"}))),
        )
        .await;

    assert_eq!(read.diagnostics.len(), 1);
    assert_eq!(read.diagnostics[0].summary, "Provider not configured");
}
