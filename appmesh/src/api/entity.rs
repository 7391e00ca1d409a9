//! CRUD calls shared by every App Mesh entity type

use serde::de::IgnoredAny;
use serde::Serialize;
use std::collections::HashMap;
use std::marker::PhantomData;

use super::common::{ApiQueryParams, EntityKey, MeshEntity};
use super::error::ApiError;
use super::tags::TagRef;
use super::Client;

/// Request body for create calls; the name goes under the entity's own field
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEntityRequest<'a, S> {
    client_token: String,
    spec: &'a S,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tags: &'a [TagRef],
    #[serde(flatten)]
    name: HashMap<&'static str, &'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEntityRequest<'a, S> {
    client_token: String,
    spec: &'a S,
}

fn client_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Entity API, parameterised by the entity type
pub struct EntityApi<'a, E> {
    client: &'a Client,
    _entity: PhantomData<E>,
}

impl<'a, E: MeshEntity> EntityApi<'a, E> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn owner_params(key: &EntityKey) -> ApiQueryParams {
        if E::SCOPED_TO_MESH {
            ApiQueryParams::new().add_optional("meshOwner", key.mesh_owner.as_deref())
        } else {
            ApiQueryParams::new()
        }
    }

    /// PUT {collection}
    pub async fn create(
        &self,
        key: &EntityKey,
        spec: &E::Spec,
        tags: &[TagRef],
    ) -> Result<E, ApiError> {
        let request = CreateEntityRequest {
            client_token: client_token(),
            spec,
            tags,
            name: HashMap::from([(E::NAME_FIELD, key.name.as_str())]),
        };

        self.client
            .put(&E::collection_path(key), &Self::owner_params(key), &request)
            .await
    }

    /// GET {collection}/{name}
    pub async fn describe(&self, key: &EntityKey) -> Result<E, ApiError> {
        self.client
            .get(&E::resource_path(key), &Self::owner_params(key))
            .await
    }

    /// PUT {collection}/{name}
    pub async fn update(&self, key: &EntityKey, spec: &E::Spec) -> Result<E, ApiError> {
        let request = UpdateEntityRequest {
            client_token: client_token(),
            spec,
        };

        self.client
            .put(&E::resource_path(key), &Self::owner_params(key), &request)
            .await
    }

    /// DELETE {collection}/{name}
    pub async fn delete(&self, key: &EntityKey) -> Result<(), ApiError> {
        self.client
            .delete::<IgnoredAny>(&E::resource_path(key), &Self::owner_params(key))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::super::mesh::{EgressFilter, MeshSpec};
    use super::super::test_helpers::create_test_client;
    use super::super::virtual_router::{VirtualRouterListener, VirtualRouterSpec};
    use super::super::PortMapping;
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const MESH_BODY: &str = r#"{
        "meshName": "demo",
        "metadata": {"arn": "arn:aws:appmesh:us-west-2:123456789012:mesh/demo", "uid": "m-1", "version": 1},
        "spec": {"egressFilter": {"type": "ALLOW_ALL"}},
        "status": {"status": "ACTIVE"}
    }"#;

    #[tokio::test]
    async fn create_sends_name_spec_tags_and_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/v20190125/meshes")
            .match_query(Matcher::Missing)
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "meshName": "demo",
                    "spec": {"egressFilter": {"type": "ALLOW_ALL"}},
                    "tags": [{"key": "env", "value": "test"}]
                })),
                Matcher::Regex(r#""clientToken":"[0-9a-f-]{36}""#.to_string()),
            ]))
            .with_status(200)
            .with_body(MESH_BODY)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let spec = MeshSpec {
            egress_filter: Some(EgressFilter {
                filter_type: Some("ALLOW_ALL".to_string()),
            }),
            ..Default::default()
        };
        let tags = vec![TagRef {
            key: "env".to_string(),
            value: "test".to_string(),
        }];

        let mesh = client
            .meshes()
            .create(&EntityKey::mesh("demo"), &spec, &tags)
            .await
            .unwrap();

        assert_eq!(mesh.mesh_name, "demo");
        assert_eq!(mesh.metadata.as_ref().map(|m| m.uid.as_str()), Some("m-1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn scoped_calls_pass_mesh_owner() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/v20190125/meshes/demo/virtualRouters/router")
            .match_query(Matcher::UrlEncoded(
                "meshOwner".to_string(),
                "123456789012".to_string(),
            ))
            .match_body(Matcher::PartialJson(json!({
                "spec": {"listeners": [{"portMapping": {"port": 8080, "protocol": "http"}}]}
            })))
            .with_status(200)
            .with_body(
                r#"{"meshName":"demo","virtualRouterName":"router",
                    "metadata":{"arn":"arn","uid":"r-1"},"status":{"status":"ACTIVE"}}"#,
            )
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let key = EntityKey::new("demo", "router").with_owner(Some("123456789012".to_string()));
        let spec = VirtualRouterSpec {
            listeners: vec![VirtualRouterListener {
                port_mapping: Some(PortMapping {
                    port: Some(8080),
                    protocol: Some("http".to_string()),
                }),
            }],
        };

        client.virtual_routers().update(&key, &spec).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_ignores_response_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/v20190125/meshes/demo/virtualGateway/gw/gatewayRoutes/gr")
            .with_status(200)
            .with_body(r#"{"gatewayRouteName":"gr","status":{"status":"DELETED"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let key = EntityKey::new("demo", "gr").with_parent("gw");
        client.gateway_routes().delete(&key).await.unwrap();
        mock.assert_async().await;
    }
}
