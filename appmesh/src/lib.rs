//! Terraform provider for AWS App Mesh
//!
//! Manages meshes, virtual nodes, routers, services and gateways, and their
//! routes, through the App Mesh REST API.

pub mod api;
pub mod config;
pub mod data_sources;
pub mod flex;
pub mod migrate;
pub mod provider_data;
pub mod resources;
pub mod retry;
pub mod tags;

pub use provider_data::AppMeshProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tfplug::context::Context;
use tfplug::logging::{init_tracing, LogLevel};
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetaSchemaRequest, ProviderMetaSchemaResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
    StopProviderRequest, StopProviderResponse, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder};
use tfplug::types::{Diagnostic, ServerCapabilities};
use tfplug::validator::IntAtLeast;
use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::data_sources::{
    GatewayRouteDataSource, MeshDataSource, RouteDataSource, VirtualGatewayDataSource,
    VirtualNodeDataSource, VirtualRouterDataSource, VirtualServiceDataSource,
};
use crate::resources::{
    GatewayRouteResource, MeshResource, RouteResource, VirtualGatewayResource,
    VirtualNodeResource, VirtualRouterResource, VirtualServiceResource,
};

fn string_attribute(name: &str, description: &str) -> AttributeBuilder {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .optional()
}

fn provider_schema() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let string_set = || AttributeType::Set(Box::new(AttributeType::String));

        SchemaBuilder::new()
            .version(0)
            .description("AWS App Mesh provider")
            .attribute(
                string_attribute("region", "AWS region (or AWS_REGION / AWS_DEFAULT_REGION / profile)")
                    .build(),
            )
            .attribute(
                string_attribute("profile", "Shared config profile (or AWS_PROFILE)").build(),
            )
            .attribute(
                string_attribute("endpoint", "App Mesh endpoint override (or AWS_ENDPOINT_URL_APPMESH)")
                    .build(),
            )
            .attribute(string_attribute("access_key", "AWS access key (or AWS_ACCESS_KEY_ID)").build())
            .attribute(
                string_attribute("secret_key", "AWS secret key (or AWS_SECRET_ACCESS_KEY)")
                    .sensitive()
                    .build(),
            )
            .attribute(
                string_attribute("token", "Session token (or AWS_SESSION_TOKEN)")
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("max_retries", AttributeType::Number)
                    .description("Maximum number of retries for throttled or failed requests")
                    .optional()
                    .validator(IntAtLeast::create(0))
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("default_tags")
                    .max_items(1)
                    .description("Tags applied to every resource")
                    .attribute(
                        AttributeBuilder::new(
                            "tags",
                            AttributeType::Map(Box::new(AttributeType::String)),
                        )
                        .optional()
                        .build(),
                    )
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("ignore_tags")
                    .max_items(1)
                    .description("Tag keys the provider never manages")
                    .attribute(AttributeBuilder::new("keys", string_set()).optional().build())
                    .attribute(
                        AttributeBuilder::new("key_prefixes", string_set())
                            .optional()
                            .build(),
                    )
                    .build(),
            )
            .build()
    })
}

pub struct AppMeshProvider {
    provider_data: Option<AppMeshProviderData>,
}

impl Default for AppMeshProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AppMeshProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }
}

#[async_trait]
impl Provider for AppMeshProvider {
    fn type_name(&self) -> &str {
        "aws"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities {
                plan_destroy: false,
                get_provider_schema_optional: true,
                move_resource_state: false,
            },
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        ProviderSchemaResponse {
            schema: provider_schema().clone(),
            diagnostics: vec![],
        }
    }

    async fn meta_schema(
        &self,
        _ctx: Context,
        _request: ProviderMetaSchemaRequest,
    ) -> ProviderMetaSchemaResponse {
        ProviderMetaSchemaResponse {
            schema: None,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let mut diagnostics = vec![];

        if let Err(e) = init_tracing(LogLevel::from_env()) {
            debug!("Keeping the existing log subscriber: {}", e);
        }

        let config = match ProviderConfig::from_dynamic(&request.config) {
            Ok(config) => config,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Invalid provider configuration", e.to_string()));
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        let resolved = match config.resolve().await {
            Ok(resolved) => resolved,
            Err(e) => {
                diagnostics.push(Diagnostic::error("Invalid provider configuration", e.to_string()));
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        let client = match api::Client::with_config(
            &resolved.endpoint,
            &resolved.region,
            resolved.credentials,
            config.retry_config(),
        ) {
            Ok(client) => client,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                ));
                return ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                };
            }
        };

        info!(
            "Configured App Mesh provider for region {} at {}",
            resolved.region, resolved.endpoint
        );

        let data = AppMeshProviderData::new(client)
            .with_tag_config(config.default_tags, config.ignore_tags);
        self.provider_data = Some(data.clone());

        ConfigureProviderResponse {
            diagnostics,
            provider_data: Some(Arc::new(data)),
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: provider_schema().validate_config(&request.config),
        }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        if let Some(data) = &self.provider_data {
            let stats = data.client.get_connection_stats().await;
            debug!(
                "Stopping App Mesh provider after {} requests ({} failed, {} retried)",
                stats.total_requests, stats.failed_requests, stats.retried_requests
            );
        } else {
            debug!("Stopping App Mesh provider");
        }
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();

        fn factory<R: ResourceWithConfigure + Default + 'static>() -> ResourceFactory {
            Box::new(|| Box::new(R::default()) as Box<dyn ResourceWithConfigure>)
        }

        resources.insert("aws_appmesh_mesh".to_string(), factory::<MeshResource>());
        resources.insert(
            "aws_appmesh_virtual_node".to_string(),
            factory::<VirtualNodeResource>(),
        );
        resources.insert(
            "aws_appmesh_virtual_router".to_string(),
            factory::<VirtualRouterResource>(),
        );
        resources.insert(
            "aws_appmesh_virtual_service".to_string(),
            factory::<VirtualServiceResource>(),
        );
        resources.insert(
            "aws_appmesh_virtual_gateway".to_string(),
            factory::<VirtualGatewayResource>(),
        );
        resources.insert("aws_appmesh_route".to_string(), factory::<RouteResource>());
        resources.insert(
            "aws_appmesh_gateway_route".to_string(),
            factory::<GatewayRouteResource>(),
        );

        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();

        fn factory<D: DataSourceWithConfigure + Default + 'static>() -> DataSourceFactory {
            Box::new(|| Box::new(D::default()) as Box<dyn DataSourceWithConfigure>)
        }

        data_sources.insert("aws_appmesh_mesh".to_string(), factory::<MeshDataSource>());
        data_sources.insert(
            "aws_appmesh_virtual_node".to_string(),
            factory::<VirtualNodeDataSource>(),
        );
        data_sources.insert(
            "aws_appmesh_virtual_router".to_string(),
            factory::<VirtualRouterDataSource>(),
        );
        data_sources.insert(
            "aws_appmesh_virtual_service".to_string(),
            factory::<VirtualServiceDataSource>(),
        );
        data_sources.insert(
            "aws_appmesh_virtual_gateway".to_string(),
            factory::<VirtualGatewayDataSource>(),
        );
        data_sources.insert("aws_appmesh_route".to_string(), factory::<RouteDataSource>());
        data_sources.insert(
            "aws_appmesh_gateway_route".to_string(),
            factory::<GatewayRouteDataSource>(),
        );

        data_sources
    }
}
