//! Read-only lookup of one App Mesh entity by name

use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{account_id, StringLenBetween};
use tracing::debug;

use crate::api::MeshEntity;
use crate::flex::SpecCodec;
use crate::provider_data::AppMeshProviderData;
use crate::resources::{find_entity, key_from_state, set_identity, set_metadata, EntityKind};
use crate::tags::KeyValueTags;

fn computed(name: &str, r#type: AttributeType, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, r#type)
        .description(description)
        .computed()
        .build()
}

fn lookup(name: &str, description: &str) -> tfplug::schema::Attribute {
    AttributeBuilder::new(name, AttributeType::String)
        .description(description)
        .required()
        .validator(StringLenBetween::create(1, 255))
        .build()
}

/// Data source schema: the lookup keys plus every resource attribute as computed
pub fn data_source_schema<K: EntityKind>() -> Schema {
    let display = K::DISPLAY_NAME.trim_start_matches("App Mesh ");
    let mut builder = SchemaBuilder::new()
        .version(0)
        .description(&format!("Reads an AWS App Mesh {}", display.to_lowercase()))
        .attribute(computed("id", AttributeType::String, "The ID of the resource"))
        .attribute(lookup("name", &format!("Name of the {}", display.to_lowercase())));

    if <K::Entity as MeshEntity>::SCOPED_TO_MESH {
        builder = builder
            .attribute(lookup("mesh_name", "Name of the service mesh"))
            .attribute(
                AttributeBuilder::new("mesh_owner", AttributeType::String)
                    .description("AWS account ID of the service mesh's owner")
                    .optional()
                    .computed()
                    .validator(account_id())
                    .build(),
            );
    }
    if let Some(parent) = K::PARENT_ATTRIBUTE {
        builder = builder.attribute(lookup(parent, "Name of the parent entity"));
    }

    let spec_type = K::spec_block().block.object_type();
    builder
        .attribute(computed("arn", AttributeType::String, "ARN of the resource"))
        .attribute(computed("created_date", AttributeType::String, "Creation date of the resource"))
        .attribute(computed(
            "last_updated_date",
            AttributeType::String,
            "Last update date of the resource",
        ))
        .attribute(computed(
            "resource_owner",
            AttributeType::String,
            "Resource owner's AWS account ID",
        ))
        .attribute(computed(
            "spec",
            AttributeType::List(Box::new(spec_type)),
            "Specification of the resource",
        ))
        .attribute(computed(
            "tags",
            AttributeType::Map(Box::new(AttributeType::String)),
            "Map of tags assigned to the resource",
        ))
        .build()
}

/// Generic App Mesh data source, parameterised by the entity kind
pub struct AppMeshDataSource<K> {
    provider_data: Option<AppMeshProviderData>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> Default for AppMeshDataSource<K> {
    fn default() -> Self {
        Self {
            provider_data: None,
            _kind: PhantomData,
        }
    }
}

impl<K: EntityKind> AppMeshDataSource<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn failure(diagnostic: Diagnostic) -> ReadDataSourceResponse {
        ReadDataSourceResponse::failed(diagnostic)
    }
}

#[async_trait]
impl<K: EntityKind> DataSource for AppMeshDataSource<K> {
    fn type_name(&self) -> &str {
        K::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        DataSourceSchemaResponse {
            schema: data_source_schema::<K>(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: data_source_schema::<K>().validate_config(&request.config),
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                return Self::failure(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ))
            }
        };

        let key = match key_from_state::<K>(&request.config) {
            Ok(key) => key,
            Err(diag) => return Self::failure(diag),
        };
        debug!("Reading {} data source: {}", K::DISPLAY_NAME, key.display_id());

        let entity = match find_entity::<K::Entity>(&data.client, &key).await {
            Ok(entity) => entity,
            Err(e) => {
                return Self::failure(Diagnostic::error(
                    format!("Failed to read {}", K::DISPLAY_NAME),
                    format!("reading {} ({}): {}", K::DISPLAY_NAME, key.display_id(), e),
                ))
            }
        };
        let metadata = entity.metadata().cloned().unwrap_or_default();

        let tags = match data.client.tags().list(&metadata.arn).await {
            Ok(remote) => KeyValueTags::from_wire(&remote)
                .ignore_aws()
                .ignore_config(&data.ignore_tags),
            Err(e) => {
                return Self::failure(Diagnostic::error(
                    format!("Failed to list tags for {}", K::DISPLAY_NAME),
                    format!("listing tags for {} ({}): {}", K::DISPLAY_NAME, metadata.arn, e),
                ))
            }
        };

        let id = if <K::Entity as MeshEntity>::SCOPED_TO_MESH {
            metadata.uid.clone()
        } else {
            key.name.clone()
        };

        let mut state = DynamicValue::new(Dynamic::Map(HashMap::new()));
        let populated = state
            .set_string(&AttributePath::new("id"), id)
            .and_then(|_| set_identity::<K>(&mut state, &key, metadata.mesh_owner.clone()))
            .and_then(|_| set_metadata(&mut state, &metadata))
            .and_then(|_| {
                state.set_dynamic(&AttributePath::new("spec"), K::Spec::flatten_spec(entity.spec()))
            })
            .and_then(|_| state.set_dynamic(&AttributePath::new("tags"), tags.to_dynamic()));

        match populated {
            Ok(()) => ReadDataSourceResponse::found(state),
            Err(e) => Self::failure(Diagnostic::error("Failed to set state", e.to_string())),
        }
    }
}

#[async_trait]
impl<K: EntityKind> DataSourceWithConfigure for AppMeshDataSource<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        match request.provider_data_as::<AppMeshProviderData>() {
            Ok(data) => {
                self.provider_data = Some(data);
                ConfigureDataSourceResponse {
                    diagnostics: vec![],
                }
            }
            Err(diagnostic) => ConfigureDataSourceResponse {
                diagnostics: vec![diagnostic],
            },
        }
    }
}
