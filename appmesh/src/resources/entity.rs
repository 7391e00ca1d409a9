//! CRUD, import and state upgrade shared by every App Mesh resource
//!
//! Each resource type only describes itself through [`EntityKind`]: its
//! wire types, its schema and a couple of names. The lifecycle is the same for
//! all of them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::{import_state_passthrough_id, parse_import_id};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource, ModifyPlanRequest,
    ModifyPlanResponse, ReadResourceRequest, ReadResourceResponse, Resource,
    ResourceMetadataRequest, ResourceMetadataResponse, ResourceSchemaRequest,
    ResourceSchemaResponse, ResourceWithConfigure, ResourceWithImportState,
    ResourceWithModifyPlan, ResourceWithUpgradeState, UpdateResourceRequest,
    UpdateResourceResponse, UpgradeResourceStateRequest, UpgradeResourceStateResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{NestedBlock, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::{debug, info, warn};

use super::schema;
use crate::api::{Client, EntityKey, MeshEntity, ResourceMetadata};
use crate::flex::{self, normalize, SpecCodec, ValidationError};
use crate::migrate::{raw_state_to_dynamic, MigrationTable};
use crate::provider_data::AppMeshProviderData;
use crate::retry::{retry_when_new_resource_not_found, ReadError, ReadOutcome};
use crate::tags::{state_tags, update_tags, KeyValueTags, StateTags};

/// Describes one App Mesh entity type to the generic resource and data source
pub trait EntityKind: Send + Sync + 'static {
    type Spec: SpecCodec + Send + Sync + 'static;
    type Entity: MeshEntity<Spec = Self::Spec>;

    /// Terraform type name, shared by the resource and the data source
    const TYPE_NAME: &'static str;

    /// Used in diagnostics and logs, e.g. "App Mesh Virtual Gateway"
    const DISPLAY_NAME: &'static str;

    /// Shape of the import ID, shown when an ID does not match it
    const IMPORT_FORMAT: &'static str;

    /// Attribute naming the owning virtual router or virtual gateway
    const PARENT_ATTRIBUTE: Option<&'static str> = None;

    /// The resource schema, built once
    fn schema() -> &'static Schema;

    /// The `spec` block of the resource schema
    fn spec_block() -> NestedBlock;

    fn validate_spec(spec: &Dynamic) -> flex::Result<()>;

    /// State upgrades; the current version must match the schema version
    fn migrations() -> MigrationTable {
        MigrationTable::new(0)
    }
}

fn scoped<K: EntityKind>() -> bool {
    <K::Entity as MeshEntity>::SCOPED_TO_MESH
}

fn path(name: &str) -> AttributePath {
    AttributePath::new(name)
}

/// Top-level resource schema around a kind's `spec` block
pub fn resource_schema<K: EntityKind>(description: &str, version: i64) -> Schema {
    let mut builder = SchemaBuilder::new()
        .version(version)
        .description(description)
        .attribute(schema::id_attribute())
        .attribute(schema::name_attribute(&format!(
            "Name to use for the {}",
            K::DISPLAY_NAME.trim_start_matches("App Mesh ").to_lowercase()
        )));

    if scoped::<K>() {
        builder = builder
            .attribute(schema::mesh_name_attribute())
            .attribute(schema::mesh_owner_attribute());
    }
    if let Some(parent) = K::PARENT_ATTRIBUTE {
        builder = builder.attribute(schema::parent_attribute(
            parent,
            &format!(
                "Name of the {} in which to create the resource",
                parent.trim_end_matches("_name").replace('_', " ")
            ),
        ));
    }
    for attribute in schema::metadata_attributes() {
        builder = builder.attribute(attribute);
    }

    builder
        .attribute(schema::tags_attribute())
        .attribute(schema::tags_all_attribute())
        .block(K::spec_block())
        .build()
}

/// Reads the identifying attributes of a configuration or state value
pub(crate) fn key_from_state<K: EntityKind>(state: &DynamicValue) -> Result<EntityKey, Diagnostic> {
    let required = |name: &str| {
        state
            .get_string(&path(name))
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Diagnostic::error(
                    format!("Missing {}", name),
                    format!("The '{}' attribute is required", name),
                )
                .with_attribute(path(name))
            })
    };

    let name = required("name")?;
    if !scoped::<K>() {
        return Ok(EntityKey::mesh(&name));
    }

    let mut key = EntityKey::new(&required("mesh_name")?, &name)
        .with_owner(state.get_string(&path("mesh_owner")).ok());
    if let Some(parent) = K::PARENT_ATTRIBUTE {
        key = key.with_parent(&required(parent)?);
    }
    Ok(key)
}

/// Describes an entity, treating a deleted status as gone
pub(crate) async fn find_entity<E: MeshEntity>(
    client: &Client,
    key: &EntityKey,
) -> Result<E, ReadError> {
    let entity = client.entities::<E>().describe(key).await?;

    let deleted = match (entity.metadata(), entity.status()) {
        (Some(metadata), Some(status)) => status.is_deleted().then(|| metadata.arn.clone()),
        _ => return Err(ReadError::EmptyResult),
    };
    if let Some(arn) = deleted {
        return Err(ReadError::SoftDeleted { arn });
    }
    Ok(entity)
}

fn optional_string(value: Option<String>) -> Dynamic {
    value.map_or(Dynamic::Null, Dynamic::String)
}

/// Sets the read-only metadata attributes
pub(crate) fn set_metadata(
    state: &mut DynamicValue,
    metadata: &ResourceMetadata,
) -> tfplug::Result<()> {
    state.set_string(&path("arn"), metadata.arn.clone())?;
    state.set_dynamic(&path("created_date"), optional_string(metadata.created_date()))?;
    state.set_dynamic(
        &path("last_updated_date"),
        optional_string(metadata.last_updated_date()),
    )?;
    state.set_dynamic(
        &path("resource_owner"),
        optional_string(metadata.resource_owner.clone()),
    )?;
    Ok(())
}

/// Identity attributes: name, mesh_name, mesh_owner and the parent
pub(crate) fn set_identity<K: EntityKind>(
    state: &mut DynamicValue,
    key: &EntityKey,
    mesh_owner: Option<String>,
) -> tfplug::Result<()> {
    state.set_string(&path("name"), key.name.clone())?;
    if scoped::<K>() {
        state.set_string(&path("mesh_name"), key.mesh_name.clone())?;
        state.set_dynamic(&path("mesh_owner"), optional_string(mesh_owner))?;
    }
    if let Some(parent) = K::PARENT_ATTRIBUTE {
        state.set_string(&path(parent), key.parent.clone().unwrap_or_default())?;
    }
    Ok(())
}

/// Full resource state from a describe response
fn entity_state<K: EntityKind>(
    id: &str,
    key: &EntityKey,
    entity: &K::Entity,
    tags: &StateTags,
) -> tfplug::Result<DynamicValue> {
    let metadata = entity.metadata().cloned().unwrap_or_default();

    let mut state = DynamicValue::new(Dynamic::Map(HashMap::new()));
    state.set_string(&path("id"), id.to_string())?;
    set_identity::<K>(&mut state, key, metadata.mesh_owner.clone())?;
    set_metadata(&mut state, &metadata)?;
    state.set_dynamic(&path("spec"), K::Spec::flatten_spec(entity.spec()))?;
    state.set_dynamic(&path("tags"), tags.tags.to_dynamic())?;
    state.set_dynamic(&path("tags_all"), tags.tags_all.to_dynamic())?;
    Ok(state)
}

pub(crate) fn validation_diagnostic(err: &ValidationError) -> Diagnostic {
    Diagnostic::error("Invalid spec configuration", err.to_string()).with_attribute(err.path().clone())
}

/// Default tags overlaid with the configured tags, minus anything never managed here
fn effective_tags(data: &AppMeshProviderData, tags: Option<&Dynamic>) -> KeyValueTags {
    data.default_tags
        .merge_tags(&KeyValueTags::from_dynamic(tags))
        .ignore_aws()
        .ignore_config(&data.ignore_tags)
}

fn spec_changed(prior: Option<&Dynamic>, planned: Option<&Dynamic>) -> bool {
    let prior = prior.map(normalize).unwrap_or(Dynamic::Null);
    let planned = planned.map(normalize).unwrap_or(Dynamic::Null);
    prior != planned
}

/// Generic App Mesh resource, parameterised by the entity kind
pub struct AppMeshResource<K> {
    provider_data: Option<AppMeshProviderData>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: EntityKind> Default for AppMeshResource<K> {
    fn default() -> Self {
        Self {
            provider_data: None,
            _kind: PhantomData,
        }
    }
}

impl<K: EntityKind> AppMeshResource<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_configured() -> Diagnostic {
        Diagnostic::error(
            "Provider not configured",
            "Provider data was not properly configured",
        )
    }

    fn failed(action: &str, verb: &str, id: &str, err: impl std::fmt::Display) -> Diagnostic {
        Diagnostic::error(
            format!("Failed to {} {}", action, K::DISPLAY_NAME),
            format!("{} {} ({}): {}", verb, K::DISPLAY_NAME, id, err),
        )
    }

    /// Reads the remote entity into a full state value
    ///
    /// `Ok(None)` means an existing resource is gone and should leave state.
    async fn read_state(
        &self,
        ctx: &Context,
        data: &AppMeshProviderData,
        key: &EntityKey,
        id: &str,
        is_new: bool,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = data.client.as_ref();
        let outcome = retry_when_new_resource_not_found(ctx, &data.propagation, is_new, || {
            find_entity::<K::Entity>(client, key)
        })
        .await
        .map_err(|e| Self::failed("read", "reading", id, e))?;

        let entity = match outcome {
            ReadOutcome::Visible(entity) => entity,
            ReadOutcome::Gone => {
                warn!("{} ({}) not found, removing from state", K::DISPLAY_NAME, id);
                return Ok(None);
            }
        };

        let arn = entity.metadata().map(|m| m.arn.clone()).unwrap_or_default();
        let remote = client.tags().list(&arn).await.map_err(|e| {
            Diagnostic::error(
                format!("Failed to list tags for {}", K::DISPLAY_NAME),
                format!("listing tags for {} ({}): {}", K::DISPLAY_NAME, arn, e),
            )
        })?;
        let tags = state_tags(
            &KeyValueTags::from_wire(&remote),
            &data.default_tags,
            &data.ignore_tags,
        );

        entity_state::<K>(id, key, &entity, &tags)
            .map(Some)
            .map_err(|e| Diagnostic::error("Failed to set state", e.to_string()))
    }
}

#[async_trait]
impl<K: EntityKind> Resource for AppMeshResource<K> {
    fn type_name(&self) -> &str {
        K::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: K::schema().clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = K::schema().validate_config(&request.config);

        if let Some(spec) = request.config.get(&path("spec")) {
            if let Err(e) = K::validate_spec(spec) {
                diagnostics.push(validation_diagnostic(&e));
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];
        let planned = request.planned_state;

        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Self::not_configured());
                return CreateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let prepared = key_from_state::<K>(&planned).and_then(|key| {
            K::Spec::expand_spec(planned.get(&path("spec")))
                .map(|spec| (key, spec))
                .map_err(|e| validation_diagnostic(&e))
        });
        let (key, spec) = match prepared {
            Ok(prepared) => prepared,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        let tags = effective_tags(data, planned.get(&path("tags")));
        info!("Creating {}: {}", K::DISPLAY_NAME, key.display_id());

        let created = data
            .client
            .entities::<K::Entity>()
            .create(&key, &spec, &tags.to_wire())
            .await;
        let id = match created {
            Ok(_) if !scoped::<K>() => key.name.clone(),
            Ok(entity) => match entity.metadata().map(|m| m.uid.clone()) {
                Some(uid) if !uid.is_empty() => uid,
                _ => {
                    diagnostics.push(Self::failed(
                        "create",
                        "creating",
                        &key.name,
                        ReadError::EmptyResult,
                    ));
                    return CreateResourceResponse {
                        new_state: planned,
                        private: vec![],
                        diagnostics,
                    };
                }
            },
            Err(e) => {
                diagnostics.push(Self::failed("create", "creating", &key.name, e));
                return CreateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                };
            }
        };

        match self.read_state(&ctx, data, &key, &id, true).await {
            Ok(Some(new_state)) => CreateResourceResponse {
                new_state,
                private: vec![],
                diagnostics,
            },
            Ok(None) => {
                diagnostics.push(Self::failed("read", "reading", &id, "not found after create"));
                CreateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                }
            }
            Err(diag) => {
                diagnostics.push(diag);
                CreateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];
        let current = request.current_state;

        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Self::not_configured());
                return ReadResourceResponse {
                    new_state: Some(current),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                    new_identity: None,
                };
            }
        };

        let key = match key_from_state::<K>(&current) {
            Ok(key) => key,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(current),
                    diagnostics,
                    private: request.private,
                    deferred: None,
                    new_identity: None,
                };
            }
        };
        let id = current
            .get_string(&path("id"))
            .unwrap_or_else(|_| key.display_id());

        let new_state = match self.read_state(&ctx, data, &key, &id, false).await {
            Ok(new_state) => new_state,
            Err(diag) => {
                diagnostics.push(diag);
                Some(current)
            }
        };

        ReadResourceResponse {
            new_state,
            diagnostics,
            private: request.private,
            deferred: None,
            new_identity: None,
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];
        let prior = request.prior_state;
        let planned = request.planned_state;

        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Self::not_configured());
                return UpdateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                    new_identity: None,
                };
            }
        };

        let key = match key_from_state::<K>(&planned) {
            Ok(key) => key,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: planned,
                    private: vec![],
                    diagnostics,
                    new_identity: None,
                };
            }
        };
        let id = prior
            .get_string(&path("id"))
            .unwrap_or_else(|_| key.display_id());

        let spec_path = path("spec");
        if spec_changed(prior.get(&spec_path), planned.get(&spec_path)) {
            let spec = match K::Spec::expand_spec(planned.get(&spec_path)) {
                Ok(spec) => spec,
                Err(e) => {
                    diagnostics.push(validation_diagnostic(&e));
                    return UpdateResourceResponse {
                        new_state: prior,
                        private: vec![],
                        diagnostics,
                        new_identity: None,
                    };
                }
            };

            info!("Updating {}: {}", K::DISPLAY_NAME, id);
            if let Err(e) = data
                .client
                .entities::<K::Entity>()
                .update(&key, &spec)
                .await
            {
                diagnostics.push(Self::failed("update", "updating", &id, e));
                return UpdateResourceResponse {
                    new_state: prior,
                    private: vec![],
                    diagnostics,
                    new_identity: None,
                };
            }
        }

        let old_all = KeyValueTags::from_dynamic(prior.get(&path("tags_all")));
        let new_all = effective_tags(data, planned.get(&path("tags")));
        if old_all != new_all {
            let arn = prior.get_string(&path("arn")).unwrap_or_default();
            if let Err(e) = update_tags(
                &data.client.tags(),
                &arn,
                &old_all,
                &new_all,
                &data.ignore_tags,
            )
            .await
            {
                diagnostics.push(Diagnostic::error(
                    format!("Failed to update tags for {}", K::DISPLAY_NAME),
                    format!("updating tags for {} ({}): {}", K::DISPLAY_NAME, arn, e),
                ));
                return UpdateResourceResponse {
                    new_state: prior,
                    private: vec![],
                    diagnostics,
                    new_identity: None,
                };
            }
        }

        let new_state = match self.read_state(&ctx, data, &key, &id, false).await {
            Ok(Some(state)) => state,
            Ok(None) => {
                diagnostics.push(Self::failed("read", "reading", &id, "not found after update"));
                planned
            }
            Err(diag) => {
                diagnostics.push(diag);
                planned
            }
        };

        UpdateResourceResponse {
            new_state,
            private: vec![],
            diagnostics,
            new_identity: None,
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Self::not_configured());
                return DeleteResourceResponse { diagnostics };
            }
        };

        let key = match key_from_state::<K>(&request.prior_state) {
            Ok(key) => key,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };
        let id = request
            .prior_state
            .get_string(&path("id"))
            .unwrap_or_else(|_| key.display_id());

        info!("Deleting {}: {}", K::DISPLAY_NAME, id);
        match data.client.entities::<K::Entity>().delete(&key).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("{} ({}) already deleted", K::DISPLAY_NAME, id);
            }
            Err(e) => diagnostics.push(Self::failed("delete", "deleting", &id, e)),
        }

        DeleteResourceResponse { diagnostics }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }

    fn as_upgrade_state(&self) -> Option<&dyn ResourceWithUpgradeState> {
        Some(self)
    }

    fn as_modify_plan(&self) -> Option<&dyn ResourceWithModifyPlan> {
        Some(self)
    }
}

#[async_trait]
impl<K: EntityKind> ResourceWithConfigure for AppMeshResource<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<AppMeshProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract AppMeshProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<K: EntityKind> ResourceWithImportState for AppMeshResource<K> {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
            deferred: None,
        };

        let data = match &self.provider_data {
            Some(data) => data,
            None => {
                response.diagnostics.push(Self::not_configured());
                return response;
            }
        };

        let parts = 1 + usize::from(scoped::<K>()) + usize::from(K::PARENT_ATTRIBUTE.is_some());
        let segments = match parse_import_id(&request.id, parts, K::IMPORT_FORMAT) {
            Ok(segments) => segments,
            Err(e) => {
                response.diagnostics.push(Diagnostic::error(
                    format!("Failed to import {}", K::DISPLAY_NAME),
                    e.to_string(),
                ));
                return response;
            }
        };

        let key = match segments.as_slice() {
            [name] => EntityKey::mesh(name),
            [mesh, name] => EntityKey::new(mesh, name),
            [mesh, parent, name] => EntityKey::new(mesh, name).with_parent(parent),
            _ => unreachable!("parse_import_id checked the segment count"),
        };

        debug!("Importing {}: {}", K::DISPLAY_NAME, request.id);
        let entity = match find_entity::<K::Entity>(&data.client, &key).await {
            Ok(entity) => entity,
            Err(e) => {
                response
                    .diagnostics
                    .push(Self::failed("import", "importing", &request.id, e));
                return response;
            }
        };

        // A mesh is identified by its name alone.
        if !scoped::<K>() {
            import_state_passthrough_id(&ctx, path("id"), &request, &mut response);
            if let Some(imported) = response.imported_resources.first_mut() {
                if let Err(e) = imported.state.set_string(&path("name"), key.name.clone()) {
                    response
                        .diagnostics
                        .push(Diagnostic::error("Failed to set imported state", e.to_string()));
                }
            }
            return response;
        }

        let id = entity.metadata().map(|m| m.uid.clone()).unwrap_or_default();

        let mut state = DynamicValue::new(Dynamic::Map(HashMap::new()));
        let populated = state
            .set_string(&path("id"), id)
            .and_then(|_| set_identity::<K>(&mut state, &key, None));
        if let Err(e) = populated {
            response
                .diagnostics
                .push(Diagnostic::error("Failed to set imported state", e.to_string()));
            return response;
        }

        response.imported_resources.push(ImportedResource {
            type_name: request.type_name,
            state,
            private: vec![],
            identity: request.identity,
        });
        response
    }
}

#[async_trait]
impl<K: EntityKind> ResourceWithUpgradeState for AppMeshResource<K> {
    async fn upgrade_state(
        &self,
        _ctx: Context,
        request: UpgradeResourceStateRequest,
    ) -> UpgradeResourceStateResponse {
        let mut diagnostics = vec![];

        let upgraded = raw_state_to_dynamic(&request.raw_state)
            .and_then(|state| K::migrations().upgrade(request.version, state));

        let upgraded_state = match upgraded {
            Ok(state) => DynamicValue::new(state),
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    format!("Failed to upgrade {} state", K::DISPLAY_NAME),
                    format!("upgrading state from version {}: {}", request.version, e),
                ));
                DynamicValue::null()
            }
        };

        UpgradeResourceStateResponse {
            upgraded_state,
            diagnostics,
        }
    }
}

#[async_trait]
impl<K: EntityKind> ResourceWithModifyPlan for AppMeshResource<K> {
    async fn modify_plan(&self, _ctx: Context, request: ModifyPlanRequest) -> ModifyPlanResponse {
        let outcome = K::schema().apply_plan_modifiers(
            &request.config,
            &request.prior_state,
            &request.proposed_new_state,
        );
        let mut planned_state = outcome.planned_state;
        let mut diagnostics = outcome.diagnostics;

        // tags_all follows the configured tags and the provider default tags.
        if !planned_state.is_null() {
            if let Some(data) = &self.provider_data {
                let tags_all = path("tags_all");
                let configured = request.config.get(&path("tags"));
                let result = if configured.map_or(true, Dynamic::is_wholly_known) {
                    planned_state
                        .set_dynamic(&tags_all, effective_tags(data, configured).to_dynamic())
                } else {
                    planned_state.mark_unknown(&tags_all)
                };
                if let Err(e) = result {
                    diagnostics.push(
                        Diagnostic::error("Failed to plan tags_all", e.to_string())
                            .with_attribute(tags_all),
                    );
                }
            }
        }

        ModifyPlanResponse {
            planned_state,
            requires_replace: outcome.requires_replace,
            planned_private: request.prior_private,
            diagnostics,
        }
    }
}
