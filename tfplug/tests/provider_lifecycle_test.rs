//! Provider, resource factory and schema plumbing exercised end to end

#![allow(clippy::disallowed_methods)] // Allow unwrap() in tests for clarity

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use tfplug::context::Context;
use tfplug::import::{import_state_passthrough_id, parse_import_id};
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetaSchemaRequest, ProviderMetaSchemaResponse, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse, ResourceFactory,
    StopProviderRequest, StopProviderResponse, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, ClientCapabilities, Diagnostic, DynamicValue, ServerCapabilities};
use tfplug::validator::StringLenBetween;
use tokio_test::assert_ok;

type Store = Arc<RwLock<HashMap<String, String>>>;

fn capabilities() -> ClientCapabilities {
    ClientCapabilities {
        deferral_allowed: false,
        write_only_attributes_allowed: false,
    }
}

fn note_schema() -> Schema {
    SchemaBuilder::new()
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .computed()
                .plan_modifier(UseStateForUnknown::create())
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .required()
                .validator(StringLenBetween::create(1, 8))
                .plan_modifier(RequiresReplace::create())
                .build(),
        )
        .block(
            NestedBlockBuilder::new("body")
                .max_items(1)
                .attribute(
                    AttributeBuilder::new("text", AttributeType::String)
                        .optional()
                        .build(),
                )
                .build(),
        )
        .build()
}

struct NotesProvider {
    store: Store,
}

#[async_trait]
impl Provider for NotesProvider {
    fn type_name(&self) -> &str {
        "notes"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: "notes".to_string(),
            server_capabilities: ServerCapabilities {
                plan_destroy: false,
                get_provider_schema_optional: false,
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
            schema: SchemaBuilder::new().build(),
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
        _request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(self.store.clone() as Arc<dyn Any + Send + Sync>),
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn stop(&self, _ctx: Context, _request: StopProviderRequest) -> StopProviderResponse {
        StopProviderResponse { error: None }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "notes_note".to_string(),
            Box::new(|| Box::new(NoteResource::default()) as Box<dyn ResourceWithConfigure>),
        );
        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        HashMap::new()
    }
}

#[derive(Default)]
struct NoteResource {
    store: Option<Store>,
}

impl NoteResource {
    fn not_configured() -> Diagnostic {
        Diagnostic::error("Provider not configured", "Store is missing")
    }
}

#[async_trait]
impl Resource for NoteResource {
    fn type_name(&self) -> &str {
        "notes_note"
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
            schema: note_schema(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: note_schema().validate_config(&request.config),
        }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let Some(store) = &self.store else {
            return CreateResourceResponse {
                new_state: request.planned_state,
                private: vec![],
                diagnostics: vec![Self::not_configured()],
            };
        };

        let name = request
            .planned_state
            .get_string(&AttributePath::new("name"))
            .unwrap();
        store.write().await.insert(name.clone(), "stored".to_string());

        let mut state = request.planned_state;
        state.set_string(&AttributePath::new("id"), name).unwrap();
        CreateResourceResponse {
            new_state: state,
            private: vec![],
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let id = request
            .current_state
            .get_string(&AttributePath::new("id"))
            .unwrap_or_default();
        let exists = match &self.store {
            Some(store) => store.read().await.contains_key(&id),
            None => false,
        };

        ReadResourceResponse {
            new_state: exists.then_some(request.current_state),
            diagnostics: vec![],
            private: vec![],
            deferred: None,
            new_identity: None,
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        UpdateResourceResponse {
            new_state: request.planned_state,
            private: vec![],
            diagnostics: vec![],
            new_identity: None,
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        if let (Some(store), Ok(id)) = (
            &self.store,
            request.prior_state.get_string(&AttributePath::new("id")),
        ) {
            store.write().await.remove(&id);
        }
        DeleteResourceResponse {
            diagnostics: vec![],
        }
    }

    fn as_import_state(&self) -> Option<&dyn ResourceWithImportState> {
        Some(self)
    }
}

#[async_trait]
impl ResourceWithConfigure for NoteResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        self.store = request
            .provider_data
            .and_then(|data| data.downcast::<RwLock<HashMap<String, String>>>().ok());
        ConfigureResourceResponse {
            diagnostics: vec![],
        }
    }
}

#[async_trait]
impl ResourceWithImportState for NoteResource {
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
        if let Err(e) = parse_import_id(&request.id, 1, "note-name") {
            response
                .diagnostics
                .push(Diagnostic::error("Invalid import ID", e.to_string()));
            return response;
        }
        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

async fn configured_note(provider: &mut NotesProvider) -> Box<dyn ResourceWithConfigure> {
    let response = provider
        .configure(
            Context::new(),
            ConfigureProviderRequest {
                terraform_version: "1.9.0".to_string(),
                config: DynamicValue::null(),
                client_capabilities: capabilities(),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());

    let factories = provider.resources();
    let mut resource = factories.get("notes_note").unwrap()();
    let configure = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: response.provider_data,
            },
        )
        .await;
    assert!(configure.diagnostics.is_empty());
    resource
}

#[tokio::test]
async fn factory_resource_receives_provider_data() {
    let store: Store = Arc::new(RwLock::new(HashMap::new()));
    let mut provider = NotesProvider {
        store: store.clone(),
    };
    let resource = configured_note(&mut provider).await;

    let mut planned = DynamicValue::null();
    assert_ok!(planned.set_string(&AttributePath::new("name"), "todo".to_string()));

    let created = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "notes_note".to_string(),
                planned_state: planned.clone(),
                config: planned,
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert!(created.diagnostics.is_empty());
    assert!(store.read().await.contains_key("todo"));

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "notes_note".to_string(),
                current_state: created.new_state,
                private: vec![],
                provider_meta: None,
                client_capabilities: capabilities(),
                current_identity: None,
            },
        )
        .await;
    assert!(read.new_state.is_some());
}

#[tokio::test]
async fn unconfigured_resource_reports_diagnostic() {
    let resource = NoteResource::default();
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "notes_note".to_string(),
                planned_state: DynamicValue::null(),
                config: DynamicValue::null(),
                planned_private: vec![],
                provider_meta: None,
            },
        )
        .await;
    assert_eq!(response.diagnostics[0].summary, "Provider not configured");
}

#[tokio::test]
async fn validate_runs_schema_validators() {
    let resource = NoteResource::default();
    let mut config = DynamicValue::null();
    assert_ok!(config.set_string(&AttributePath::new("name"), "much-too-long".to_string()));

    let response = resource
        .validate(
            Context::new(),
            ValidateResourceConfigRequest {
                type_name: "notes_note".to_string(),
                config,
                client_capabilities: capabilities(),
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 1);
    assert_eq!(
        response.diagnostics[0].attribute,
        Some(AttributePath::new("name"))
    );
}

#[tokio::test]
async fn import_is_reachable_through_factory() {
    let mut provider = NotesProvider {
        store: Arc::new(RwLock::new(HashMap::new())),
    };
    let resource = configured_note(&mut provider).await;
    let importer = resource.as_import_state().unwrap();

    let response = importer
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "notes_note".to_string(),
                id: "todo".to_string(),
                client_capabilities: capabilities(),
                identity: None,
            },
        )
        .await;
    assert_eq!(response.imported_resources.len(), 1);

    let rejected = importer
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "notes_note".to_string(),
                id: "a/b".to_string(),
                client_capabilities: capabilities(),
                identity: None,
            },
        )
        .await;
    assert!(rejected.imported_resources.is_empty());
    assert_eq!(rejected.diagnostics.len(), 1);
}

#[test]
fn plan_modifiers_flag_replacement_and_keep_computed_values() {
    let schema = note_schema();

    let mut prior = DynamicValue::null();
    prior
        .set_string(&AttributePath::new("id"), "todo".to_string())
        .unwrap();
    prior
        .set_string(&AttributePath::new("name"), "todo".to_string())
        .unwrap();

    let mut planned = DynamicValue::null();
    planned
        .set_string(&AttributePath::new("name"), "done".to_string())
        .unwrap();
    planned.mark_unknown(&AttributePath::new("id")).unwrap();

    let outcome = schema.apply_plan_modifiers(&planned, &prior, &planned);

    assert_eq!(outcome.requires_replace, vec![AttributePath::new("name")]);
    assert_eq!(
        outcome
            .planned_state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "todo"
    );
}
