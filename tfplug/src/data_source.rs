//! Read-only lookups of existing remote objects
//!
//! A data source is looked up by its identifying attributes, for example
//! `aws_appmesh_virtual_node` by `mesh_name` and `name`, and the whole object
//! is written back as computed state. There is no plan and no apply.

use crate::context::Context;
use crate::schema::Schema;
use crate::types::{ClientCapabilities, Deferred, Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Key under which the provider registers this data source, e.g. `aws_appmesh_mesh`
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse;

    async fn schema(
        &self,
        ctx: Context,
        request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse;

    async fn validate(
        &self,
        ctx: Context,
        request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse;

    /// Looks the object up and returns every attribute, lookup keys included.
    /// A missing object is an error diagnostic, never an empty state.
    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse;
}

pub struct DataSourceMetadataRequest;

pub struct DataSourceMetadataResponse {
    pub type_name: String,
}

pub struct DataSourceSchemaRequest;

pub struct DataSourceSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ValidateDataSourceConfigRequest {
    pub type_name: String,
    pub config: DynamicValue,
}

pub struct ValidateDataSourceConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ReadDataSourceRequest {
    pub type_name: String,
    pub config: DynamicValue,
    pub provider_meta: Option<DynamicValue>,
    pub client_capabilities: ClientCapabilities,
}

pub struct ReadDataSourceResponse {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
    pub deferred: Option<Deferred>,
}

impl ReadDataSourceResponse {
    pub fn found(state: DynamicValue) -> Self {
        Self {
            state,
            diagnostics: vec![],
            deferred: None,
        }
    }

    /// Null state with a single error
    pub fn failed(diagnostic: Diagnostic) -> Self {
        Self {
            state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
            deferred: None,
        }
    }
}

/// Receives the provider's shared data (API client, tag settings) right after
/// the factory builds the data source
#[async_trait]
pub trait DataSourceWithConfigure: DataSource {
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse;
}

pub struct ConfigureDataSourceRequest {
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl ConfigureDataSourceRequest {
    /// Provider data downcast to the provider's concrete type
    pub fn provider_data_as<T: Clone + 'static>(&self) -> Result<T, Diagnostic> {
        let data = self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            )
        })?;
        data.downcast_ref::<T>().cloned().ok_or_else(|| {
            Diagnostic::error(
                "Invalid provider data",
                format!(
                    "Failed to extract {} from provider data",
                    std::any::type_name::<T>().rsplit("::").next().unwrap_or_default()
                ),
            )
        })
    }
}

pub struct ConfigureDataSourceResponse {
    pub diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct MeshClient {
        region: String,
    }

    fn request(data: Option<Arc<dyn Any + Send + Sync>>) -> ConfigureDataSourceRequest {
        ConfigureDataSourceRequest {
            provider_data: data,
        }
    }

    #[test]
    fn provider_data_is_downcast() {
        let client = MeshClient {
            region: "us-west-2".to_string(),
        };
        let data = request(Some(Arc::new(client.clone())))
            .provider_data_as::<MeshClient>()
            .unwrap();
        assert_eq!(data, client);
    }

    #[test]
    fn wrong_provider_data_names_the_expected_type() {
        let diag = request(Some(Arc::new("not a client")))
            .provider_data_as::<MeshClient>()
            .unwrap_err();
        assert_eq!(diag.summary, "Invalid provider data");
        assert_eq!(diag.detail, "Failed to extract MeshClient from provider data");
    }

    #[test]
    fn missing_provider_data_is_reported() {
        let diag = request(None).provider_data_as::<MeshClient>().unwrap_err();
        assert_eq!(diag.summary, "No provider data");
    }

    #[test]
    fn failed_read_has_null_state() {
        let response = ReadDataSourceResponse::failed(Diagnostic::error(
            "Failed to read Virtual Node",
            "not found",
        ));
        assert!(response.state.is_null());
        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.deferred.is_none());
    }
}
