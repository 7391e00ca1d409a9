use aws_credential_types::provider::SharedCredentialsProvider;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use super::common::{ApiQueryParams, AwsErrorBody, MeshEntity};
use super::entity::EntityApi;
use super::error::ApiError;
use super::gateway_route::GatewayRouteData;
use super::mesh::MeshData;
use super::pool::{ConnectionPoolConfig, ConnectionPoolManager, ConnectionStats};
use super::route::RouteData;
use super::signing::{RequestSigner, SigningRequest};
use super::tags::TagsApi;
use super::virtual_gateway::VirtualGatewayData;
use super::virtual_node::VirtualNodeData;
use super::virtual_router::VirtualRouterData;
use super::virtual_service::VirtualServiceData;

pub const SIGNING_SERVICE: &str = "appmesh";

const ERROR_TYPE_HEADER: &str = "x-amzn-ErrorType";

/// App Mesh API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    signer: RequestSigner,
    retry_config: RetryConfig,
    pool_manager: ConnectionPoolManager,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl RetryConfig {
    /// Delay before retry `attempt` (1-based), doubling up to `max_backoff_ms`
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let factor = 1_u64
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u64::MAX);
        self.initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms)
    }
}

impl Client {
    /// Public regional endpoint
    pub fn default_endpoint(region: &str) -> String {
        format!("https://appmesh.{}.amazonaws.com", region)
    }

    /// Create a new API client with default configuration
    pub fn new(
        endpoint: &str,
        region: &str,
        credentials: SharedCredentialsProvider,
    ) -> Result<Self, ApiError> {
        Self::with_config(endpoint, region, credentials, RetryConfig::default())
    }

    /// Create a new API client with custom retry configuration
    pub fn with_config(
        endpoint: &str,
        region: &str,
        credentials: SharedCredentialsProvider,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let url = url::Url::parse(endpoint)
            .map_err(|e| ApiError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if url.host_str().is_none() {
            return Err(ApiError::InvalidEndpoint(format!("{}: missing host", endpoint)));
        }

        let pool_config = ConnectionPoolConfig {
            request_timeout: std::time::Duration::from_secs(retry_config.timeout_seconds),
            ..Default::default()
        };

        let pool_manager = ConnectionPoolManager::new(pool_config);
        let http_client = pool_manager.build_client()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url: endpoint.trim_end_matches('/').to_string(),
                signer: RequestSigner::new(credentials, region, SIGNING_SERVICE),
                retry_config,
                pool_manager,
            }),
        })
    }

    pub fn region(&self) -> &str {
        self.inner.signer.region()
    }

    /// Execute a GET request with retry logic
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, params, Vec::new()).await
    }

    /// Execute a PUT request with a JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        params: &ApiQueryParams,
        body: &B,
    ) -> Result<T, ApiError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| ApiError::ParseError(e.to_string()))?;
        self.send(Method::PUT, path, params, payload).await
    }

    /// Execute a DELETE request with retry logic
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &ApiQueryParams,
    ) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, params, Vec::new()).await
    }

    /// Get connection pool statistics
    pub async fn get_connection_stats(&self) -> ConnectionStats {
        self.inner.pool_manager.get_stats().await
    }

    /// Operations on any entity type
    pub fn entities<E: MeshEntity>(&self) -> EntityApi<'_, E> {
        EntityApi::new(self)
    }

    pub fn meshes(&self) -> EntityApi<'_, MeshData> {
        self.entities()
    }

    pub fn virtual_nodes(&self) -> EntityApi<'_, VirtualNodeData> {
        self.entities()
    }

    pub fn virtual_routers(&self) -> EntityApi<'_, VirtualRouterData> {
        self.entities()
    }

    pub fn virtual_services(&self) -> EntityApi<'_, VirtualServiceData> {
        self.entities()
    }

    pub fn virtual_gateways(&self) -> EntityApi<'_, VirtualGatewayData> {
        self.entities()
    }

    pub fn routes(&self) -> EntityApi<'_, RouteData> {
        self.entities()
    }

    pub fn gateway_routes(&self) -> EntityApi<'_, GatewayRouteData> {
        self.entities()
    }

    /// Resource tagging operations
    pub fn tags(&self) -> TagsApi<'_> {
        TagsApi::new(self)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &ApiQueryParams,
        payload: Vec<u8>,
    ) -> Result<T, ApiError> {
        let url = format!(
            "{}{}{}",
            self.inner.base_url,
            path,
            params.to_query_string()
        );
        let (method, url, payload) = (&method, &url, &payload);

        self.execute_with_retry(
            || async move {
                tracing::debug!("{} request to: {}", method, url);

                let signed = self
                    .inner
                    .signer
                    .sign(&SigningRequest {
                        method: method.as_str(),
                        url,
                        headers: &[],
                        payload,
                    })
                    .await?;

                let mut request = self.inner.http_client.request(method.clone(), url);
                for (name, value) in signed {
                    request = request.header(name, value);
                }
                if !payload.is_empty() {
                    request = request
                        .header(CONTENT_TYPE, "application/json")
                        .body(payload.clone());
                }

                Ok(request.send().await?)
            },
            path,
        )
        .await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<F, Fut, T>(&self, request_fn: F, path: &str) -> Result<T, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, ApiError>>,
        T: DeserializeOwned,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = self.inner.retry_config.backoff_ms(attempt);
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                self.inner.pool_manager.record_retry().await;
                tokio::time::sleep(tokio::time::Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        self.inner.pool_manager.record_request(true).await;
                        return self.parse_success_response(response).await;
                    }

                    self.inner.pool_manager.record_request(false).await;

                    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(ApiError::RateLimited);
                    } else if status.is_server_error() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return self.handle_error_response(response).await;
                    }
                }
                Err(ApiError::RequestError(e)) => {
                    self.inner.pool_manager.record_request(false).await;

                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() || e.is_request() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse successful response
    async fn parse_success_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str::<T>(body).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response<T>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let error_type = response
            .headers()
            .get(ERROR_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(':').next())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<AwsErrorBody>(&text)
            .ok()
            .and_then(|body| body.message)
            .unwrap_or(text);

        tracing::debug!(
            "API error response: status={}, type={:?}, message={}",
            status,
            error_type,
            message
        );

        if status == reqwest::StatusCode::NOT_FOUND
            || error_type
                .as_deref()
                .is_some_and(|t| t.starts_with("NotFoundException"))
        {
            return Err(ApiError::NotFound { message });
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(ApiError::AuthError(message));
        }

        Err(ApiError::ApiError {
            status: status.as_u16(),
            error_type,
            message,
        })
    }
}
