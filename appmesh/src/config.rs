//! Provider configuration
//!
//! Region and credentials go through the standard AWS chain from `aws-config`:
//! explicit provider attributes first, then the environment, shared config
//! and credentials files, and instance or container metadata.

use std::collections::BTreeSet;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_smithy_types::error::display::DisplayErrorContext;
use thiserror::Error;
use tfplug::types::{AttributePath, Dynamic, DynamicValue};
use tracing::debug;

use crate::api::{Client, RetryConfig};
use crate::tags::{DefaultConfig, IgnoreConfig, KeyValueTags};

pub const ENV_ENDPOINT: &str = "AWS_ENDPOINT_URL_APPMESH";

pub const DEFAULT_MAX_RETRIES: u32 = 3;

const STATIC_CREDENTIALS_SOURCE: &str = "appmesh-provider-config";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("region is required (set in provider config, AWS_REGION, AWS_DEFAULT_REGION or the shared config file)")]
    MissingRegion,

    #[error("no valid AWS credentials found: {0}")]
    MissingCredentials(String),

    #[error("access_key and secret_key must be set together")]
    IncompleteStaticCredentials,

    #[error("max_retries must not be negative, got {0}")]
    InvalidMaxRetries(i64),
}

/// Provider block as written, before the AWS chain fills the gaps
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub profile: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub token: Option<String>,
    pub max_retries: u32,
    pub default_tags: DefaultConfig,
    pub ignore_tags: IgnoreConfig,
}

/// Settings the API client is built from
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub region: String,
    pub endpoint: String,
    pub credentials: SharedCredentialsProvider,
}

fn config_string(config: &DynamicValue, name: &str) -> Option<String> {
    config
        .get_string(&AttributePath::new(name))
        .ok()
        .filter(|s| !s.is_empty())
}

fn env_string(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

fn first_block<'a>(config: &'a DynamicValue, name: &str) -> Option<&'a Dynamic> {
    match config.get(&AttributePath::new(name))? {
        Dynamic::List(items) => items.first(),
        block @ Dynamic::Map(_) => Some(block),
        _ => None,
    }
}

fn string_set(block: Option<&Dynamic>, name: &str) -> Vec<String> {
    block
        .and_then(Dynamic::as_map)
        .and_then(|fields| fields.get(name))
        .and_then(Dynamic::as_list)
        .map(|items| {
            items
                .iter()
                .filter_map(Dynamic::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl ProviderConfig {
    /// Reads the provider block
    pub fn from_dynamic(config: &DynamicValue) -> Result<Self, ConfigError> {
        let access_key = config_string(config, "access_key");
        let secret_key = config_string(config, "secret_key");
        if access_key.is_some() != secret_key.is_some() {
            return Err(ConfigError::IncompleteStaticCredentials);
        }

        let max_retries = match config.get_number(&AttributePath::new("max_retries")) {
            Ok(n) if n < 0.0 => return Err(ConfigError::InvalidMaxRetries(n as i64)),
            Ok(n) => n as u32,
            Err(_) => DEFAULT_MAX_RETRIES,
        };

        let default_tags = DefaultConfig {
            tags: KeyValueTags::from_dynamic(
                first_block(config, "default_tags")
                    .and_then(Dynamic::as_map)
                    .and_then(|fields| fields.get("tags")),
            ),
        };

        let ignore_block = first_block(config, "ignore_tags");
        let ignore_tags = IgnoreConfig {
            keys: string_set(ignore_block, "keys").into_iter().collect::<BTreeSet<_>>(),
            key_prefixes: string_set(ignore_block, "key_prefixes"),
        };

        Ok(Self {
            region: config_string(config, "region"),
            endpoint: config_string(config, "endpoint"),
            profile: config_string(config, "profile"),
            access_key,
            secret_key,
            token: config_string(config, "token"),
            max_retries,
            default_tags,
            ignore_tags,
        })
    }

    fn static_credentials(&self) -> Option<Credentials> {
        match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => Some(Credentials::new(
                access_key,
                secret_key,
                self.token.clone(),
                None,
                STATIC_CREDENTIALS_SOURCE,
            )),
            _ => None,
        }
    }

    /// Loads the shared AWS configuration with the explicit attributes layered on top
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(credentials) = self.static_credentials() {
            loader = loader.credentials_provider(credentials);
        }

        loader.load().await
    }

    /// Resolves region, endpoint and credentials, checking that credentials can be loaded
    pub async fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let sdk_config = self.load_sdk_config().await;

        let region = sdk_config
            .region()
            .map(|r| r.to_string())
            .ok_or(ConfigError::MissingRegion)?;

        let credentials = sdk_config.credentials_provider().ok_or_else(|| {
            ConfigError::MissingCredentials("no credentials provider configured".to_string())
        })?;
        let resolved = credentials
            .provide_credentials()
            .await
            .map_err(|e| ConfigError::MissingCredentials(DisplayErrorContext(&e).to_string()))?;
        debug!("Resolved AWS credentials for access key {}", resolved.access_key_id());

        let endpoint = self
            .endpoint
            .clone()
            .or_else(|| env_string(ENV_ENDPOINT))
            .or_else(|| sdk_config.endpoint_url().map(str::to_string))
            .unwrap_or_else(|| Client::default_endpoint(&region));

        Ok(ResolvedConfig {
            region,
            endpoint,
            credentials,
        })
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            ..RetryConfig::default()
        }
    }
}
