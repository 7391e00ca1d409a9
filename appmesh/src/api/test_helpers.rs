//! Test helpers for the App Mesh API

use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;

use super::client::{Client, RetryConfig};

pub const TEST_REGION: &str = "us-west-2";

/// Static credentials, never resolved through the default chain
pub fn test_credentials() -> SharedCredentialsProvider {
    SharedCredentialsProvider::new(Credentials::new(
        "AKIDTEST",
        "test-secret-key",
        None,
        None,
        "appmesh-tests",
    ))
}

/// Client against a mock server, without transport retries
pub fn create_test_client(url: &str) -> Client {
    create_test_client_with_retries(url, 0)
}

#[allow(clippy::unwrap_used)]
pub fn create_test_client_with_retries(url: &str, max_retries: u32) -> Client {
    Client::with_config(
        url,
        TEST_REGION,
        test_credentials(),
        RetryConfig {
            max_retries,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        },
    )
    .unwrap()
}
