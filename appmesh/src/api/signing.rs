//! AWS Signature Version 4 request signing
//!
//! Credentials come from an `aws-credential-types` provider, usually the chain
//! resolved by `aws-config`, and are cached until shortly before they expire.
//! The signature itself is computed by `aws-sigv4`.

use std::time::{Duration, SystemTime};

use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningParams, SigningSettings};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use aws_smithy_types::error::display::DisplayErrorContext;
use tokio::sync::RwLock;

use super::error::ApiError;

/// Credentials expiring within this window are refreshed before signing
const REFRESH_WINDOW: Duration = Duration::from_secs(300);

/// The parts of an HTTP request that go into the signature
pub struct SigningRequest<'a> {
    pub method: &'a str,
    /// Full request URL, query string included
    pub url: &'a str,
    /// Extra headers to sign besides `host` and `x-amz-date`
    pub headers: &'a [(&'a str, &'a str)],
    pub payload: &'a [u8],
}

/// Signs requests for one service and region
pub struct RequestSigner {
    provider: SharedCredentialsProvider,
    region: String,
    service: &'static str,
    cached: RwLock<Option<Credentials>>,
}

impl RequestSigner {
    pub fn new(provider: SharedCredentialsProvider, region: &str, service: &'static str) -> Self {
        Self {
            provider,
            region: region.to_string(),
            service,
            cached: RwLock::new(None),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Current credentials, fetched again when missing or about to expire
    pub async fn credentials(&self) -> Result<Credentials, ApiError> {
        let now = SystemTime::now();
        if let Some(credentials) = self.cached.read().await.as_ref() {
            if !expires_soon(credentials, now) {
                return Ok(credentials.clone());
            }
        }

        let mut cached = self.cached.write().await;
        if let Some(credentials) = cached.as_ref() {
            if !expires_soon(credentials, now) {
                return Ok(credentials.clone());
            }
        }

        tracing::debug!("Resolving AWS credentials for {}", self.service);
        let fresh = self
            .provider
            .provide_credentials()
            .await
            .map_err(|e| ApiError::CredentialsError(DisplayErrorContext(&e).to_string()))?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    /// Signature headers (`authorization`, `x-amz-date`, and the session token when present)
    pub async fn sign(&self, request: &SigningRequest<'_>) -> Result<Vec<(String, String)>, ApiError> {
        let credentials = self.credentials().await?;
        sign_request(
            &credentials,
            &self.region,
            self.service,
            request,
            SystemTime::now(),
        )
    }
}

fn expires_soon(credentials: &Credentials, now: SystemTime) -> bool {
    credentials
        .expiry()
        .is_some_and(|expiry| expiry <= now + REFRESH_WINDOW)
}

/// Signs one request with fixed credentials at a fixed time
pub fn sign_request(
    credentials: &Credentials,
    region: &str,
    service: &str,
    request: &SigningRequest<'_>,
    time: SystemTime,
) -> Result<Vec<(String, String)>, ApiError> {
    let identity: Identity = credentials.clone().into();
    let params: SigningParams<'_> = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name(service)
        .time(time)
        .settings(SigningSettings::default())
        .build()
        .map_err(|e| ApiError::SigningError(e.to_string()))?
        .into();

    let signable = SignableRequest::new(
        request.method,
        request.url,
        request.headers.iter().copied(),
        SignableBody::Bytes(request.payload),
    )
    .map_err(|e| ApiError::SigningError(e.to_string()))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| ApiError::SigningError(e.to_string()))?
        .into_parts();

    Ok(instructions
        .headers()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_credential_types::provider::future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SECRET: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    // 2015-08-30T12:36:00Z
    fn example_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_440_938_160)
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn get_root() -> SigningRequest<'static> {
        SigningRequest {
            method: "GET",
            url: "https://example.amazonaws.com/",
            headers: &[],
            payload: b"",
        }
    }

    #[test]
    fn signs_get_vanilla_test_vector() {
        let credentials = Credentials::new("AKIDEXAMPLE", SECRET, None, None, "test");
        let headers =
            sign_request(&credentials, "us-east-1", "service", &get_root(), example_time())
                .unwrap();

        assert_eq!(header(&headers, "x-amz-date"), Some("20150830T123600Z"));
        assert_eq!(
            header(&headers, "authorization"),
            Some(
                "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
                 SignedHeaders=host;x-amz-date, \
                 Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
            )
        );
        assert!(header(&headers, "x-amz-security-token").is_none());
    }

    #[test]
    fn session_token_is_sent_and_signed() {
        let credentials = Credentials::new(
            "AKIDEXAMPLE",
            SECRET,
            Some("session".to_string()),
            None,
            "test",
        );
        let headers =
            sign_request(&credentials, "us-east-1", "service", &get_root(), example_time())
                .unwrap();

        assert_eq!(header(&headers, "x-amz-security-token"), Some("session"));
        assert!(header(&headers, "authorization")
            .unwrap()
            .contains("SignedHeaders=host;x-amz-date;x-amz-security-token"));
    }

    #[derive(Debug)]
    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        expiry: Option<SystemTime>,
    }

    impl ProvideCredentials for CountingProvider {
        fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
        where
            Self: 'a,
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            future::ProvideCredentials::ready(Ok(Credentials::new(
                "AKIDEXAMPLE",
                SECRET,
                None,
                self.expiry,
                "counting",
            )))
        }
    }

    fn counting_signer(expiry: Option<SystemTime>) -> (RequestSigner, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = SharedCredentialsProvider::new(CountingProvider {
            calls: calls.clone(),
            expiry,
        });
        (RequestSigner::new(provider, "us-west-2", "appmesh"), calls)
    }

    #[tokio::test]
    async fn long_lived_credentials_are_resolved_once() {
        let (signer, calls) = counting_signer(None);

        signer.sign(&get_root()).await.unwrap();
        signer.sign(&get_root()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expiring_credentials_are_refreshed() {
        let (signer, calls) = counting_signer(Some(SystemTime::now() + Duration::from_secs(60)));

        signer.credentials().await.unwrap();
        signer.credentials().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
