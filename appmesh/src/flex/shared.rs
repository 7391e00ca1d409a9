//! Expand and flatten for blocks used by more than one entity

use tfplug::types::Dynamic;

use super::{Block, Expand, ExpandUnion, Flatten, ObjectBuilder, Result};
use crate::api::shapes::*;

pub(crate) const CLIENT_POLICY_CERTIFICATE: &[&str] = &["file", "sds"];
pub(crate) const CLIENT_POLICY_TRUST: &[&str] = &["acm", "file", "sds"];
pub(crate) const LISTENER_CERTIFICATE: &[&str] = &["acm", "file", "sds"];
pub(crate) const LISTENER_TRUST: &[&str] = &["file", "sds"];
pub(crate) const HEADER_MATCH: &[&str] = &["exact", "prefix", "range", "regex", "suffix"];
pub(crate) const LOG_FORMAT: &[&str] = &["json", "text"];
pub(crate) const ACCESS_LOG: &[&str] = &["file"];

impl Expand for Duration {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(Duration {
            unit: b.string("unit")?,
            value: b.int("value")?,
        })
    }
}

impl Flatten for Duration {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("unit", self.unit.as_deref())
            .int("value", self.value)
            .build()
    }
}

impl Expand for PortMapping {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(PortMapping {
            port: b.int("port")?,
            protocol: b.string("protocol")?,
        })
    }
}

impl Flatten for PortMapping {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("port", self.port)
            .string("protocol", self.protocol.as_deref())
            .build()
    }
}

// Certificates

impl Expand for ListenerTlsFileCertificate {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ListenerTlsFileCertificate {
            certificate_chain: b.string("certificate_chain")?,
            private_key: b.string("private_key")?,
        })
    }
}

impl Flatten for ListenerTlsFileCertificate {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("certificate_chain", self.certificate_chain.as_deref())
            .string("private_key", self.private_key.as_deref())
            .build()
    }
}

impl Expand for ListenerTlsSdsCertificate {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ListenerTlsSdsCertificate {
            secret_name: b.string("secret_name")?,
        })
    }
}

impl Flatten for ListenerTlsSdsCertificate {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("secret_name", self.secret_name.as_deref())
            .build()
    }
}

impl Expand for ListenerTlsAcmCertificate {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ListenerTlsAcmCertificate {
            certificate_arn: b.string("certificate_arn")?,
        })
    }
}

impl Flatten for ListenerTlsAcmCertificate {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("certificate_arn", self.certificate_arn.as_deref())
            .build()
    }
}

impl ExpandUnion for ClientTlsCertificate {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(CLIENT_POLICY_CERTIFICATE)? {
            "file" => b.expand("file")?.map(ClientTlsCertificate::File),
            "sds" => b.expand("sds")?.map(ClientTlsCertificate::Sds),
            _ => None,
        })
    }
}

impl Flatten for ClientTlsCertificate {
    fn flatten(&self) -> Dynamic {
        let (file, sds) = match self {
            ClientTlsCertificate::File(file) => (Some(file), None),
            ClientTlsCertificate::Sds(sds) => (None, Some(sds)),
        };
        ObjectBuilder::new()
            .block("file", file)
            .block("sds", sds)
            .build()
    }
}

impl ExpandUnion for ListenerTlsCertificate {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(LISTENER_CERTIFICATE)? {
            "acm" => b.expand("acm")?.map(ListenerTlsCertificate::Acm),
            "file" => b.expand("file")?.map(ListenerTlsCertificate::File),
            "sds" => b.expand("sds")?.map(ListenerTlsCertificate::Sds),
            _ => None,
        })
    }
}

impl Flatten for ListenerTlsCertificate {
    fn flatten(&self) -> Dynamic {
        let mut acm = None;
        let mut file = None;
        let mut sds = None;
        match self {
            ListenerTlsCertificate::Acm(v) => acm = Some(v),
            ListenerTlsCertificate::File(v) => file = Some(v),
            ListenerTlsCertificate::Sds(v) => sds = Some(v),
        }
        ObjectBuilder::new()
            .block("acm", acm)
            .block("file", file)
            .block("sds", sds)
            .build()
    }
}

// Validation contexts

impl Expand for SubjectAlternativeNameMatchers {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(SubjectAlternativeNameMatchers {
            exact: b.strings("exact")?,
        })
    }
}

impl Flatten for SubjectAlternativeNameMatchers {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new().strings("exact", &self.exact).build()
    }
}

impl Expand for SubjectAlternativeNames {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(SubjectAlternativeNames {
            r#match: b.expand("match")?,
        })
    }
}

impl Flatten for SubjectAlternativeNames {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("match", self.r#match.as_ref())
            .build()
    }
}

impl Expand for TlsValidationContextAcmTrust {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TlsValidationContextAcmTrust {
            certificate_authority_arns: b.strings("certificate_authority_arns")?,
        })
    }
}

impl Flatten for TlsValidationContextAcmTrust {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .strings("certificate_authority_arns", &self.certificate_authority_arns)
            .build()
    }
}

impl Expand for TlsValidationContextFileTrust {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TlsValidationContextFileTrust {
            certificate_chain: b.string("certificate_chain")?,
        })
    }
}

impl Flatten for TlsValidationContextFileTrust {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("certificate_chain", self.certificate_chain.as_deref())
            .build()
    }
}

impl Expand for TlsValidationContextSdsTrust {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TlsValidationContextSdsTrust {
            secret_name: b.string("secret_name")?,
        })
    }
}

impl Flatten for TlsValidationContextSdsTrust {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("secret_name", self.secret_name.as_deref())
            .build()
    }
}

impl ExpandUnion for TlsValidationContextTrust {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(CLIENT_POLICY_TRUST)? {
            "acm" => b.expand("acm")?.map(TlsValidationContextTrust::Acm),
            "file" => b.expand("file")?.map(TlsValidationContextTrust::File),
            "sds" => b.expand("sds")?.map(TlsValidationContextTrust::Sds),
            _ => None,
        })
    }
}

impl Flatten for TlsValidationContextTrust {
    fn flatten(&self) -> Dynamic {
        let mut acm = None;
        let mut file = None;
        let mut sds = None;
        match self {
            TlsValidationContextTrust::Acm(v) => acm = Some(v),
            TlsValidationContextTrust::File(v) => file = Some(v),
            TlsValidationContextTrust::Sds(v) => sds = Some(v),
        }
        ObjectBuilder::new()
            .block("acm", acm)
            .block("file", file)
            .block("sds", sds)
            .build()
    }
}

impl Expand for TlsValidationContext {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TlsValidationContext {
            subject_alternative_names: b.expand("subject_alternative_names")?,
            trust: b.expand_union("trust")?,
        })
    }
}

impl Flatten for TlsValidationContext {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block(
                "subject_alternative_names",
                self.subject_alternative_names.as_ref(),
            )
            .block("trust", self.trust.as_ref())
            .build()
    }
}

impl ExpandUnion for ListenerTlsValidationContextTrust {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(LISTENER_TRUST)? {
            "file" => b.expand("file")?.map(ListenerTlsValidationContextTrust::File),
            "sds" => b.expand("sds")?.map(ListenerTlsValidationContextTrust::Sds),
            _ => None,
        })
    }
}

impl Flatten for ListenerTlsValidationContextTrust {
    fn flatten(&self) -> Dynamic {
        let (file, sds) = match self {
            ListenerTlsValidationContextTrust::File(v) => (Some(v), None),
            ListenerTlsValidationContextTrust::Sds(v) => (None, Some(v)),
        };
        ObjectBuilder::new()
            .block("file", file)
            .block("sds", sds)
            .build()
    }
}

impl Expand for ListenerTlsValidationContext {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ListenerTlsValidationContext {
            subject_alternative_names: b.expand("subject_alternative_names")?,
            trust: b.expand_union("trust")?,
        })
    }
}

impl Flatten for ListenerTlsValidationContext {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block(
                "subject_alternative_names",
                self.subject_alternative_names.as_ref(),
            )
            .block("trust", self.trust.as_ref())
            .build()
    }
}

// Client policy

impl Expand for ClientPolicyTls {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ClientPolicyTls {
            certificate: b.expand_union("certificate")?,
            enforce: b.bool("enforce")?,
            ports: b.ints("ports")?,
            validation: b.expand("validation")?,
        })
    }
}

impl Flatten for ClientPolicyTls {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("certificate", self.certificate.as_ref())
            .bool("enforce", self.enforce)
            .ints("ports", &self.ports)
            .block("validation", self.validation.as_ref())
            .build()
    }
}

impl Expand for ClientPolicy {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ClientPolicy {
            tls: b.expand("tls")?,
        })
    }
}

impl Flatten for ClientPolicy {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new().block("tls", self.tls.as_ref()).build()
    }
}

impl Expand for BackendDefaults {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(BackendDefaults {
            client_policy: b.expand("client_policy")?,
        })
    }
}

impl Flatten for BackendDefaults {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("client_policy", self.client_policy.as_ref())
            .build()
    }
}

impl Expand for ListenerTls {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(ListenerTls {
            certificate: b.expand_union("certificate")?,
            mode: b.string("mode")?,
            validation: b.expand("validation")?,
        })
    }
}

impl Flatten for ListenerTls {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("certificate", self.certificate.as_ref())
            .string("mode", self.mode.as_deref())
            .block("validation", self.validation.as_ref())
            .build()
    }
}

// Health checks, pools and timeouts

impl Expand for HealthCheckPolicy {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HealthCheckPolicy {
            healthy_threshold: b.int("healthy_threshold")?,
            interval_millis: b.int("interval_millis")?,
            path: b.string("path")?,
            port: b.int("port")?,
            protocol: b.string("protocol")?,
            timeout_millis: b.int("timeout_millis")?,
            unhealthy_threshold: b.int("unhealthy_threshold")?,
        })
    }
}

impl Flatten for HealthCheckPolicy {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("healthy_threshold", self.healthy_threshold)
            .int("interval_millis", self.interval_millis)
            .string("path", self.path.as_deref())
            .int("port", self.port)
            .string("protocol", self.protocol.as_deref())
            .int("timeout_millis", self.timeout_millis)
            .int("unhealthy_threshold", self.unhealthy_threshold)
            .build()
    }
}

impl Expand for GrpcConnectionPool {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcConnectionPool {
            max_requests: b.int("max_requests")?,
        })
    }
}

impl Flatten for GrpcConnectionPool {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("max_requests", self.max_requests)
            .build()
    }
}

impl Expand for HttpConnectionPool {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpConnectionPool {
            max_connections: b.int("max_connections")?,
            max_pending_requests: b.int("max_pending_requests")?,
        })
    }
}

impl Flatten for HttpConnectionPool {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("max_connections", self.max_connections)
            .int("max_pending_requests", self.max_pending_requests)
            .build()
    }
}

impl Expand for Http2ConnectionPool {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(Http2ConnectionPool {
            max_requests: b.int("max_requests")?,
        })
    }
}

impl Flatten for Http2ConnectionPool {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("max_requests", self.max_requests)
            .build()
    }
}

impl Expand for TcpConnectionPool {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TcpConnectionPool {
            max_connections: b.int("max_connections")?,
        })
    }
}

impl Flatten for TcpConnectionPool {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("max_connections", self.max_connections)
            .build()
    }
}

impl Expand for HttpTimeout {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpTimeout {
            idle: b.expand("idle")?,
            per_request: b.expand("per_request")?,
        })
    }
}

impl Flatten for HttpTimeout {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("idle", self.idle.as_ref())
            .block("per_request", self.per_request.as_ref())
            .build()
    }
}

impl Expand for GrpcTimeout {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcTimeout {
            idle: b.expand("idle")?,
            per_request: b.expand("per_request")?,
        })
    }
}

impl Flatten for GrpcTimeout {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("idle", self.idle.as_ref())
            .block("per_request", self.per_request.as_ref())
            .build()
    }
}

impl Expand for TcpTimeout {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TcpTimeout {
            idle: b.expand("idle")?,
        })
    }
}

impl Flatten for TcpTimeout {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("idle", self.idle.as_ref())
            .build()
    }
}

// Logging

impl Expand for JsonFormatRef {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(JsonFormatRef {
            key: b.string("key")?,
            value: b.string("value")?,
        })
    }
}

impl Flatten for JsonFormatRef {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("key", self.key.as_deref())
            .string("value", self.value.as_deref())
            .build()
    }
}

impl ExpandUnion for LoggingFormat {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(LOG_FORMAT)? {
            "json" => Some(LoggingFormat::Json(b.expand_all("json")?)),
            "text" => b.string("text")?.map(LoggingFormat::Text),
            _ => None,
        })
    }
}

impl Flatten for LoggingFormat {
    fn flatten(&self) -> Dynamic {
        match self {
            LoggingFormat::Json(refs) => ObjectBuilder::new()
                .blocks("json", refs)
                .string("text", None)
                .build(),
            LoggingFormat::Text(text) => ObjectBuilder::new()
                .blocks::<JsonFormatRef>("json", &[])
                .string("text", Some(text))
                .build(),
        }
    }
}

impl Expand for FileAccessLog {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(FileAccessLog {
            format: b.expand_union("format")?,
            path: b.string("path")?,
        })
    }
}

impl Flatten for FileAccessLog {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("format", self.format.as_ref())
            .string("path", self.path.as_deref())
            .build()
    }
}

impl ExpandUnion for AccessLog {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(ACCESS_LOG)? {
            "file" => b.expand("file")?.map(AccessLog::File),
            _ => None,
        })
    }
}

impl Flatten for AccessLog {
    fn flatten(&self) -> Dynamic {
        let AccessLog::File(file) = self;
        ObjectBuilder::new().block("file", Some(file)).build()
    }
}

impl Expand for Logging {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(Logging {
            access_log: b.expand_union("access_log")?,
        })
    }
}

impl Flatten for Logging {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("access_log", self.access_log.as_ref())
            .build()
    }
}

// Matching

impl Expand for MatchRange {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(MatchRange {
            end: b.int("end")?,
            start: b.int("start")?,
        })
    }
}

impl Flatten for MatchRange {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("end", self.end)
            .int("start", self.start)
            .build()
    }
}

impl ExpandUnion for HeaderMatchMethod {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(HEADER_MATCH)? {
            "exact" => b.string("exact")?.map(HeaderMatchMethod::Exact),
            "prefix" => b.string("prefix")?.map(HeaderMatchMethod::Prefix),
            "range" => b.expand("range")?.map(HeaderMatchMethod::Range),
            "regex" => b.string("regex")?.map(HeaderMatchMethod::Regex),
            "suffix" => b.string("suffix")?.map(HeaderMatchMethod::Suffix),
            _ => None,
        })
    }
}

impl Flatten for HeaderMatchMethod {
    fn flatten(&self) -> Dynamic {
        let (mut exact, mut prefix, mut regex, mut suffix, mut range) =
            (None, None, None, None, None);
        match self {
            HeaderMatchMethod::Exact(s) => exact = Some(s.as_str()),
            HeaderMatchMethod::Prefix(s) => prefix = Some(s.as_str()),
            HeaderMatchMethod::Range(r) => range = Some(r),
            HeaderMatchMethod::Regex(s) => regex = Some(s.as_str()),
            HeaderMatchMethod::Suffix(s) => suffix = Some(s.as_str()),
        }
        ObjectBuilder::new()
            .string("exact", exact)
            .string("prefix", prefix)
            .block("range", range)
            .string("regex", regex)
            .string("suffix", suffix)
            .build()
    }
}

impl Expand for HttpRouteHeader {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpRouteHeader {
            invert: b.bool("invert")?,
            r#match: b.expand_union("match")?,
            name: b.string("name")?,
        })
    }
}

impl Flatten for HttpRouteHeader {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .bool("invert", self.invert)
            .block("match", self.r#match.as_ref())
            .string("name", self.name.as_deref())
            .build()
    }
}

impl Expand for GrpcRouteMetadata {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcRouteMetadata {
            invert: b.bool("invert")?,
            r#match: b.expand_union("match")?,
            name: b.string("name")?,
        })
    }
}

impl Flatten for GrpcRouteMetadata {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .bool("invert", self.invert)
            .block("match", self.r#match.as_ref())
            .string("name", self.name.as_deref())
            .build()
    }
}

impl Expand for HttpPathMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpPathMatch {
            exact: b.string("exact")?,
            regex: b.string("regex")?,
        })
    }
}

impl Flatten for HttpPathMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("exact", self.exact.as_deref())
            .string("regex", self.regex.as_deref())
            .build()
    }
}

impl Expand for QueryParameterMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(QueryParameterMatch {
            exact: b.string("exact")?,
        })
    }
}

impl Flatten for QueryParameterMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("exact", self.exact.as_deref())
            .build()
    }
}

impl Expand for HttpQueryParameter {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpQueryParameter {
            r#match: b.expand("match")?,
            name: b.string("name")?,
        })
    }
}

impl Flatten for HttpQueryParameter {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("match", self.r#match.as_ref())
            .string("name", self.name.as_deref())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::super::{normalize, ValidationError};
    use super::*;
    use serde_json::json;
    use tfplug::types::AttributePath;

    fn dynamic(value: serde_json::Value) -> Dynamic {
        serde_json::from_value(value).unwrap()
    }

    fn expand_at<T: Expand>(value: &Dynamic) -> Result<T> {
        let block = Block::singleton(Some(value), AttributePath::new("block"))?.unwrap();
        T::expand(&block)
    }

    #[test]
    fn client_policy_round_trip() {
        let config = dynamic(json!([{
            "tls": [{
                "certificate": [{"file": [], "sds": [{"secret_name": "client-cert"}]}],
                "enforce": true,
                "ports": [8443],
                "validation": [{
                    "subject_alternative_names": [{"match": [{"exact": ["svc.local"]}]}],
                    "trust": [{"acm": [{"certificate_authority_arns": ["arn:aws:acm-pca:ca"]}], "file": [], "sds": []}]
                }]
            }]
        }]));

        let policy: ClientPolicy = expand_at(&config).unwrap();
        let tls = policy.tls.as_ref().unwrap();
        assert_eq!(tls.enforce, Some(true));
        assert!(matches!(tls.certificate, Some(ClientTlsCertificate::Sds(_))));

        let flattened = Dynamic::List(vec![policy.flatten()]);
        assert_eq!(normalize(&flattened), normalize(&config));
    }

    #[test]
    fn enforce_false_is_kept() {
        let config = dynamic(json!([{"enforce": false}]));
        let tls: ClientPolicyTls = expand_at(&config).unwrap();
        assert_eq!(tls.enforce, Some(false));
    }

    #[test]
    fn listener_certificate_rejects_two_members() {
        let config = dynamic(json!([{
            "certificate": [{
                "acm": [{"certificate_arn": "arn:aws:acm:cert"}],
                "file": [{"certificate_chain": "/chain", "private_key": "/key"}]
            }]
        }]));

        let err = expand_at::<ListenerTls>(&config).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ExactlyOneOf {
                group: AttributePath::new("block")
                    .index(0)
                    .attribute("certificate")
                    .index(0),
                members: LISTENER_CERTIFICATE,
                populated: vec!["acm", "file"],
            }
        );
    }

    #[test]
    fn empty_trust_block_is_missing_a_member() {
        let config = dynamic(json!([{"trust": [{"file": [], "sds": []}]}]));
        let err = expand_at::<ListenerTlsValidationContext>(&config).unwrap_err();
        assert!(matches!(err, ValidationError::MissingOneOf { members, .. } if members == LISTENER_TRUST));
    }

    #[test]
    fn header_match_flattens_single_member() {
        let method = HeaderMatchMethod::Prefix("/api".into());
        assert_eq!(
            normalize(&method.flatten()),
            dynamic(json!({"prefix": "/api"}))
        );

        let range = HeaderMatchMethod::Range(MatchRange {
            start: Some(1),
            end: Some(5),
        });
        assert_eq!(
            normalize(&range.flatten()),
            dynamic(json!({"range": [{"start": 1, "end": 5}]}))
        );
    }

    #[test]
    fn text_log_format_flattens_with_empty_json() {
        let format = LoggingFormat::Text("%START_TIME%".into());
        assert_eq!(
            format.flatten(),
            dynamic(json!({"json": [], "text": "%START_TIME%"}))
        );
    }
}
