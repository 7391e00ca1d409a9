use tfplug::types::Dynamic;

use super::{
    validate_spec, Block, Expand, ExpandUnion, Flatten, ObjectBuilder, Result, SpecCodec,
};
use crate::api::virtual_node::{
    AwsCloudMapInstanceAttribute, AwsCloudMapServiceDiscovery, Backend, DnsServiceDiscovery,
    Listener, ListenerTimeout, OutlierDetection, ServiceDiscovery, VirtualNodeConnectionPool,
    VirtualNodeSpec, VirtualServiceBackend,
};

pub(crate) const CONNECTION_POOL: &[&str] = &["grpc", "http", "http2", "tcp"];
pub(crate) const LISTENER_TIMEOUT: &[&str] = &["grpc", "http", "http2", "tcp"];
pub(crate) const SERVICE_DISCOVERY: &[&str] = &["aws_cloud_map", "dns"];

pub fn validate_virtual_node_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<VirtualNodeSpec>(spec)
}

impl Expand for VirtualServiceBackend {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualServiceBackend {
            client_policy: b.expand("client_policy")?,
            virtual_service_name: b.string("virtual_service_name")?,
        })
    }
}

impl Flatten for VirtualServiceBackend {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("client_policy", self.client_policy.as_ref())
            .string("virtual_service_name", self.virtual_service_name.as_deref())
            .build()
    }
}

impl Flatten for Backend {
    fn flatten(&self) -> Dynamic {
        let Backend::VirtualService(service) = self;
        ObjectBuilder::new()
            .block("virtual_service", Some(service))
            .build()
    }
}

fn expand_backends(b: &Block<'_>) -> Result<Vec<Backend>> {
    // A backend without its virtual_service block carries nothing to send.
    let mut backends = Vec::new();
    for backend in b.blocks("backend")? {
        if let Some(service) = backend.expand("virtual_service")? {
            backends.push(Backend::VirtualService(service));
        }
    }
    Ok(backends)
}

impl ExpandUnion for VirtualNodeConnectionPool {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(CONNECTION_POOL)? {
            "grpc" => b.expand("grpc")?.map(VirtualNodeConnectionPool::Grpc),
            "http" => b.expand("http")?.map(VirtualNodeConnectionPool::Http),
            "http2" => b.expand("http2")?.map(VirtualNodeConnectionPool::Http2),
            "tcp" => b.expand("tcp")?.map(VirtualNodeConnectionPool::Tcp),
            _ => None,
        })
    }
}

impl Flatten for VirtualNodeConnectionPool {
    fn flatten(&self) -> Dynamic {
        let (mut grpc, mut http, mut http2, mut tcp) = (None, None, None, None);
        match self {
            VirtualNodeConnectionPool::Grpc(v) => grpc = Some(v),
            VirtualNodeConnectionPool::Http(v) => http = Some(v),
            VirtualNodeConnectionPool::Http2(v) => http2 = Some(v),
            VirtualNodeConnectionPool::Tcp(v) => tcp = Some(v),
        }
        ObjectBuilder::new()
            .block("grpc", grpc)
            .block("http", http)
            .block("http2", http2)
            .block("tcp", tcp)
            .build()
    }
}

impl Expand for OutlierDetection {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(OutlierDetection {
            base_ejection_duration: b.expand("base_ejection_duration")?,
            interval: b.expand("interval")?,
            max_ejection_percent: b.int("max_ejection_percent")?,
            max_server_errors: b.int("max_server_errors")?,
        })
    }
}

impl Flatten for OutlierDetection {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("base_ejection_duration", self.base_ejection_duration.as_ref())
            .block("interval", self.interval.as_ref())
            .int("max_ejection_percent", self.max_ejection_percent)
            .int("max_server_errors", self.max_server_errors)
            .build()
    }
}

impl ExpandUnion for ListenerTimeout {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(LISTENER_TIMEOUT)? {
            "grpc" => b.expand("grpc")?.map(ListenerTimeout::Grpc),
            "http" => b.expand("http")?.map(ListenerTimeout::Http),
            "http2" => b.expand("http2")?.map(ListenerTimeout::Http2),
            "tcp" => b.expand("tcp")?.map(ListenerTimeout::Tcp),
            _ => None,
        })
    }
}

impl Flatten for ListenerTimeout {
    fn flatten(&self) -> Dynamic {
        let (mut grpc, mut http, mut http2, mut tcp) = (None, None, None, None);
        match self {
            ListenerTimeout::Grpc(v) => grpc = Some(v),
            ListenerTimeout::Http(v) => http = Some(v),
            ListenerTimeout::Http2(v) => http2 = Some(v),
            ListenerTimeout::Tcp(v) => tcp = Some(v),
        }
        ObjectBuilder::new()
            .block("grpc", grpc)
            .block("http", http)
            .block("http2", http2)
            .block("tcp", tcp)
            .build()
    }
}

impl Expand for Listener {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(Listener {
            connection_pool: b.expand_union("connection_pool")?,
            health_check: b.expand("health_check")?,
            outlier_detection: b.expand("outlier_detection")?,
            port_mapping: b.expand("port_mapping")?,
            timeout: b.expand_union("timeout")?,
            tls: b.expand("tls")?,
        })
    }
}

impl Flatten for Listener {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("connection_pool", self.connection_pool.as_ref())
            .block("health_check", self.health_check.as_ref())
            .block("outlier_detection", self.outlier_detection.as_ref())
            .block("port_mapping", self.port_mapping.as_ref())
            .block("timeout", self.timeout.as_ref())
            .block("tls", self.tls.as_ref())
            .build()
    }
}

impl Expand for AwsCloudMapServiceDiscovery {
    fn expand(b: &Block<'_>) -> Result<Self> {
        let attributes = b
            .string_map("attributes")?
            .into_iter()
            .map(|(key, value)| AwsCloudMapInstanceAttribute { key, value })
            .collect();
        Ok(AwsCloudMapServiceDiscovery {
            attributes,
            ip_preference: b.string("ip_preference")?,
            namespace_name: b.string("namespace_name")?,
            service_name: b.string("service_name")?,
        })
    }
}

impl Flatten for AwsCloudMapServiceDiscovery {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string_map(
                "attributes",
                self.attributes
                    .iter()
                    .map(|a| (a.key.as_str(), a.value.as_str())),
            )
            .string("ip_preference", self.ip_preference.as_deref())
            .string("namespace_name", self.namespace_name.as_deref())
            .string("service_name", self.service_name.as_deref())
            .build()
    }
}

impl Expand for DnsServiceDiscovery {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(DnsServiceDiscovery {
            hostname: b.string("hostname")?,
            ip_preference: b.string("ip_preference")?,
            response_type: b.string("response_type")?,
        })
    }
}

impl Flatten for DnsServiceDiscovery {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("hostname", self.hostname.as_deref())
            .string("ip_preference", self.ip_preference.as_deref())
            .string("response_type", self.response_type.as_deref())
            .build()
    }
}

impl ExpandUnion for ServiceDiscovery {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(SERVICE_DISCOVERY)? {
            "aws_cloud_map" => b.expand("aws_cloud_map")?.map(ServiceDiscovery::AwsCloudMap),
            "dns" => b.expand("dns")?.map(ServiceDiscovery::Dns),
            _ => None,
        })
    }
}

impl Flatten for ServiceDiscovery {
    fn flatten(&self) -> Dynamic {
        let (cloud_map, dns) = match self {
            ServiceDiscovery::AwsCloudMap(v) => (Some(v), None),
            ServiceDiscovery::Dns(v) => (None, Some(v)),
        };
        ObjectBuilder::new()
            .block("aws_cloud_map", cloud_map)
            .block("dns", dns)
            .build()
    }
}

impl Expand for VirtualNodeSpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualNodeSpec {
            backend_defaults: b.expand("backend_defaults")?,
            backends: expand_backends(b)?,
            listeners: b.expand_all("listener")?,
            logging: b.expand("logging")?,
            service_discovery: b.expand_union("service_discovery")?,
        })
    }
}

impl Flatten for VirtualNodeSpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .blocks("backend", &self.backends)
            .block("backend_defaults", self.backend_defaults.as_ref())
            .blocks("listener", &self.listeners)
            .block("logging", self.logging.as_ref())
            .block("service_discovery", self.service_discovery.as_ref())
            .build()
    }
}

impl SpecCodec for VirtualNodeSpec {}
