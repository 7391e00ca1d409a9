use tfplug::types::Dynamic;

use super::{
    validate_spec, Block, Expand, ExpandUnion, Flatten, ObjectBuilder, Result, SpecCodec,
};
use crate::api::virtual_gateway::{
    VirtualGatewayConnectionPool, VirtualGatewayListener, VirtualGatewaySpec,
};

pub(crate) const CONNECTION_POOL: &[&str] = &["grpc", "http", "http2"];

pub fn validate_virtual_gateway_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<VirtualGatewaySpec>(spec)
}

impl ExpandUnion for VirtualGatewayConnectionPool {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(CONNECTION_POOL)? {
            "grpc" => b.expand("grpc")?.map(VirtualGatewayConnectionPool::Grpc),
            "http" => b.expand("http")?.map(VirtualGatewayConnectionPool::Http),
            "http2" => b.expand("http2")?.map(VirtualGatewayConnectionPool::Http2),
            _ => None,
        })
    }
}

impl Flatten for VirtualGatewayConnectionPool {
    fn flatten(&self) -> Dynamic {
        let (mut grpc, mut http, mut http2) = (None, None, None);
        match self {
            VirtualGatewayConnectionPool::Grpc(v) => grpc = Some(v),
            VirtualGatewayConnectionPool::Http(v) => http = Some(v),
            VirtualGatewayConnectionPool::Http2(v) => http2 = Some(v),
        }
        ObjectBuilder::new()
            .block("grpc", grpc)
            .block("http", http)
            .block("http2", http2)
            .build()
    }
}

impl Expand for VirtualGatewayListener {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualGatewayListener {
            connection_pool: b.expand_union("connection_pool")?,
            health_check: b.expand("health_check")?,
            port_mapping: b.expand("port_mapping")?,
            tls: b.expand("tls")?,
        })
    }
}

impl Flatten for VirtualGatewayListener {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("connection_pool", self.connection_pool.as_ref())
            .block("health_check", self.health_check.as_ref())
            .block("port_mapping", self.port_mapping.as_ref())
            .block("tls", self.tls.as_ref())
            .build()
    }
}

impl Expand for VirtualGatewaySpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualGatewaySpec {
            backend_defaults: b.expand("backend_defaults")?,
            listeners: b.expand_all("listener")?,
            logging: b.expand("logging")?,
        })
    }
}

impl Flatten for VirtualGatewaySpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("backend_defaults", self.backend_defaults.as_ref())
            .blocks("listener", &self.listeners)
            .block("logging", self.logging.as_ref())
            .build()
    }
}

impl SpecCodec for VirtualGatewaySpec {
    const REQUIRED: bool = true;
}
