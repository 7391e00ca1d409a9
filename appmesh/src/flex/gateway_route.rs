use tfplug::types::Dynamic;

use super::{validate_spec, Block, Expand, Flatten, ObjectBuilder, Result, SpecCodec};
use crate::api::gateway_route::{
    GatewayRouteHostnameMatch, GatewayRouteHostnameRewrite, GatewayRouteSpec, GatewayRouteTarget,
    GatewayRouteVirtualService, GrpcGatewayRoute, GrpcGatewayRouteAction, GrpcGatewayRouteMatch,
    GrpcGatewayRouteRewrite, HttpGatewayRoute, HttpGatewayRouteAction, HttpGatewayRouteMatch,
    HttpGatewayRoutePathRewrite, HttpGatewayRoutePrefixRewrite, HttpGatewayRouteRewrite,
};

pub(crate) const ROUTE_KIND: &[&str] = &["grpc_route", "http2_route", "http_route"];
pub(crate) const PATH_REWRITE: &[&str] = &["path", "prefix"];

pub fn validate_gateway_route_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<GatewayRouteSpec>(spec)
}

impl Expand for GatewayRouteVirtualService {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GatewayRouteVirtualService {
            virtual_service_name: b.string("virtual_service_name")?,
        })
    }
}

impl Flatten for GatewayRouteVirtualService {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("virtual_service_name", self.virtual_service_name.as_deref())
            .build()
    }
}

impl Expand for GatewayRouteTarget {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GatewayRouteTarget {
            port: b.int("port")?,
            virtual_service: b.expand("virtual_service")?,
        })
    }
}

impl Flatten for GatewayRouteTarget {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("port", self.port)
            .block("virtual_service", self.virtual_service.as_ref())
            .build()
    }
}

impl Expand for GatewayRouteHostnameMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GatewayRouteHostnameMatch {
            exact: b.string("exact")?,
            suffix: b.string("suffix")?,
        })
    }
}

impl Flatten for GatewayRouteHostnameMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("exact", self.exact.as_deref())
            .string("suffix", self.suffix.as_deref())
            .build()
    }
}

impl Expand for GatewayRouteHostnameRewrite {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GatewayRouteHostnameRewrite {
            default_target_hostname: b.string("default_target_hostname")?,
        })
    }
}

impl Flatten for GatewayRouteHostnameRewrite {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string(
                "default_target_hostname",
                self.default_target_hostname.as_deref(),
            )
            .build()
    }
}

impl Expand for HttpGatewayRoutePathRewrite {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpGatewayRoutePathRewrite {
            exact: b.string("exact")?,
        })
    }
}

impl Flatten for HttpGatewayRoutePathRewrite {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("exact", self.exact.as_deref())
            .build()
    }
}

impl Expand for HttpGatewayRoutePrefixRewrite {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpGatewayRoutePrefixRewrite {
            default_prefix: b.string("default_prefix")?,
            value: b.string("value")?,
        })
    }
}

impl Flatten for HttpGatewayRoutePrefixRewrite {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("default_prefix", self.default_prefix.as_deref())
            .string("value", self.value.as_deref())
            .build()
    }
}

impl Expand for HttpGatewayRouteRewrite {
    fn expand(b: &Block<'_>) -> Result<Self> {
        b.at_most_one_of(PATH_REWRITE)?;
        Ok(HttpGatewayRouteRewrite {
            hostname: b.expand("hostname")?,
            path: b.expand("path")?,
            prefix: b.expand("prefix")?,
        })
    }
}

impl Flatten for HttpGatewayRouteRewrite {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("hostname", self.hostname.as_ref())
            .block("path", self.path.as_ref())
            .block("prefix", self.prefix.as_ref())
            .build()
    }
}

impl Expand for GrpcGatewayRouteRewrite {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcGatewayRouteRewrite {
            hostname: b.expand("hostname")?,
        })
    }
}

impl Flatten for GrpcGatewayRouteRewrite {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("hostname", self.hostname.as_ref())
            .build()
    }
}

// gRPC

impl Expand for GrpcGatewayRouteAction {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcGatewayRouteAction {
            rewrite: b.expand("rewrite")?,
            target: b.expand("target")?,
        })
    }
}

impl Flatten for GrpcGatewayRouteAction {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("rewrite", self.rewrite.as_ref())
            .block("target", self.target.as_ref())
            .build()
    }
}

impl Expand for GrpcGatewayRouteMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcGatewayRouteMatch {
            hostname: b.expand("hostname")?,
            metadata: b.expand_all("metadata")?,
            port: b.int("port")?,
            service_name: b.string("service_name")?,
        })
    }
}

impl Flatten for GrpcGatewayRouteMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("hostname", self.hostname.as_ref())
            .blocks("metadata", &self.metadata)
            .int("port", self.port)
            .string("service_name", self.service_name.as_deref())
            .build()
    }
}

impl Expand for GrpcGatewayRoute {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcGatewayRoute {
            action: b.expand("action")?,
            r#match: b.expand("match")?,
        })
    }
}

impl Flatten for GrpcGatewayRoute {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("action", self.action.as_ref())
            .block("match", self.r#match.as_ref())
            .build()
    }
}

// HTTP and HTTP/2

impl Expand for HttpGatewayRouteAction {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpGatewayRouteAction {
            rewrite: b.expand("rewrite")?,
            target: b.expand("target")?,
        })
    }
}

impl Flatten for HttpGatewayRouteAction {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("rewrite", self.rewrite.as_ref())
            .block("target", self.target.as_ref())
            .build()
    }
}

impl Expand for HttpGatewayRouteMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpGatewayRouteMatch {
            headers: b.expand_all("header")?,
            hostname: b.expand("hostname")?,
            method: b.string("method")?,
            path: b.expand("path")?,
            port: b.int("port")?,
            prefix: b.string("prefix")?,
            query_parameters: b.expand_all("query_parameter")?,
        })
    }
}

impl Flatten for HttpGatewayRouteMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .blocks("header", &self.headers)
            .block("hostname", self.hostname.as_ref())
            .string("method", self.method.as_deref())
            .block("path", self.path.as_ref())
            .int("port", self.port)
            .string("prefix", self.prefix.as_deref())
            .blocks("query_parameter", &self.query_parameters)
            .build()
    }
}

impl Expand for HttpGatewayRoute {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpGatewayRoute {
            action: b.expand("action")?,
            r#match: b.expand("match")?,
        })
    }
}

impl Flatten for HttpGatewayRoute {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("action", self.action.as_ref())
            .block("match", self.r#match.as_ref())
            .build()
    }
}

impl Expand for GatewayRouteSpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        b.exactly_one_of(ROUTE_KIND)?;
        Ok(GatewayRouteSpec {
            grpc_route: b.expand("grpc_route")?,
            http2_route: b.expand("http2_route")?,
            http_route: b.expand("http_route")?,
            priority: b.int("priority")?,
        })
    }
}

impl Flatten for GatewayRouteSpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("grpc_route", self.grpc_route.as_ref())
            .block("http2_route", self.http2_route.as_ref())
            .block("http_route", self.http_route.as_ref())
            .int("priority", self.priority)
            .build()
    }
}

impl SpecCodec for GatewayRouteSpec {
    const REQUIRED: bool = true;
}
