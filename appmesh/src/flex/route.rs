use tfplug::types::Dynamic;

use super::{validate_spec, Block, Expand, Flatten, ObjectBuilder, Result, SpecCodec};
use crate::api::route::{
    GrpcRetryPolicy, GrpcRoute, GrpcRouteMatch, HttpRetryPolicy, HttpRoute, HttpRouteMatch,
    RouteAction, RouteSpec, TcpRoute, TcpRouteMatch, WeightedTarget,
};

pub(crate) const ROUTE_KIND: &[&str] = &["grpc_route", "http2_route", "http_route", "tcp_route"];

pub fn validate_route_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<RouteSpec>(spec)
}

impl Expand for WeightedTarget {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(WeightedTarget {
            port: b.int("port")?,
            virtual_node: b.string("virtual_node")?,
            weight: b.int_raw("weight")?,
        })
    }
}

impl Flatten for WeightedTarget {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .int("port", self.port.filter(|p| *p != 0))
            .string("virtual_node", self.virtual_node.as_deref())
            .int("weight", self.weight)
            .build()
    }
}

impl Expand for RouteAction {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(RouteAction {
            weighted_targets: b.expand_all("weighted_target")?,
        })
    }
}

impl Flatten for RouteAction {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .blocks("weighted_target", &self.weighted_targets)
            .build()
    }
}

// gRPC

impl Expand for GrpcRouteMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcRouteMatch {
            metadata: b.expand_all("metadata")?,
            method_name: b.string("method_name")?,
            port: b.int("port")?,
            service_name: b.string("service_name")?,
        })
    }
}

impl Flatten for GrpcRouteMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .blocks("metadata", &self.metadata)
            .string("method_name", self.method_name.as_deref())
            .int("port", self.port)
            .string("service_name", self.service_name.as_deref())
            .build()
    }
}

impl Expand for GrpcRetryPolicy {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(GrpcRetryPolicy {
            grpc_retry_events: b.strings("grpc_retry_events")?,
            http_retry_events: b.strings("http_retry_events")?,
            max_retries: b.int_raw("max_retries")?,
            per_retry_timeout: b.expand("per_retry_timeout")?,
            tcp_retry_events: b.strings("tcp_retry_events")?,
        })
    }
}

impl Flatten for GrpcRetryPolicy {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .strings("grpc_retry_events", &self.grpc_retry_events)
            .strings("http_retry_events", &self.http_retry_events)
            .int("max_retries", self.max_retries)
            .block("per_retry_timeout", self.per_retry_timeout.as_ref())
            .strings("tcp_retry_events", &self.tcp_retry_events)
            .build()
    }
}

impl Expand for GrpcRoute {
    fn expand(b: &Block<'_>) -> Result<Self> {
        // A present but empty gRPC match still selects every request.
        let r#match = match b.expand("match")? {
            Some(m) => Some(m),
            None if b.contains("match") => Some(GrpcRouteMatch::default()),
            None => None,
        };
        Ok(GrpcRoute {
            action: b.expand("action")?,
            r#match,
            retry_policy: b.expand("retry_policy")?,
            timeout: b.expand("timeout")?,
        })
    }
}

impl Flatten for GrpcRoute {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("action", self.action.as_ref())
            .block("match", self.r#match.as_ref())
            .block("retry_policy", self.retry_policy.as_ref())
            .block("timeout", self.timeout.as_ref())
            .build()
    }
}

// HTTP and HTTP/2

impl Expand for HttpRouteMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpRouteMatch {
            headers: b.expand_all("header")?,
            method: b.string("method")?,
            path: b.expand("path")?,
            port: b.int("port")?,
            prefix: b.string("prefix")?,
            query_parameters: b.expand_all("query_parameter")?,
            scheme: b.string("scheme")?,
        })
    }
}

impl Flatten for HttpRouteMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .blocks("header", &self.headers)
            .string("method", self.method.as_deref())
            .block("path", self.path.as_ref())
            .int("port", self.port)
            .string("prefix", self.prefix.as_deref())
            .blocks("query_parameter", &self.query_parameters)
            .string("scheme", self.scheme.as_deref())
            .build()
    }
}

impl Expand for HttpRetryPolicy {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpRetryPolicy {
            http_retry_events: b.strings("http_retry_events")?,
            max_retries: b.int_raw("max_retries")?,
            per_retry_timeout: b.expand("per_retry_timeout")?,
            tcp_retry_events: b.strings("tcp_retry_events")?,
        })
    }
}

impl Flatten for HttpRetryPolicy {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .strings("http_retry_events", &self.http_retry_events)
            .int("max_retries", self.max_retries)
            .block("per_retry_timeout", self.per_retry_timeout.as_ref())
            .strings("tcp_retry_events", &self.tcp_retry_events)
            .build()
    }
}

impl Expand for HttpRoute {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(HttpRoute {
            action: b.expand("action")?,
            r#match: b.expand("match")?,
            retry_policy: b.expand("retry_policy")?,
            timeout: b.expand("timeout")?,
        })
    }
}

impl Flatten for HttpRoute {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("action", self.action.as_ref())
            .block("match", self.r#match.as_ref())
            .block("retry_policy", self.retry_policy.as_ref())
            .block("timeout", self.timeout.as_ref())
            .build()
    }
}

// TCP

impl Expand for TcpRouteMatch {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TcpRouteMatch {
            port: b.int("port")?,
        })
    }
}

impl Flatten for TcpRouteMatch {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new().int("port", self.port).build()
    }
}

impl Expand for TcpRoute {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(TcpRoute {
            action: b.expand("action")?,
            r#match: b.expand("match")?,
            timeout: b.expand("timeout")?,
        })
    }
}

impl Flatten for TcpRoute {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("action", self.action.as_ref())
            .block("match", self.r#match.as_ref())
            .block("timeout", self.timeout.as_ref())
            .build()
    }
}

impl Expand for RouteSpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        b.exactly_one_of(ROUTE_KIND)?;
        Ok(RouteSpec {
            grpc_route: b.expand("grpc_route")?,
            http2_route: b.expand("http2_route")?,
            http_route: b.expand("http_route")?,
            priority: b.int("priority")?,
            tcp_route: b.expand("tcp_route")?,
        })
    }
}

impl Flatten for RouteSpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("grpc_route", self.grpc_route.as_ref())
            .block("http2_route", self.http2_route.as_ref())
            .block("http_route", self.http_route.as_ref())
            .int("priority", self.priority)
            .block("tcp_route", self.tcp_route.as_ref())
            .build()
    }
}

impl SpecCodec for RouteSpec {}
