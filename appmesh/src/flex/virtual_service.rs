use tfplug::types::Dynamic;

use super::{
    validate_spec, Block, Expand, ExpandUnion, Flatten, ObjectBuilder, Result, SpecCodec,
};
use crate::api::virtual_service::{
    VirtualNodeServiceProvider, VirtualRouterServiceProvider, VirtualServiceProvider,
    VirtualServiceSpec,
};

const PROVIDER: &[&str] = &["virtual_node", "virtual_router"];

pub fn validate_virtual_service_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<VirtualServiceSpec>(spec)
}

impl Expand for VirtualNodeServiceProvider {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualNodeServiceProvider {
            virtual_node_name: b.string("virtual_node_name")?,
        })
    }
}

impl Flatten for VirtualNodeServiceProvider {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("virtual_node_name", self.virtual_node_name.as_deref())
            .build()
    }
}

impl Expand for VirtualRouterServiceProvider {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualRouterServiceProvider {
            virtual_router_name: b.string("virtual_router_name")?,
        })
    }
}

impl Flatten for VirtualRouterServiceProvider {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("virtual_router_name", self.virtual_router_name.as_deref())
            .build()
    }
}

impl ExpandUnion for VirtualServiceProvider {
    fn expand_union(b: &Block<'_>) -> Result<Option<Self>> {
        Ok(match b.exactly_one_of(PROVIDER)? {
            "virtual_node" => b
                .expand("virtual_node")?
                .map(VirtualServiceProvider::VirtualNode),
            "virtual_router" => b
                .expand("virtual_router")?
                .map(VirtualServiceProvider::VirtualRouter),
            _ => None,
        })
    }
}

impl Flatten for VirtualServiceProvider {
    fn flatten(&self) -> Dynamic {
        let (node, router) = match self {
            VirtualServiceProvider::VirtualNode(v) => (Some(v), None),
            VirtualServiceProvider::VirtualRouter(v) => (None, Some(v)),
        };
        ObjectBuilder::new()
            .block("virtual_node", node)
            .block("virtual_router", router)
            .build()
    }
}

impl Expand for VirtualServiceSpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualServiceSpec {
            provider: b.expand_union("provider")?,
        })
    }
}

impl Flatten for VirtualServiceSpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("provider", self.provider.as_ref())
            .build()
    }
}

impl SpecCodec for VirtualServiceSpec {}

#[cfg(test)]
mod tests {
    use super::super::ValidationError;
    use super::*;
    use serde_json::json;

    fn dynamic(value: serde_json::Value) -> Dynamic {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn router_provider_round_trip() {
        let config = dynamic(json!([{
            "provider": [{
                "virtual_node": [],
                "virtual_router": [{"virtual_router_name": "router-a"}]
            }]
        }]));

        let spec = VirtualServiceSpec::expand_spec(Some(&config)).unwrap();
        assert!(matches!(
            spec.provider,
            Some(VirtualServiceProvider::VirtualRouter(_))
        ));
        assert_eq!(VirtualServiceSpec::flatten_spec(Some(&spec)), config);
    }

    #[test]
    fn both_providers_are_rejected() {
        let config = dynamic(json!([{
            "provider": [{
                "virtual_node": [{"virtual_node_name": "node-a"}],
                "virtual_router": [{"virtual_router_name": "router-a"}]
            }]
        }]));

        let err = validate_virtual_service_spec(&config).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ExactlyOneOf { ref populated, .. } if populated == &["virtual_node", "virtual_router"]
        ));
        assert_eq!(err.path().to_string(), "spec[0].provider[0]");
    }

    #[test]
    fn spec_without_provider_is_allowed() {
        let config = dynamic(json!([{"provider": []}]));
        assert_eq!(
            VirtualServiceSpec::expand_spec(Some(&config)).unwrap(),
            VirtualServiceSpec::default()
        );
    }
}
