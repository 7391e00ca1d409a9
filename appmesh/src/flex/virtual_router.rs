use tfplug::types::Dynamic;

use super::{validate_spec, Block, Expand, Flatten, ObjectBuilder, Result, SpecCodec};
use crate::api::virtual_router::{VirtualRouterListener, VirtualRouterSpec};

pub fn validate_virtual_router_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<VirtualRouterSpec>(spec)
}

impl Expand for VirtualRouterListener {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualRouterListener {
            port_mapping: b.expand("port_mapping")?,
        })
    }
}

impl Flatten for VirtualRouterListener {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("port_mapping", self.port_mapping.as_ref())
            .build()
    }
}

impl Expand for VirtualRouterSpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(VirtualRouterSpec {
            listeners: b.expand_all("listener")?,
        })
    }
}

impl Flatten for VirtualRouterSpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .blocks("listener", &self.listeners)
            .build()
    }
}

impl SpecCodec for VirtualRouterSpec {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn listeners_keep_their_order() {
        let config: Dynamic = serde_json::from_value(json!([{
            "listener": [
                {"port_mapping": [{"port": 8080, "protocol": "http"}]},
                {"port_mapping": [{"port": 8081, "protocol": "grpc"}]}
            ]
        }]))
        .unwrap();

        let spec = VirtualRouterSpec::expand_spec(Some(&config)).unwrap();
        let ports: Vec<_> = spec
            .listeners
            .iter()
            .map(|l| l.port_mapping.as_ref().unwrap().port)
            .collect();
        assert_eq!(ports, vec![Some(8080), Some(8081)]);

        assert_eq!(VirtualRouterSpec::flatten_spec(Some(&spec)), config);
    }
}
