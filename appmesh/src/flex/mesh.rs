use tfplug::types::Dynamic;

use super::{validate_spec, Block, Expand, Flatten, ObjectBuilder, Result, SpecCodec};
use crate::api::mesh::{EgressFilter, MeshServiceDiscovery, MeshSpec};

pub fn validate_mesh_spec(spec: &Dynamic) -> Result<()> {
    validate_spec::<MeshSpec>(spec)
}

impl Expand for EgressFilter {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(EgressFilter {
            filter_type: b.string("type")?,
        })
    }
}

impl Flatten for EgressFilter {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("type", self.filter_type.as_deref())
            .build()
    }
}

impl Expand for MeshServiceDiscovery {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(MeshServiceDiscovery {
            ip_preference: b.string("ip_preference")?,
        })
    }
}

impl Flatten for MeshServiceDiscovery {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .string("ip_preference", self.ip_preference.as_deref())
            .build()
    }
}

impl Expand for MeshSpec {
    fn expand(b: &Block<'_>) -> Result<Self> {
        Ok(MeshSpec {
            egress_filter: b.expand("egress_filter")?,
            service_discovery: b.expand("service_discovery")?,
        })
    }
}

impl Flatten for MeshSpec {
    fn flatten(&self) -> Dynamic {
        ObjectBuilder::new()
            .block("egress_filter", self.egress_filter.as_ref())
            .block("service_discovery", self.service_discovery.as_ref())
            .build()
    }
}

impl SpecCodec for MeshSpec {}
