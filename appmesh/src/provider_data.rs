//! Provider data structure passed to resources and data sources

use crate::api::Client;
use crate::retry::PropagationWait;
use crate::tags::{DefaultConfig, IgnoreConfig};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppMeshProviderData {
    pub client: Arc<Client>,
    pub default_tags: DefaultConfig,
    pub ignore_tags: IgnoreConfig,
    /// How long reads wait for a freshly created entity to show up
    pub propagation: PropagationWait,
}

impl AppMeshProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            default_tags: DefaultConfig::default(),
            ignore_tags: IgnoreConfig::default(),
            propagation: PropagationWait::default(),
        }
    }

    pub fn with_tag_config(mut self, default_tags: DefaultConfig, ignore_tags: IgnoreConfig) -> Self {
        self.default_tags = default_tags;
        self.ignore_tags = ignore_tags;
        self
    }

    pub fn with_propagation(mut self, propagation: PropagationWait) -> Self {
        self.propagation = propagation;
        self
    }
}
