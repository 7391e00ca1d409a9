//! App Mesh REST-JSON API client and wire types

pub mod client;
pub mod common;
pub mod entity;
pub mod error;
pub mod pool;
pub mod shapes;
pub mod signing;
pub mod tags;
pub mod test_helpers;

pub mod gateway_route;
pub mod mesh;
pub mod route;
pub mod virtual_gateway;
pub mod virtual_node;
pub mod virtual_router;
pub mod virtual_service;

pub use client::{Client, RetryConfig};
pub use common::{ApiQueryParams, EntityKey, MeshEntity, ResourceMetadata, ResourceStatus};
pub use entity::EntityApi;
pub use error::ApiError;
pub use shapes::{Duration, PortMapping};
pub use signing::RequestSigner;
pub use tags::TagRef;
