//! Resource implementations

mod entity;
pub mod schema;

pub mod resource_gateway_route;
pub mod resource_mesh;
pub mod resource_route;
pub mod resource_virtual_gateway;
pub mod resource_virtual_node;
pub mod resource_virtual_router;
pub mod resource_virtual_service;

pub use entity::{resource_schema, AppMeshResource, EntityKind};
pub(crate) use entity::{find_entity, key_from_state, set_identity, set_metadata};

pub use resource_gateway_route::{GatewayRoute, GatewayRouteResource};
pub use resource_mesh::{Mesh, MeshResource};
pub use resource_route::{Route, RouteResource};
pub use resource_virtual_gateway::{VirtualGateway, VirtualGatewayResource};
pub use resource_virtual_node::{VirtualNode, VirtualNodeResource};
pub use resource_virtual_router::{VirtualRouter, VirtualRouterResource};
pub use resource_virtual_service::{VirtualService, VirtualServiceResource};
