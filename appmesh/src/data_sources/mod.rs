//! Data source implementations

mod data_source_entity;

pub use data_source_entity::{data_source_schema, AppMeshDataSource};

use crate::resources::{
    GatewayRoute, Mesh, Route, VirtualGateway, VirtualNode, VirtualRouter, VirtualService,
};

pub type MeshDataSource = AppMeshDataSource<Mesh>;
pub type VirtualNodeDataSource = AppMeshDataSource<VirtualNode>;
pub type VirtualRouterDataSource = AppMeshDataSource<VirtualRouter>;
pub type VirtualServiceDataSource = AppMeshDataSource<VirtualService>;
pub type VirtualGatewayDataSource = AppMeshDataSource<VirtualGateway>;
pub type RouteDataSource = AppMeshDataSource<Route>;
pub type GatewayRouteDataSource = AppMeshDataSource<GatewayRoute>;
