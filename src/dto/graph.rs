use serde::Serialize;
use utoipa::ToSchema;

use crate::services::graph::{DanglingRoute, GraphReport, RouteRef};

/// Mermaid description of the route graph, drawn by the admin UI.
#[derive(Debug, Serialize, ToSchema)]
pub struct GraphDefinition {
    pub mermaid: String,
}

/// Route whose destination station does not exist.
#[derive(Debug, Serialize, ToSchema)]
pub struct DanglingRouteDto {
    pub station_id: String,
    pub route_key: String,
    pub next_station: String,
}

/// Reference to one route of one station.
#[derive(Debug, Serialize, ToSchema)]
pub struct RouteRefDto {
    pub station_id: String,
    pub route_key: String,
}

/// Data-integrity findings over the station set.
#[derive(Debug, Serialize, ToSchema)]
pub struct GraphIssuesResponse {
    /// `false` when some route leads to a missing station.
    pub navigable: bool,
    pub dangling_routes: Vec<DanglingRouteDto>,
    /// Stations no route leads to.
    pub without_incoming: Vec<String>,
    /// Stations without routes, where the hunt ends.
    pub terminal: Vec<String>,
    /// Stations with an empty id or name.
    pub incomplete: Vec<String>,
    pub empty_passwords: Vec<RouteRefDto>,
}

impl From<GraphReport> for GraphIssuesResponse {
    fn from(value: GraphReport) -> Self {
        Self {
            navigable: value.is_navigable(),
            dangling_routes: value.dangling_routes.into_iter().map(Into::into).collect(),
            without_incoming: value.without_incoming,
            terminal: value.terminal,
            incomplete: value.incomplete,
            empty_passwords: value.empty_passwords.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<DanglingRoute> for DanglingRouteDto {
    fn from(value: DanglingRoute) -> Self {
        Self {
            station_id: value.station_id,
            route_key: value.route_key,
            next_station: value.next_station,
        }
    }
}

impl From<RouteRef> for RouteRefDto {
    fn from(value: RouteRef) -> Self {
        Self {
            station_id: value.station_id,
            route_key: value.route_key,
        }
    }
}
