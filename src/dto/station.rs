//! Station payloads shared by the admin editor routes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::station::{Route, Station};

/// A station as exchanged with the admin editor. Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StationDto {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Routes keyed by the origin of the incoming edge, in declaration order.
    #[serde(default)]
    pub routes: IndexMap<String, RouteDto>,
}

/// One accepted password at a station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteDto {
    #[serde(default)]
    pub next_station: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next_clue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl From<Station> for StationDto {
    fn from(value: Station) -> Self {
        Self {
            id: value.id,
            name: value.name,
            routes: value
                .routes
                .into_iter()
                .map(|(key, route)| (key, route.into()))
                .collect(),
        }
    }
}

impl From<StationDto> for Station {
    fn from(value: StationDto) -> Self {
        Self {
            id: value.id,
            name: value.name,
            routes: value
                .routes
                .into_iter()
                .map(|(key, route)| (key, route.into()))
                .collect(),
        }
    }
}

impl From<Route> for RouteDto {
    fn from(value: Route) -> Self {
        Self {
            next_station: value.next_station,
            password: value.password,
            next_clue: value.next_clue,
            video_url: value.video_url,
        }
    }
}

impl From<RouteDto> for Route {
    fn from(value: RouteDto) -> Self {
        Self {
            next_station: value.next_station,
            password: value.password,
            next_clue: value.next_clue,
            video_url: value.video_url.filter(|url| !url.trim().is_empty()),
        }
    }
}
