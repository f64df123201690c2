//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{dto::validation::validate_route_key, state::editor::RoutePatch};

/// Confirmation required before a station is deleted.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteStationQuery {
    /// Must repeat the identifier of the station being deleted.
    pub confirm: Option<String>,
}

/// Route addressed by an edit or removal. Keys travel in the query string
/// because they may be empty or collide with static path segments.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RouteKeyQuery {
    /// Key of the route; `?key=` addresses the unkeyed route.
    #[serde(default)]
    pub key: String,
}

/// Request to add an empty route to a station.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct AddRouteRequest {
    /// Origin of the incoming edge (team or previous station). May be empty.
    #[serde(default)]
    #[validate(custom(function = "validate_route_key"))]
    pub key: String,
}

/// Request to move a route under another key.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RenameRouteRequest {
    pub old_key: String,
    #[validate(custom(function = "validate_route_key"))]
    pub new_key: String,
}

/// Partial update of a route. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    #[serde(default)]
    pub next_station: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub next_clue: Option<String>,
    /// If not specified, keeps the current video.
    /// If null is specified, removes the video.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub video_url: Option<Option<String>>,
}

impl From<UpdateRouteRequest> for RoutePatch {
    fn from(value: UpdateRouteRequest) -> Self {
        Self {
            next_station: value.next_station,
            password: value.password,
            next_clue: value.next_clue,
            video_url: value.video_url,
        }
    }
}

/// QR payload of a station, to be rendered and downloaded client-side.
#[derive(Debug, Serialize, ToSchema)]
pub struct StationQrResponse {
    pub station_id: String,
    /// Text to encode into the QR image.
    pub payload: String,
    /// Suggested name of the downloaded image.
    pub file_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_url_distinguishes_absent_from_null() {
        let absent: UpdateRouteRequest = serde_json::from_str(r#"{"password":"CAT"}"#).unwrap();
        assert_eq!(absent.video_url, None);
        assert_eq!(absent.password.as_deref(), Some("CAT"));

        let cleared: UpdateRouteRequest = serde_json::from_str(r#"{"videoUrl":null}"#).unwrap();
        assert_eq!(cleared.video_url, Some(None));

        let set: UpdateRouteRequest =
            serde_json::from_str(r#"{"videoUrl":"https://example.com/v.mp4"}"#).unwrap();
        assert_eq!(
            set.video_url,
            Some(Some("https://example.com/v.mp4".to_string()))
        );
    }
}
