//! Pure editing operations behind the admin graph editor. Each operation
//! returns an edited copy; persisting it is the caller's concern.

use rand::Rng;
use thiserror::Error;

use crate::state::station::{Route, Station};

/// Length of generated station identifiers.
pub const DRAFT_ID_LEN: usize = 6;
const ID_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Editing failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("station `{station_id}` has no route `{route_key}`")]
    RouteNotFound {
        station_id: String,
        route_key: String,
    },
}

/// Fields of a route that can be edited in place.
#[derive(Debug, Clone, Default)]
pub struct RoutePatch {
    pub next_station: Option<String>,
    pub password: Option<String>,
    pub next_clue: Option<String>,
    /// `Some(None)` clears the video.
    pub video_url: Option<Option<String>>,
}

/// New unsaved station with a generated id, empty name and no routes.
pub fn create_draft_station() -> Station {
    Station {
        id: generate_station_id(&mut rand::rng()),
        ..Default::default()
    }
}

/// Short identifier meant to be typed by hand: no `0/O` or `1/I` lookalikes.
pub fn generate_station_id(rng: &mut impl Rng) -> String {
    (0..DRAFT_ID_LEN)
        .map(|_| ID_CHARSET[rng.random_range(0..ID_CHARSET.len())] as char)
        .collect()
}

/// Add an empty route under `key`. An existing route under the same key is replaced.
pub fn add_route(station: &Station, key: &str) -> Station {
    let mut edited = station.clone();
    edited.routes.insert(key.to_owned(), Route::default());
    edited
}

/// Move the route stored under `old_key` to `new_key`, keeping its fields and
/// its position. A route already stored under `new_key` is overwritten.
pub fn rename_route_key(
    station: &Station,
    old_key: &str,
    new_key: &str,
) -> Result<Station, EditorError> {
    let mut edited = station.clone();
    let Some((index, _, route)) = edited.routes.shift_remove_full(old_key) else {
        return Err(route_not_found(station, old_key));
    };

    match edited.routes.get_mut(new_key) {
        Some(existing) => *existing = route,
        None => {
            edited.routes.shift_insert(index, new_key.to_owned(), route);
        }
    }
    Ok(edited)
}

/// Apply `patch` to the route stored under `key`.
pub fn update_route(station: &Station, key: &str, patch: RoutePatch) -> Result<Station, EditorError> {
    let mut edited = station.clone();
    let route = edited
        .routes
        .get_mut(key)
        .ok_or_else(|| route_not_found(station, key))?;

    if let Some(next_station) = patch.next_station {
        route.next_station = next_station;
    }
    if let Some(password) = patch.password {
        route.password = password;
    }
    if let Some(next_clue) = patch.next_clue {
        route.next_clue = next_clue;
    }
    if let Some(video_url) = patch.video_url {
        route.video_url = video_url.filter(|url| !url.trim().is_empty());
    }
    Ok(edited)
}

/// Remove the route stored under `key`, keeping the order of the others.
pub fn remove_route(station: &Station, key: &str) -> Result<Station, EditorError> {
    let mut edited = station.clone();
    edited
        .routes
        .shift_remove(key)
        .ok_or_else(|| route_not_found(station, key))?;
    Ok(edited)
}

fn route_not_found(station: &Station, key: &str) -> EditorError {
    EditorError::RouteNotFound {
        station_id: station.id.clone(),
        route_key: key.to_owned(),
    }
}
