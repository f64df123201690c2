//! Business logic powering the admin editor routes. Edits are applied to a
//! copy of the stored station, written back whole, and every mutation answers
//! with the station list re-read from storage.

use tracing::{info, warn};

use crate::{
    dto::{
        admin::{StationQrResponse, UpdateRouteRequest},
        graph::{GraphDefinition, GraphIssuesResponse},
        station::StationDto,
    },
    error::ServiceError,
    services::{graph, hunt_service::load_stations, qr::download_file_name},
    state::{
        SharedState,
        editor::{self, EditorError},
        station::Station,
    },
};

/// Return the stored stations in creation order.
pub async fn list_stations(state: &SharedState) -> Result<Vec<StationDto>, ServiceError> {
    let stations = load_stations(state).await?;
    Ok(stations.iter().cloned().map(StationDto::from).collect())
}

/// New unsaved station whose generated id is not used yet.
pub async fn create_draft(state: &SharedState) -> Result<StationDto, ServiceError> {
    let stations = load_stations(state).await?;
    let draft = loop {
        let candidate = editor::create_draft_station();
        if !stations.contains(&candidate.id) {
            break candidate;
        }
    };
    Ok(draft.into())
}

/// Insert or replace a station. Empty ids and names are accepted.
pub async fn save_station(
    state: &SharedState,
    station: StationDto,
) -> Result<Vec<StationDto>, ServiceError> {
    let station = Station::from(station);
    if station.id.trim().is_empty() || station.name.trim().is_empty() {
        warn!(station_id = %station.id, "saving a station with an empty id or name");
    }
    persist(state, station).await?;
    list_stations(state).await
}

/// Delete a station once `confirm` repeats its id. Routes elsewhere that lead
/// to it are left as they are.
pub async fn delete_station(
    state: &SharedState,
    id: String,
    confirm: Option<String>,
) -> Result<Vec<StationDto>, ServiceError> {
    if confirm.as_deref() != Some(id.as_str()) {
        return Err(ServiceError::InvalidInput(format!(
            "deleting station `{id}` requires `confirm={id}`"
        )));
    }

    let store = state.require_station_store().await?;
    if !store.delete_station(id.clone()).await? {
        return Err(station_not_found(&id));
    }
    info!(station_id = %id, "station deleted");
    list_stations(state).await
}

/// Add an empty route under `key`, replacing any route already stored there.
pub async fn add_route(
    state: &SharedState,
    id: String,
    key: String,
) -> Result<Vec<StationDto>, ServiceError> {
    edit_station(state, id, |station| Ok(editor::add_route(station, &key))).await
}

pub async fn update_route(
    state: &SharedState,
    id: String,
    key: String,
    patch: UpdateRouteRequest,
) -> Result<Vec<StationDto>, ServiceError> {
    edit_station(state, id, |station| {
        editor::update_route(station, &key, patch.into())
    })
    .await
}

pub async fn remove_route(
    state: &SharedState,
    id: String,
    key: String,
) -> Result<Vec<StationDto>, ServiceError> {
    edit_station(state, id, |station| editor::remove_route(station, &key)).await
}

/// Move a route to `new_key`, overwriting whatever was stored there.
pub async fn rename_route(
    state: &SharedState,
    id: String,
    old_key: String,
    new_key: String,
) -> Result<Vec<StationDto>, ServiceError> {
    edit_station(state, id, |station| {
        if old_key != new_key && station.routes.contains_key(&new_key) {
            warn!(
                station_id = %station.id,
                %old_key,
                %new_key,
                "route rename overwrites an existing route"
            );
        }
        editor::rename_route_key(station, &old_key, &new_key)
    })
    .await
}

/// Mermaid description of the current route graph.
pub async fn graph(state: &SharedState) -> Result<GraphDefinition, ServiceError> {
    let stations = load_stations(state).await?;
    Ok(GraphDefinition {
        mermaid: graph::render_mermaid(&stations),
    })
}

/// Integrity report over the current route graph.
pub async fn graph_issues(state: &SharedState) -> Result<GraphIssuesResponse, ServiceError> {
    let stations = load_stations(state).await?;
    Ok(graph::validate(&stations).into())
}

/// QR payload of a stored station.
pub async fn station_qr(state: &SharedState, id: String) -> Result<StationQrResponse, ServiceError> {
    let store = state.require_station_store().await?;
    if store.find_station(id.clone()).await?.is_none() {
        return Err(station_not_found(&id));
    }

    Ok(StationQrResponse {
        payload: state.qr().encode(&id),
        file_name: download_file_name(&id),
        station_id: id,
    })
}

async fn edit_station<F>(
    state: &SharedState,
    id: String,
    edit: F,
) -> Result<Vec<StationDto>, ServiceError>
where
    F: FnOnce(&Station) -> Result<Station, EditorError>,
{
    let store = state.require_station_store().await?;
    let current = store
        .find_station(id.clone())
        .await?
        .map(Station::from)
        .ok_or_else(|| station_not_found(&id))?;

    let edited = edit(&current)?;
    persist(state, edited).await?;
    list_stations(state).await
}

async fn persist(state: &SharedState, station: Station) -> Result<(), ServiceError> {
    let store = state.require_station_store().await?;
    let id = station.id.clone();
    store.upsert_station(station.into()).await.map_err(|err| {
        warn!(station_id = %id, error = %err, "failed to save station");
        ServiceError::from(err)
    })?;
    info!(station_id = %id, "station saved");
    Ok(())
}

fn station_not_found(id: &str) -> ServiceError {
    ServiceError::NotFound(format!("station `{id}`"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::station_store::memory::MemoryStationStore, dto::station::RouteDto,
        state::AppState,
    };

    async fn state() -> SharedState {
        let state = AppState::new(AppConfig::default()).unwrap();
        state
            .set_station_store(Arc::new(MemoryStationStore::new()))
            .await;
        state
    }

    fn gate() -> StationDto {
        let mut station = StationDto {
            id: "A".into(),
            name: "Gate".into(),
            ..Default::default()
        };
        station.routes.insert(
            "START_A".into(),
            RouteDto {
                next_station: "B".into(),
                password: "CAT".into(),
                next_clue: "Find the oak".into(),
                video_url: Some("https://example.com/oak.mp4".into()),
            },
        );
        station
    }

    #[tokio::test]
    async fn saved_station_is_listed_field_for_field() {
        let state = state().await;
        let listed = save_station(&state, gate()).await.unwrap();
        assert_eq!(listed, vec![gate()]);
    }

    #[tokio::test]
    async fn delete_requires_matching_confirmation() {
        let state = state().await;
        save_station(&state, gate()).await.unwrap();

        for confirm in [None, Some("B".to_string())] {
            assert!(matches!(
                delete_station(&state, "A".into(), confirm).await,
                Err(ServiceError::InvalidInput(_))
            ));
        }
        assert_eq!(list_stations(&state).await.unwrap().len(), 1);

        let listed = delete_station(&state, "A".into(), Some("A".into()))
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn editing_a_missing_station_is_not_found() {
        let state = state().await;
        assert!(matches!(
            add_route(&state, "GHOST".into(), "r1".into()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn route_edits_are_persisted() {
        let state = state().await;
        save_station(&state, gate()).await.unwrap();

        add_route(&state, "A".into(), "START_B".into()).await.unwrap();
        let listed = rename_route(&state, "A".into(), "START_B".into(), "team_blue".into())
            .await
            .unwrap();
        assert_eq!(
            listed[0].routes.keys().collect::<Vec<_>>(),
            vec!["START_A", "team_blue"]
        );

        let listed = remove_route(&state, "A".into(), "START_A".into())
            .await
            .unwrap();
        assert_eq!(listed[0].routes.keys().collect::<Vec<_>>(), vec!["team_blue"]);
    }

    #[tokio::test]
    async fn draft_ids_do_not_collide_and_are_not_saved() {
        let state = state().await;
        save_station(&state, gate()).await.unwrap();

        let draft = create_draft(&state).await.unwrap();
        assert_ne!(draft.id, "A");
        assert_eq!(list_stations(&state).await.unwrap().len(), 1);
    }
}
