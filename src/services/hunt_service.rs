//! Business logic behind the participant hunt routes.
//!
//! Every action works on a copy of the session's state machine computed
//! against a freshly listed station set, then commits it only if the session
//! did not move in the meantime.

use std::time::{Duration, Instant};

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::hunt::HuntSessionView,
    error::ServiceError,
    state::{
        SharedState,
        hunt_machine::{HuntError, HuntStateMachine},
        station::StationSet,
    },
};

/// Read the whole station table from the installed store.
pub async fn load_stations(state: &SharedState) -> Result<StationSet, ServiceError> {
    let store = state.require_station_store().await?;
    let rows = store.list_stations().await.map_err(|err| {
        warn!(error = %err, "failed to list stations");
        ServiceError::from(err)
    })?;
    Ok(StationSet::from(rows))
}

/// Open a session, resolving `deep_link` right away when given.
///
/// A deep link naming no station discards the new session.
pub async fn open_session(
    state: &SharedState,
    deep_link: Option<String>,
) -> Result<HuntSessionView, ServiceError> {
    let (id, session) = state.open_session();

    let Some(identifier) = deep_link.filter(|value| !value.trim().is_empty()) else {
        return Ok(HuntSessionView::new(id, &session));
    };

    match resolve_station(state, id, identifier).await {
        Ok(view) => Ok(view),
        Err(err) => {
            state.close_session(id);
            Err(err)
        }
    }
}

pub async fn get_session(state: &SharedState, id: Uuid) -> Result<HuntSessionView, ServiceError> {
    state
        .session(id)
        .map(|session| HuntSessionView::new(id, &session))
        .ok_or_else(|| session_not_found(id))
}

/// Move the session to the station named by `identifier`.
pub async fn resolve_station(
    state: &SharedState,
    id: Uuid,
    identifier: String,
) -> Result<HuntSessionView, ServiceError> {
    run_action(state, id, |machine, stations| {
        machine
            .resolve_station(stations, &identifier)
            .map(|_| ())
    })
    .await
}

/// Decode a scanned QR payload, then resolve the station it names.
pub async fn scan(
    state: &SharedState,
    id: Uuid,
    payload: String,
) -> Result<HuntSessionView, ServiceError> {
    let identifier = state.qr().decode(&payload).map_err(|err| {
        debug!(session_id = %id, error = %err, "unreadable QR payload");
        ServiceError::from(err)
    })?;
    resolve_station(state, id, identifier).await
}

/// Try `password` against the routes of the session's current station.
pub async fn submit_password(
    state: &SharedState,
    id: Uuid,
    password: String,
) -> Result<HuntSessionView, ServiceError> {
    run_action(state, id, |machine, stations| {
        machine.submit_password(stations, &password).map(|_| ())
    })
    .await
}

/// Discard a session, typically when the participant leaves the page.
pub async fn close_session(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    if state.close_session(id) {
        Ok(())
    } else {
        Err(session_not_found(id))
    }
}

/// Drop idle sessions every `every` for as long as the server runs.
pub async fn reap_idle_sessions(state: SharedState, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let dropped = state.prune_idle_sessions(Instant::now());
        if dropped > 0 {
            info!(
                dropped,
                remaining = state.session_count(),
                "expired idle hunt sessions"
            );
        }
    }
}

async fn run_action<F>(state: &SharedState, id: Uuid, action: F) -> Result<HuntSessionView, ServiceError>
where
    F: FnOnce(&mut HuntStateMachine, &StationSet) -> Result<(), HuntError>,
{
    let mut session = state.session(id).ok_or_else(|| session_not_found(id))?;
    let stations = load_stations(state).await?;
    let based_on = session.machine.version();

    if let Err(err) = action(&mut session.machine, &stations) {
        log_hunt_error(id, &err);
        return Err(err.into());
    }

    state.commit_session(id, based_on, session.machine.clone())?;
    info!(
        session_id = %id,
        phase = session.machine.phase().kind(),
        "hunt session advanced"
    );
    Ok(HuntSessionView::new(id, &session))
}

fn log_hunt_error(id: Uuid, err: &HuntError) {
    match err {
        HuntError::DanglingReference {
            station_id,
            route_key,
            next_station,
        } => warn!(
            session_id = %id,
            %station_id,
            %route_key,
            %next_station,
            "route leads to a missing station"
        ),
        other => debug!(session_id = %id, reason = %other, "hunt action rejected"),
    }
}

fn session_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("hunt session `{id}`"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{RouteEntity, StationEntity},
            station_store::memory::MemoryStationStore,
        },
        dto::hunt::HuntPhaseKind,
        state::AppState,
    };

    async fn state_with(stations: Vec<StationEntity>) -> (SharedState, MemoryStationStore) {
        let state = AppState::new(AppConfig::default()).unwrap();
        let store = MemoryStationStore::with_stations(stations);
        state.set_station_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn station(id: &str, routes: &[(&str, &str, &str)]) -> StationEntity {
        StationEntity {
            id: id.into(),
            name: format!("Station {id}"),
            routes: routes
                .iter()
                .map(|(key, password, next)| {
                    (
                        (*key).to_owned(),
                        RouteEntity {
                            next_station: (*next).into(),
                            password: (*password).into(),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn deep_link_resolves_on_open() {
        let (state, _) = state_with(vec![station("A", &[])]).await;
        let view = open_session(&state, Some("A".into())).await.unwrap();
        assert_eq!(view.phase, HuntPhaseKind::AtStation);
        assert_eq!(view.station.unwrap().id, "A");
    }

    #[tokio::test]
    async fn invalid_deep_link_discards_the_session() {
        let (state, _) = state_with(vec![station("A", &[])]).await;
        let err = open_session(&state, Some("Z".into())).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn store_outage_leaves_the_session_untouched() {
        let (state, store) =
            state_with(vec![station("A", &[("r1", "CAT", "B")]), station("B", &[])]).await;
        let view = open_session(&state, Some("A".into())).await.unwrap();

        store.set_offline(true);
        let err = submit_password(&state, view.session_id, "cat".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));

        let current = get_session(&state, view.session_id).await.unwrap();
        assert_eq!(current.phase, HuntPhaseKind::AtStation);
    }

    #[tokio::test]
    async fn scan_decodes_the_station_parameter() {
        let (state, _) = state_with(vec![station("GATE", &[])]).await;
        let view = open_session(&state, None).await.unwrap();
        let payload = state.qr().encode("GATE");

        let view = scan(&state, view.session_id, payload).await.unwrap();
        assert_eq!(view.station.unwrap().id, "GATE");
    }

    #[tokio::test]
    async fn reaper_expires_sessions_left_idle() {
        let config = AppConfig::default().with_session_ttl(Duration::from_millis(1));
        let state = AppState::new(config).unwrap();
        open_session(&state, None).await.unwrap();
        open_session(&state, None).await.unwrap();
        assert!(state.session_count() >= 1);

        let reaper = tokio::spawn(reap_idle_sessions(state.clone(), Duration::from_millis(5)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        reaper.abort();

        assert_eq!(state.session_count(), 0);
    }

    #[tokio::test]
    async fn closed_session_is_gone() {
        let (state, _) = state_with(vec![]).await;
        let view = open_session(&state, None).await.unwrap();

        close_session(&state, view.session_id).await.unwrap();
        assert!(matches!(
            get_session(&state, view.session_id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(close_session(&state, view.session_id).await.is_err());
    }
}
