use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Ping the station store and summarise the backend state.
///
/// A failed ping is logged but only the supervisor flips the degraded flag.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store_reachable = match state.station_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(backend = err.backend(), error = %err, "station store ping failed");
                false
            }
        },
        None => {
            warn!("no station store connected (degraded mode)");
            false
        }
    };

    let status = if state.is_degraded().await {
        HealthStatus::Degraded
    } else {
        HealthStatus::Ok
    };

    HealthResponse {
        status,
        store_reachable,
        active_sessions: state.session_count(),
    }
}
