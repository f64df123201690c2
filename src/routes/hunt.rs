use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::hunt::{
        HuntSessionView, OpenSessionQuery, PasswordRequest, ResolveStationRequest, ScanRequest,
    },
    error::AppError,
    services::hunt_service,
    state::SharedState,
};

/// Participant-facing routes driving one hunt session each.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/hunt/sessions", post(open_session))
        .route(
            "/hunt/sessions/{id}",
            get(get_session).delete(close_session),
        )
        .route("/hunt/sessions/{id}/resolve", post(resolve_station))
        .route("/hunt/sessions/{id}/scan", post(scan))
        .route("/hunt/sessions/{id}/password", post(submit_password))
}

/// Start a session, optionally deep-linked to a station.
#[utoipa::path(
    post,
    path = "/hunt/sessions",
    tag = "hunt",
    params(OpenSessionQuery),
    responses(
        (status = 201, description = "Session opened", body = HuntSessionView),
        (status = 404, description = "Deep-linked station does not exist"),
        (status = 503, description = "Station storage unavailable")
    )
)]
pub async fn open_session(
    State(state): State<SharedState>,
    Query(query): Query<OpenSessionQuery>,
) -> Result<(StatusCode, Json<HuntSessionView>), AppError> {
    let view = hunt_service::open_session(&state, query.station).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/hunt/sessions/{id}",
    tag = "hunt",
    params(("id" = Uuid, Path, description = "Hunt session identifier")),
    responses(
        (status = 200, description = "Current phase", body = HuntSessionView),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HuntSessionView>, AppError> {
    Ok(Json(hunt_service::get_session(&state, id).await?))
}

/// Discard a session when the participant leaves or cancels scanning.
#[utoipa::path(
    delete,
    path = "/hunt/sessions/{id}",
    tag = "hunt",
    params(("id" = Uuid, Path, description = "Hunt session identifier")),
    responses(
        (status = 204, description = "Session discarded"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn close_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    hunt_service::close_session(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Resolve a station identifier typed in by hand.
#[utoipa::path(
    post,
    path = "/hunt/sessions/{id}/resolve",
    tag = "hunt",
    params(("id" = Uuid, Path, description = "Hunt session identifier")),
    request_body = ResolveStationRequest,
    responses(
        (status = 200, description = "Now at the station", body = HuntSessionView),
        (status = 404, description = "Invalid station code or unknown session"),
        (status = 409, description = "Session changed concurrently")
    )
)]
pub async fn resolve_station(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ResolveStationRequest>>,
) -> Result<Json<HuntSessionView>, AppError> {
    Ok(Json(
        hunt_service::resolve_station(&state, id, payload.identifier).await?,
    ))
}

/// Resolve the station named by a scanned QR payload.
#[utoipa::path(
    post,
    path = "/hunt/sessions/{id}/scan",
    tag = "hunt",
    params(("id" = Uuid, Path, description = "Hunt session identifier")),
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Now at the station", body = HuntSessionView),
        (status = 400, description = "Payload is not a station QR code"),
        (status = 404, description = "Invalid station code or unknown session")
    )
)]
pub async fn scan(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ScanRequest>>,
) -> Result<Json<HuntSessionView>, AppError> {
    Ok(Json(hunt_service::scan(&state, id, payload.payload).await?))
}

/// Submit a password at the current station.
#[utoipa::path(
    post,
    path = "/hunt/sessions/{id}/password",
    tag = "hunt",
    params(("id" = Uuid, Path, description = "Hunt session identifier")),
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Advanced; the clue is revealed", body = HuntSessionView),
        (status = 409, description = "No station scanned yet, the route leads to a missing station, or the session changed concurrently"),
        (status = 422, description = "Incorrect password")
    )
)]
pub async fn submit_password(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PasswordRequest>,
) -> Result<Json<HuntSessionView>, AppError> {
    Ok(Json(
        hunt_service::submit_password(&state, id, payload.password).await?,
    ))
}
