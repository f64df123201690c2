use axum::{
    Json, Router,
    body::Body,
    extract::{Path, Query, State},
    http::{Request, header::AUTHORIZATION},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_valid::Valid;
use subtle::ConstantTimeEq;

use crate::{
    dto::{
        admin::{
            AddRouteRequest, DeleteStationQuery, RenameRouteRequest, RouteKeyQuery,
            StationQrResponse, UpdateRouteRequest,
        },
        graph::{GraphDefinition, GraphIssuesResponse},
        station::StationDto,
    },
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only editor endpoints for stations, routes and the route graph.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/stations", get(list_stations).put(save_station))
        .route("/admin/stations/draft", post(create_draft))
        .route("/admin/stations/{id}", delete(delete_station))
        .route("/admin/stations/{id}/qr", get(station_qr))
        .route(
            "/admin/stations/{id}/routes",
            post(add_route).put(update_route).delete(remove_route),
        )
        .route("/admin/stations/{id}/routes/rename", post(rename_route))
        .route("/admin/graph", get(graph))
        .route("/admin/graph/issues", get(graph_issues))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// List every station in creation order.
#[utoipa::path(
    get,
    path = "/admin/stations",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    responses((status = 200, description = "Stored stations", body = [StationDto]))
)]
pub async fn list_stations(
    State(state): State<SharedState>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(admin_service::list_stations(&state).await?))
}

/// Prepare a new station with a generated id. Nothing is stored until it is saved.
#[utoipa::path(
    post,
    path = "/admin/stations/draft",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    responses((status = 200, description = "Unsaved draft station", body = StationDto))
)]
pub async fn create_draft(State(state): State<SharedState>) -> Result<Json<StationDto>, AppError> {
    Ok(Json(admin_service::create_draft(&state).await?))
}

/// Insert or replace a station as a whole.
#[utoipa::path(
    put,
    path = "/admin/stations",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    request_body = StationDto,
    responses((status = 200, description = "Station saved; stations re-read from storage", body = [StationDto]))
)]
pub async fn save_station(
    State(state): State<SharedState>,
    Json(payload): Json<StationDto>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(admin_service::save_station(&state, payload).await?))
}

/// Delete a station. `confirm` must repeat its id.
#[utoipa::path(
    delete,
    path = "/admin/stations/{id}",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Identifier of the station to delete"),
    DeleteStationQuery),
    responses(
        (status = 200, description = "Station deleted; stations re-read from storage", body = [StationDto]),
        (status = 400, description = "Missing or mismatching confirmation"),
        (status = 404, description = "Unknown station")
    )
)]
pub async fn delete_station(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteStationQuery>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(
        admin_service::delete_station(&state, id, query.confirm).await?,
    ))
}

/// Add an empty route to a station.
#[utoipa::path(
    post,
    path = "/admin/stations/{id}/routes",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Identifier of the edited station")),
    request_body = AddRouteRequest,
    responses((status = 200, description = "Route added", body = [StationDto]))
)]
pub async fn add_route(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<AddRouteRequest>>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(admin_service::add_route(&state, id, payload.key).await?))
}

/// Edit the fields of one route.
#[utoipa::path(
    put,
    path = "/admin/stations/{id}/routes",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Identifier of the edited station"),
    RouteKeyQuery),
    request_body = UpdateRouteRequest,
    responses(
        (status = 200, description = "Route updated", body = [StationDto]),
        (status = 404, description = "Unknown station or route")
    )
)]
pub async fn update_route(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(route): Query<RouteKeyQuery>,
    Json(payload): Json<UpdateRouteRequest>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(
        admin_service::update_route(&state, id, route.key, payload).await?,
    ))
}

/// Remove one route from a station.
#[utoipa::path(
    delete,
    path = "/admin/stations/{id}/routes",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Identifier of the edited station"),
    RouteKeyQuery),
    responses(
        (status = 200, description = "Route removed", body = [StationDto]),
        (status = 404, description = "Unknown station or route")
    )
)]
pub async fn remove_route(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Query(route): Query<RouteKeyQuery>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(admin_service::remove_route(&state, id, route.key).await?))
}

/// Move a route under another key. An existing route under that key is overwritten.
#[utoipa::path(
    post,
    path = "/admin/stations/{id}/routes/rename",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Identifier of the edited station")),
    request_body = RenameRouteRequest,
    responses(
        (status = 200, description = "Route renamed", body = [StationDto]),
        (status = 404, description = "Unknown station or route")
    )
)]
pub async fn rename_route(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Valid(Json(payload)): Valid<Json<RenameRouteRequest>>,
) -> Result<Json<Vec<StationDto>>, AppError> {
    Ok(Json(
        admin_service::rename_route(&state, id, payload.old_key, payload.new_key).await?,
    ))
}

/// Mermaid description of the route graph.
#[utoipa::path(
    get,
    path = "/admin/graph",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    responses((status = 200, description = "Graph definition", body = GraphDefinition))
)]
pub async fn graph(State(state): State<SharedState>) -> Result<Json<GraphDefinition>, AppError> {
    Ok(Json(admin_service::graph(&state).await?))
}

/// Dangling routes, unreachable, terminal and incomplete stations.
#[utoipa::path(
    get,
    path = "/admin/graph/issues",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token")),
    responses((status = 200, description = "Integrity report", body = GraphIssuesResponse))
)]
pub async fn graph_issues(
    State(state): State<SharedState>,
) -> Result<Json<GraphIssuesResponse>, AppError> {
    Ok(Json(admin_service::graph_issues(&state).await?))
}

/// QR payload and download name of a station.
#[utoipa::path(
    get,
    path = "/admin/stations/{id}/qr",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Configured admin token"),
    ("id" = String, Path, description = "Station identifier")),
    responses(
        (status = 200, description = "QR payload", body = StationQrResponse),
        (status = 404, description = "Unknown station")
    )
)]
pub async fn station_qr(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<StationQrResponse>, AppError> {
    Ok(Json(admin_service::station_qr(&state, id).await?))
}

/// Ensure admin requests carry the configured token, either as `X-Admin-Token`
/// or as an `Authorization: Bearer` header.
async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config().admin_token() else {
        return Err(AppError::Unauthorized(
            "admin access is disabled: no admin token configured".into(),
        ));
    };

    let headers = req.headers();
    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.strip_prefix("Bearer "))
        })
        .map(str::trim)
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    if bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid admin token".into()))
    }
}
