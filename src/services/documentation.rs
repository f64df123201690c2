use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Scavenger Hunt Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::hunt::open_session,
        crate::routes::hunt::get_session,
        crate::routes::hunt::close_session,
        crate::routes::hunt::resolve_station,
        crate::routes::hunt::scan,
        crate::routes::hunt::submit_password,
        crate::routes::admin::list_stations,
        crate::routes::admin::create_draft,
        crate::routes::admin::save_station,
        crate::routes::admin::delete_station,
        crate::routes::admin::add_route,
        crate::routes::admin::update_route,
        crate::routes::admin::remove_route,
        crate::routes::admin::rename_route,
        crate::routes::admin::graph,
        crate::routes::admin::graph_issues,
        crate::routes::admin::station_qr,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::hunt::HuntSessionView,
            crate::dto::hunt::HuntPhaseKind,
            crate::dto::hunt::StationRef,
            crate::dto::hunt::ClueDto,
            crate::dto::hunt::ResolveStationRequest,
            crate::dto::hunt::ScanRequest,
            crate::dto::hunt::PasswordRequest,
            crate::dto::station::StationDto,
            crate::dto::station::RouteDto,
            crate::dto::admin::AddRouteRequest,
            crate::dto::admin::RenameRouteRequest,
            crate::dto::admin::UpdateRouteRequest,
            crate::dto::admin::StationQrResponse,
            crate::dto::graph::GraphDefinition,
            crate::dto::graph::GraphIssuesResponse,
            crate::dto::graph::DanglingRouteDto,
            crate::dto::graph::RouteRefDto,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "hunt", description = "Participant progress through the stations"),
        (name = "admin", description = "Station and route graph editor"),
    )
)]
pub struct ApiDoc;
