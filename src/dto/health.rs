use serde::Serialize;
use utoipa::ToSchema;

/// Overall state of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// No station store is connected; hunt and admin calls answer 503.
    Degraded,
}

/// Body of `GET /healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether the last ping of the station store succeeded.
    pub store_reachable: bool,
    /// Hunt sessions currently held in memory.
    pub active_sessions: usize,
}
