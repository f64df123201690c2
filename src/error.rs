use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{
    dao::storage::StorageError,
    services::qr::QrError,
    state::{editor::EditorError, hunt_machine::HuntError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The session moved on while this request was being computed.
    #[error("session changed while the request was processed (expected version {expected}, got {actual})")]
    Stale { expected: usize, actual: usize },
    /// No route of the current station accepts the submitted password.
    #[error("incorrect password")]
    PasswordMismatch,
    /// A matching route points at a station that does not exist.
    #[error("{0}")]
    DanglingReference(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<HuntError> for ServiceError {
    fn from(err: HuntError) -> Self {
        match err {
            HuntError::InvalidCode { identifier } => {
                ServiceError::NotFound(format!("invalid station code `{identifier}`"))
            }
            HuntError::NotAtStation { .. } => ServiceError::InvalidState(err.to_string()),
            HuntError::PasswordMismatch { .. } => ServiceError::PasswordMismatch,
            HuntError::DanglingReference { .. } => ServiceError::DanglingReference(err.to_string()),
        }
    }
}

impl From<EditorError> for ServiceError {
    fn from(err: EditorError) -> Self {
        match err {
            EditorError::RouteNotFound { .. } => ServiceError::NotFound(err.to_string()),
        }
    }
}

impl From<QrError> for ServiceError {
    fn from(err: QrError) -> Self {
        ServiceError::InvalidInput(err.to_string())
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Well-formed request rejected by the hunt rules.
    #[error("{0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            stale @ ServiceError::Stale { .. } => AppError::Conflict(stale.to_string()),
            ServiceError::PasswordMismatch => AppError::Unprocessable("incorrect password".into()),
            ServiceError::DanglingReference(message) => AppError::Conflict(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
