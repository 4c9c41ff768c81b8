use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{response::IntoResponse, Json};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::domain::audit::error::AuditError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalServerError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Helper for mapping any unknown error into internal error
pub fn internal_error<E: ToString>(err: E) -> AppError {
    AppError::InternalServerError(err.to_string())
}

impl From<AuditError> for AppError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::InvalidInput(msg) => AppError::BadRequest(msg),
            AuditError::CollaboratorFailure(err) => internal_error(err),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // String provided by thiserror → safe JSON message
        let body = Json(json!({
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}
