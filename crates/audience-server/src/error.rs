//! Server error types

use audience_core::{CoreError, FilterIssue};
use audience_repository::RepositoryError;
use audience_runtime::RuntimeError;
use audience_sdk::SdkError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Server error type
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed request body or query
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Condition tree rejected by validation
    #[error("{} filter(s) failed validation", .0.len())]
    ValidationFailed(Vec<FilterIssue>),

    /// Condition tree could not be evaluated
    #[error("Evaluation error: {0}")]
    EvaluationError(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::ValidationFailed(_) | ServerError::EvaluationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ServerError::ValidationFailed(issues) => json!({
                "error": self.to_string(),
                "status": status.as_u16(),
                "issues": issues,
            }),
            _ => json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}

impl From<RuntimeError> for ServerError {
    fn from(err: RuntimeError) -> Self {
        ServerError::EvaluationError(err.to_string())
    }
}

impl From<RepositoryError> for ServerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { id } => ServerError::NotFound(id),
            other => ServerError::InternalError(other.to_string()),
        }
    }
}

impl From<SdkError> for ServerError {
    fn from(err: SdkError) -> Self {
        match err {
            SdkError::Validation(issues) => ServerError::ValidationFailed(issues),
            SdkError::Repository(e) => e.into(),
            SdkError::ConfigError(msg) => ServerError::InternalError(msg),
            other => ServerError::InvalidRequest(other.to_string()),
        }
    }
}
