//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("root must begin with a forward slash (e.g \"/api\"), got '{0}'")]
    InvalidRoot(String),
    #[error("schema name cannot be empty")]
    EmptySchemaName,
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

/// Errors raised by a backend adapter. The route layer passes these through untouched.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("{0}")]
    NotFound(String),
    #[error("invalid value for {property}: '{value}'")]
    InvalidValue { property: String, value: String },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("type: {0}")]
    Type(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Parse(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Type(_) => (StatusCode::BAD_REQUEST, "type_error"),
            AppError::Backend(e) => match e {
                BackendError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                BackendError::InvalidValue { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
                BackendError::Db(sqlx::Error::RowNotFound) => (StatusCode::NOT_FOUND, "not_found"),
                BackendError::Db(_) | BackendError::Other(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "backend_error")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, code, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
