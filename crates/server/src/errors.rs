use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sea_orm::SqlErr;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Error body returned by every handler: `{"error": title, "detail": message}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: &'static str,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: &'static str, detail: Option<String>) -> Self {
        Self { status, title, detail }
    }

    pub fn not_found(entity: &str, id: i32) -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found", Some(format!("{entity} {id} does not exist")))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, detail = ?self.detail, "request failed");
        }
        (self.status, Json(serde_json::json!({"error": self.title, "detail": self.detail}))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(err: ServiceError) -> Self {
        let detail = Some(err.to_string());
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                return Self::new(StatusCode::CONFLICT, "Unique Constraint Violation", detail)
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                return Self::new(StatusCode::CONFLICT, "Foreign Key Violation", detail)
            }
            _ => {}
        }
        match err {
            ServiceError::Validation(_) => Self::new(StatusCode::BAD_REQUEST, "Validation Error", detail),
            ServiceError::Db(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Database Error", detail),
            ServiceError::Hash(_) => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Password Hashing Failed", detail),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database unavailable: {0}")]
    Database(String),
}
