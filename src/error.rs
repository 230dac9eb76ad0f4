//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Schema-descriptor construction failures. Raised once at startup when a
/// descriptor is first built, never during request handling.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("no primary key declared for table '{table}'")]
    NoPrimaryKey { table: &'static str },
    #[error("duplicate primary key for table '{table}': column '{column}'")]
    DuplicatePrimaryKey {
        table: &'static str,
        column: &'static str,
    },
    #[error("duplicate column for table '{table}': '{column}'")]
    DuplicateColumn {
        table: &'static str,
        column: &'static str,
    },
}

/// Structured domain error returned to API clients as a JSON payload with a
/// machine-readable code, the offending field, and a human message.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{error}: {message}")]
pub struct ApiError {
    pub error: String,
    pub data: String,
    pub message: String,
}

impl ApiError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        ApiError {
            error: "value:invalid".into(),
            data: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(field: &str, message: impl Into<String>) -> Self {
        ApiError {
            error: "value:notfound".into(),
            data: field.into(),
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        ApiError {
            error: "permission:forbidden".into(),
            data: "permission".into(),
            message: message.into(),
        }
    }

    pub fn register_failed(field: &str, message: impl Into<String>) -> Self {
        ApiError {
            error: "register:failed".into(),
            data: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("config: {0}")]
    Config(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("template: {0}")]
    Template(#[from] tera::Error),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // Domain errors keep the 200 + structured-payload contract so API
            // clients dispatch on the `error` code, not the HTTP status.
            AppError::Api(e) => (StatusCode::OK, Json(e)).into_response(),
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("not found: {}", what)).into_response()
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            other => {
                tracing::error!(error = %other, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_error_serializes_structured_payload() {
        let resp = AppError::Api(ApiError::register_failed("email", "Email is already in use."))
            .into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"], "register:failed");
        assert_eq!(v["data"], "email");
        assert_eq!(v["message"], "Email is already in use.");
    }

    #[tokio::test]
    async fn missing_argument_maps_to_400() {
        let resp = AppError::BadRequest("missing argument: page".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"missing argument: page");
    }
}
