//! Typed response shaping: every handler result is normalized into an HTTP
//! response from one of these variants.

use crate::error::AppError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug)]
pub enum Reply {
    /// Rendered HTML page.
    Html(String),
    /// JSON payload.
    Json(serde_json::Value),
    /// 302 redirect to the given location.
    Redirect(String),
    /// Raw bytes served as an octet stream.
    Bytes(Vec<u8>),
    /// Bare status code with an empty body.
    Status(StatusCode),
    /// Status code plus a message body.
    Message(StatusCode, String),
    /// Plain text fallback.
    Text(String),
}

impl Reply {
    pub fn json<T: Serialize>(value: &T) -> Result<Reply, AppError> {
        Ok(Reply::Json(serde_json::to_value(value)?))
    }
}

/// A bare string becomes an HTML body, unless it carries the `redirect:`
/// prefix, in which case it becomes a redirect to the remainder.
impl From<String> for Reply {
    fn from(s: String) -> Self {
        match s.strip_prefix("redirect:") {
            Some(target) => Reply::Redirect(target.to_string()),
            None => Reply::Html(s),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Html(body) => (
                [(header::CONTENT_TYPE, "text/html;charset=utf-8")],
                body,
            )
                .into_response(),
            Reply::Json(value) => (
                [(header::CONTENT_TYPE, "application/json;charset=utf-8")],
                value.to_string(),
            )
                .into_response(),
            Reply::Redirect(location) => {
                (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
            }
            Reply::Bytes(body) => (
                [(header::CONTENT_TYPE, "application/octet-stream")],
                body,
            )
                .into_response(),
            Reply::Status(code) => code.into_response(),
            Reply::Message(code, message) => (code, message).into_response(),
            Reply::Text(body) => (
                [(header::CONTENT_TYPE, "text/plain;charset=utf-8")],
                body,
            )
                .into_response(),
        }
    }
}
