//! Request binding: merged query/path parameters, and POST body decoding
//! driven by content type.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, RawPathParams, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

const BODY_LIMIT: usize = 1024 * 1024;

/// Flat key→value parameters for a handler: query-string pairs (first
/// occurrence wins per key) merged with path-template parameters, where a
/// path parameter overrides a same-named query value.
pub struct RouteParams(HashMap<String, String>);

impl RouteParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|s| s.as_str())
    }

    /// Required parameter; missing yields 400 naming the argument.
    pub fn require(&self, name: &str) -> Result<&str, AppError> {
        self.get(name)
            .ok_or_else(|| AppError::BadRequest(format!("missing argument: {}", name)))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RouteParams
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let mut map = HashMap::new();
        if let Some(qs) = parts.uri.query() {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_str(qs)
                .map_err(|e| AppError::BadRequest(format!("invalid query string: {}", e)))?;
            for (k, v) in pairs {
                map.entry(k).or_insert(v);
            }
        }
        if let Ok(path_params) = RawPathParams::from_request_parts(parts, state).await {
            for (k, v) in &path_params {
                if map.contains_key(k) {
                    tracing::warn!(name = k, "path parameter shadows query parameter");
                }
                map.insert(k.to_string(), v.to_string());
            }
        }
        Ok(RouteParams(map))
    }
}

/// POST body decoded as JSON or form data by content type. Missing or
/// unsupported content types yield 400.
pub struct BodyParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for BodyParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| AppError::BadRequest("missing content type".into()))?;
        let bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read body: {}", e)))?;
        if content_type.starts_with("application/json") {
            serde_json::from_slice(&bytes)
                .map(BodyParams)
                .map_err(|e| AppError::BadRequest(format!("invalid json body: {}", e)))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            serde_urlencoded::from_bytes(&bytes)
                .map(BodyParams)
                .map_err(|e| AppError::BadRequest(format!("invalid form body: {}", e)))
        } else {
            Err(AppError::BadRequest(format!(
                "unsupported content type: {}",
                content_type
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::{get, post};
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    async fn page(params: RouteParams) -> Result<String, AppError> {
        Ok(params.require("page")?.to_string())
    }

    async fn named(params: RouteParams) -> Result<String, AppError> {
        Ok(params.require("name")?.to_string())
    }

    #[derive(Deserialize)]
    struct EchoInput {
        word: String,
    }

    async fn echo(BodyParams(input): BodyParams<EchoInput>) -> String {
        input.word
    }

    fn router() -> Router {
        Router::new()
            .route("/page", get(page))
            .route("/named/:name", get(named))
            .route("/echo", post(echo))
    }

    async fn body_of(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn query_parameter_binds_by_name() {
        let resp = router()
            .oneshot(HttpRequest::get("/page?page=2").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, "2");
    }

    #[tokio::test]
    async fn first_query_occurrence_wins() {
        let resp = router()
            .oneshot(
                HttpRequest::get("/page?page=2&page=9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_of(resp).await, "2");
    }

    #[tokio::test]
    async fn missing_required_parameter_is_400_naming_it() {
        let resp = router()
            .oneshot(HttpRequest::get("/page").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_of(resp).await, "missing argument: page");
    }

    #[tokio::test]
    async fn path_parameter_overrides_query_parameter() {
        let resp = router()
            .oneshot(
                HttpRequest::get("/named/alpha?name=beta")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_of(resp).await, "alpha");
    }

    #[tokio::test]
    async fn json_body_decodes() {
        let resp = router()
            .oneshot(
                HttpRequest::post("/echo")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"word":"hi"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, "hi");
    }

    #[tokio::test]
    async fn form_body_decodes() {
        let resp = router()
            .oneshot(
                HttpRequest::post("/echo")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("word=hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_of(resp).await, "hello");
    }

    #[tokio::test]
    async fn unsupported_content_type_is_400() {
        let resp = router()
            .oneshot(
                HttpRequest::post("/echo")
                    .header("content-type", "text/plain")
                    .body(Body::from("word=hello"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_400() {
        let resp = router()
            .oneshot(HttpRequest::post("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
