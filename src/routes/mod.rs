//! Explicit route tables, assembled into the application router at startup.

pub mod api;
pub mod manage;
pub mod pages;

use crate::logging;
use crate::session;
use crate::state::AppState;
use axum::{middleware, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Full application: pages, manage console, APIs, static files, and the
/// middleware chain (body limit → request log → session parsing).
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(pages::page_routes(state.clone()))
        .nest("/manage", manage::manage_routes(state.clone()))
        .merge(api::api_routes(state.clone()))
        .nest_service("/static", ServeDir::new(state.config.static_dir.clone()))
        .layer(middleware::from_fn_with_state(
            state,
            session::session_middleware,
        ))
        .layer(middleware::from_fn(logging::log_request))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, DbConfig};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// State with a lazy pool; tests below never touch the database.
    fn test_state() -> AppState {
        let opts = MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(3306)
            .username("weblog")
            .database("weblog");
        AppState {
            pool: MySqlPoolOptions::new().connect_lazy_with(opts),
            config: Arc::new(AppConfig {
                bind: "127.0.0.1:9000".parse().unwrap(),
                db: DbConfig {
                    host: "127.0.0.1".into(),
                    port: 3306,
                    user: "weblog".into(),
                    password: String::new(),
                    database: "weblog".into(),
                    pool_min: 1,
                    pool_max: 2,
                },
                session_secret: "test-secret".into(),
                templates_dir: "templates".into(),
                static_dir: "static".into(),
            }),
            templates: Arc::new(tera::Tera::default()),
        }
    }

    #[tokio::test]
    async fn manage_console_redirects_anonymous_visitors_to_signin() {
        let resp = app(test_state())
            .oneshot(Request::get("/manage/blogs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/signin");
    }

    #[tokio::test]
    async fn manage_root_also_redirects_anonymous_visitors() {
        let resp = app(test_state())
            .oneshot(Request::get("/manage/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/signin");
    }

    #[tokio::test]
    async fn signout_redirects_to_referer_and_clears_cookie() {
        let resp = app(test_state())
            .oneshot(
                Request::get("/signout")
                    .header(header::REFERER, "/blog/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers()[header::LOCATION], "/blog/abc");
        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with(crate::session::COOKIE_NAME));
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let resp = app(test_state())
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn api_post_without_content_type_is_400() {
        let resp = app(test_state())
            .oneshot(
                Request::post("/api/authenticate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
