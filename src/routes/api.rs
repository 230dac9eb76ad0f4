//! JSON API routes.

use crate::handlers::{blogs, comments, users};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(users::api_users).post(users::api_register))
        .route("/api/authenticate", post(users::api_authenticate))
        .route("/api/blogs", get(blogs::api_blogs).post(blogs::api_create_blog))
        .route(
            "/api/blogs/:id",
            get(blogs::api_get_blog).post(blogs::api_update_blog),
        )
        .route("/api/blogs/:id/delete", post(blogs::api_delete_blog))
        .route("/api/blogs/:id/comments", post(comments::api_create_comment))
        .route("/api/comments", get(comments::api_comments))
        .route("/api/comments/:id/delete", post(comments::api_delete_comment))
        .with_state(state)
}
