//! Manage-console routes. Every route here sits behind the admin gate,
//! which redirects non-admin visitors to the sign-in page.

use crate::handlers::pages;
use crate::session;
use crate::state::AppState;
use axum::{middleware, routing::get, Router};

pub fn manage_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::manage_index))
        .route("/blogs", get(pages::manage_blogs))
        .route("/blogs/create", get(pages::manage_blog_create))
        .route("/blogs/edit", get(pages::manage_blog_edit))
        .route("/users", get(pages::manage_users))
        .route("/comments", get(pages::manage_comments))
        .layer(middleware::from_fn(session::require_admin))
        .with_state(state)
}
