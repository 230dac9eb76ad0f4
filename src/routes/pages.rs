//! Public page routes.

use crate::handlers::pages;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn page_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/blog/:id", get(pages::blog_detail))
        .route("/signin", get(pages::signin))
        .route("/signout", get(pages::signout))
        .route("/register", get(pages::register))
        .with_state(state)
}
