//! Blog APIs: paginated listing, single read, and admin-only CRUD.

use crate::error::{ApiError, AppError};
use crate::extract::{BodyParams, RouteParams};
use crate::handlers::{page_index_from, Page};
use crate::models::Blog;
use crate::reply::Reply;
use crate::session::{check_admin, CurrentUser};
use crate::state::AppState;
use crate::store::Store;
use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct BlogInput {
    pub name: String,
    pub summary: String,
    pub content: String,
}

fn validate(input: &BlogInput) -> Result<(), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::invalid("name", "name cannot be empty"));
    }
    if input.summary.trim().is_empty() {
        return Err(ApiError::invalid("summary", "summary cannot be empty"));
    }
    if input.content.trim().is_empty() {
        return Err(ApiError::invalid("content", "content cannot be empty"));
    }
    Ok(())
}

pub async fn api_blogs(
    State(state): State<AppState>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    let page_index = page_index_from(params.get("page"));
    let count = Store::find_number::<Blog>(&state.pool, "count(`id`)", None, vec![])
        .await?
        .unwrap_or(0);
    let page = Page::new(count, page_index);
    let blogs: Vec<Blog> = if count == 0 {
        Vec::new()
    } else {
        Store::find_all(
            &state.pool,
            None,
            vec![],
            Some("`created_at` desc"),
            Some(page.limit()),
        )
        .await?
    };
    Reply::json(&json!({ "page": page, "blogs": blogs }))
}

pub async fn api_get_blog(
    State(state): State<AppState>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    let id = params.require("id")?;
    let blog = Store::find::<Blog>(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("id", "blog not found"))?;
    Reply::json(&blog)
}

pub async fn api_create_blog(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    BodyParams(input): BodyParams<BlogInput>,
) -> Result<Reply, AppError> {
    let user = check_admin(&current)?;
    validate(&input)?;
    let mut blog = Blog::new(
        user,
        input.name.trim(),
        input.summary.trim(),
        input.content.trim(),
    );
    Store::save(&state.pool, &mut blog).await?;
    tracing::info!(blog_id = %blog.id, "blog created");
    Reply::json(&blog)
}

pub async fn api_update_blog(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
    BodyParams(input): BodyParams<BlogInput>,
) -> Result<Reply, AppError> {
    check_admin(&current)?;
    validate(&input)?;
    let id = params.require("id")?;
    let mut blog = Store::find::<Blog>(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("id", "blog not found"))?;
    blog.name = input.name.trim().to_string();
    blog.summary = input.summary.trim().to_string();
    blog.content = input.content.trim().to_string();
    Store::update(&state.pool, &blog).await?;
    Reply::json(&blog)
}

pub async fn api_delete_blog(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    check_admin(&current)?;
    let id = params.require("id")?;
    let blog = Store::find::<Blog>(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("id", "blog not found"))?;
    Store::remove(&state.pool, &blog).await?;
    tracing::info!(blog_id = %blog.id, "blog deleted");
    Reply::json(&json!({ "id": blog.id }))
}
