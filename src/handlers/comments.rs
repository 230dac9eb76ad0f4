//! Comment APIs: listing, creation by signed-in users, admin deletion.

use crate::error::{ApiError, AppError};
use crate::extract::{BodyParams, RouteParams};
use crate::handlers::{page_index_from, Page};
use crate::models::{Blog, Comment};
use crate::reply::Reply;
use crate::session::{check_admin, check_signed_in, CurrentUser};
use crate::state::AppState;
use crate::store::Store;
use axum::{extract::State, Extension};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub content: String,
}

pub async fn api_comments(
    State(state): State<AppState>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    let page_index = page_index_from(params.get("page"));
    let count = Store::find_number::<Comment>(&state.pool, "count(`id`)", None, vec![])
        .await?
        .unwrap_or(0);
    let page = Page::new(count, page_index);
    let comments: Vec<Comment> = if count == 0 {
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
    Reply::json(&json!({ "page": page, "comments": comments }))
}

pub async fn api_create_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
    BodyParams(input): BodyParams<CommentInput>,
) -> Result<Reply, AppError> {
    let user = check_signed_in(&current)?;
    let content = input.content.trim();
    if content.is_empty() {
        return Err(ApiError::invalid("content", "content cannot be empty").into());
    }
    let id = params.require("id")?;
    let blog = Store::find::<Blog>(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("id", "blog not found"))?;
    let mut comment = Comment::new(&blog.id, user, content);
    Store::save(&state.pool, &mut comment).await?;
    Reply::json(&comment)
}

pub async fn api_delete_comment(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    check_admin(&current)?;
    let id = params.require("id")?;
    let comment = Store::find::<Comment>(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("id", "comment not found"))?;
    Store::remove(&state.pool, &comment).await?;
    tracing::info!(comment_id = %comment.id, "comment deleted");
    Reply::json(&json!({ "id": comment.id }))
}
