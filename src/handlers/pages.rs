//! Server-rendered pages: the public blog and the manage console.

use crate::error::AppError;
use crate::extract::RouteParams;
use crate::handlers::{page_index_from, Page};
use crate::models::{Blog, Comment, User};
use crate::render;
use crate::reply::Reply;
use crate::session::{clear_cookie, CurrentUser};
use crate::sql::SqlValue;
use crate::state::AppState;
use crate::store::Store;
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Extension,
};
use tera::Context;

pub async fn index(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
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
    let mut ctx = Context::new();
    ctx.insert("page", &page);
    ctx.insert("blogs", &blogs);
    render::page(&state.templates, "blogs.html", ctx, current.0.as_ref())
}

pub async fn blog_detail(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    let id = params.require("id")?;
    let blog = Store::find::<Blog>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("blog {}", id)))?;
    let comments: Vec<Comment> = Store::find_all(
        &state.pool,
        Some("`blog_id` = ?"),
        vec![SqlValue::from(id)],
        Some("`created_at` desc"),
        None,
    )
    .await?;
    let mut ctx = Context::new();
    ctx.insert("blog", &blog);
    ctx.insert("comments", &comments);
    render::page(&state.templates, "blog.html", ctx, current.0.as_ref())
}

pub async fn signin(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Reply, AppError> {
    render::page(
        &state.templates,
        "signin.html",
        Context::new(),
        current.0.as_ref(),
    )
}

pub async fn register(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Reply, AppError> {
    render::page(
        &state.templates,
        "register.html",
        Context::new(),
        current.0.as_ref(),
    )
}

/// Clear the session cookie and send the visitor back where they came from.
pub async fn signout(headers: HeaderMap) -> Response {
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/");
    let mut resp = Reply::Redirect(referer.to_string()).into_response();
    if let Ok(value) = HeaderValue::from_str(&clear_cookie()) {
        resp.headers_mut().append(header::SET_COOKIE, value);
    }
    tracing::info!("user signed out");
    resp
}

pub async fn manage_index() -> Reply {
    Reply::from("redirect:/manage/comments".to_string())
}

pub async fn manage_blogs(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
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
    let mut ctx = Context::new();
    ctx.insert("page", &page);
    ctx.insert("blogs", &blogs);
    render::page(&state.templates, "manage_blogs.html", ctx, current.0.as_ref())
}

pub async fn manage_blog_create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Reply, AppError> {
    let mut ctx = Context::new();
    ctx.insert("id", "");
    ctx.insert("action", "/api/blogs");
    render::page(
        &state.templates,
        "manage_blog_edit.html",
        ctx,
        current.0.as_ref(),
    )
}

pub async fn manage_blog_edit(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    let id = params.require("id")?;
    let blog = Store::find::<Blog>(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("blog {}", id)))?;
    let mut ctx = Context::new();
    ctx.insert("id", &blog.id);
    ctx.insert("blog", &blog);
    ctx.insert("action", &format!("/api/blogs/{}", blog.id));
    render::page(
        &state.templates,
        "manage_blog_edit.html",
        ctx,
        current.0.as_ref(),
    )
}

pub async fn manage_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    params: RouteParams,
) -> Result<Reply, AppError> {
    let page_index = page_index_from(params.get("page"));
    let count = Store::find_number::<User>(&state.pool, "count(`id`)", None, vec![])
        .await?
        .unwrap_or(0);
    let page = Page::new(count, page_index);
    let mut users: Vec<User> = if count == 0 {
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
    for u in &mut users {
        u.mask_passwd();
    }
    let mut ctx = Context::new();
    ctx.insert("page", &page);
    ctx.insert("users", &users);
    render::page(&state.templates, "manage_users.html", ctx, current.0.as_ref())
}

pub async fn manage_comments(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
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
    let mut ctx = Context::new();
    ctx.insert("page", &page);
    ctx.insert("comments", &comments);
    render::page(
        &state.templates,
        "manage_comments.html",
        ctx,
        current.0.as_ref(),
    )
}
