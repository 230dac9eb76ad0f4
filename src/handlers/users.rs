//! User APIs: listing, registration, and authentication.

use crate::error::{ApiError, AppError};
use crate::extract::{BodyParams, RouteParams};
use crate::handlers::{page_index_from, Page};
use crate::models::User;
use crate::reply::Reply;
use crate::schema::{next_id, now_epoch};
use crate::session::{issue_token, password_digest, session_cookie, SESSION_MAX_AGE};
use crate::state::AppState;
use crate::store::Store;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9.\-_]+@[a-z0-9\-_]+(\.[a-z0-9\-_]+){1,4}$").unwrap()
});
/// Clients submit the password as a lowercase hex SHA-256 digest.
static RE_HASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-f]{64}$").unwrap());

#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub passwd: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthInput {
    pub email: String,
    pub passwd: String,
}

fn avatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!("https://www.gravatar.com/avatar/{:x}?d=mm&s=120", digest)
}

/// JSON user payload with the session cookie attached.
fn signed_in_response(state: &AppState, mut user: User) -> Result<Response, AppError> {
    let token = issue_token(
        &user,
        SESSION_MAX_AGE,
        &state.config.session_secret,
        now_epoch() as i64,
    );
    user.mask_passwd();
    let mut resp = Reply::json(&user)?.into_response();
    let value = HeaderValue::from_str(&session_cookie(&token))
        .map_err(|e| AppError::Config(format!("session cookie: {}", e)))?;
    resp.headers_mut().append(header::SET_COOKIE, value);
    Ok(resp)
}

pub async fn api_users(
    State(state): State<AppState>,
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
    Reply::json(&json!({ "page": page, "users": users }))
}

pub async fn api_register(
    State(state): State<AppState>,
    BodyParams(input): BodyParams<RegisterInput>,
) -> Result<Response, AppError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid("name", "name cannot be empty").into());
    }
    if !RE_EMAIL.is_match(&input.email) {
        return Err(ApiError::invalid("email", "invalid email address").into());
    }
    if !RE_HASH.is_match(&input.passwd) {
        return Err(ApiError::invalid("passwd", "invalid password hash").into());
    }
    // Checked here for the structured error; the unique index on email is
    // what actually closes the concurrent-registration race.
    let existing: Vec<User> = Store::find_all(
        &state.pool,
        Some("`email` = ?"),
        vec![input.email.as_str().into()],
        None,
        None,
    )
    .await?;
    if !existing.is_empty() {
        return Err(ApiError::register_failed("email", "Email is already in use.").into());
    }
    let uid = next_id();
    let mut user = User {
        passwd: password_digest(&uid, &input.passwd),
        id: uid,
        email: input.email.clone(),
        admin: false,
        name: name.to_string(),
        image: avatar_url(&input.email),
        created_at: 0.0,
    };
    Store::save(&state.pool, &mut user).await?;
    tracing::info!(email = %user.email, "user registered");
    signed_in_response(&state, user)
}

pub async fn api_authenticate(
    State(state): State<AppState>,
    BodyParams(input): BodyParams<AuthInput>,
) -> Result<Response, AppError> {
    if input.email.is_empty() {
        return Err(ApiError::invalid("email", "invalid email").into());
    }
    if input.passwd.is_empty() {
        return Err(ApiError::invalid("passwd", "invalid password").into());
    }
    let users: Vec<User> = Store::find_all(
        &state.pool,
        Some("`email` = ?"),
        vec![input.email.as_str().into()],
        None,
        None,
    )
    .await?;
    let Some(user) = users.into_iter().next() else {
        return Err(ApiError::invalid("email", "email not found").into());
    };
    if password_digest(&user.id, &input.passwd) != user.passwd {
        tracing::warn!(email = %user.email, "failed sign-in attempt");
        return Err(ApiError::invalid("passwd", "invalid password").into());
    }
    tracing::info!(email = %user.email, "user signed in");
    signed_in_response(&state, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, DbConfig};
    use crate::models::PASSWD_MASK;
    use crate::session::COOKIE_NAME;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let opts = sqlx::mysql::MySqlConnectOptions::new()
            .host("127.0.0.1")
            .port(3306)
            .username("weblog")
            .database("weblog");
        AppState {
            pool: sqlx::mysql::MySqlPoolOptions::new().connect_lazy_with(opts),
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
    async fn sign_in_response_sets_cookie_and_masks_passwd() {
        let mut user = User::new("Alice", "alice@example.com", "stored-digest", "img");
        user.id = next_id();
        let resp = signed_in_response(&test_state(), user).unwrap();

        let cookie = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with(COOKIE_NAME));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.contains("HttpOnly"));

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["passwd"], PASSWD_MASK);
        assert_eq!(v["email"], "alice@example.com");
    }

    #[test]
    fn email_validation_accepts_plausible_addresses() {
        assert!(RE_EMAIL.is_match("alice@example.com"));
        assert!(RE_EMAIL.is_match("a.b-c_d@mail.example.co"));
        assert!(!RE_EMAIL.is_match("not-an-email"));
        assert!(!RE_EMAIL.is_match("UPPER@example.com"));
        assert!(!RE_EMAIL.is_match("alice@"));
    }

    #[test]
    fn password_hash_must_be_hex_digest() {
        assert!(RE_HASH.is_match(&"a".repeat(64)));
        assert!(!RE_HASH.is_match(&"a".repeat(40)));
        assert!(!RE_HASH.is_match(&"G".repeat(64)));
    }

    #[test]
    fn avatar_url_is_stable_per_email() {
        let a = avatar_url("Alice@Example.com ");
        let b = avatar_url("alice@example.com");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
    }
}
