//! Session cookies and authentication middleware. A token has the form
//! `userId-expiresAt-signature`, where the signature is a SHA-256 digest over
//! the user id, stored password digest, expiry, and the server secret.

use crate::error::{ApiError, AppError};
use crate::models::User;
use crate::reply::Reply;
use crate::schema::now_epoch;
use crate::state::AppState;
use crate::store::Store;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sha2::{Digest, Sha256};

pub const COOKIE_NAME: &str = "weblogsession";
pub const SESSION_MAX_AGE: i64 = 86400;

/// Digest stored in `users.passwd`: the user id and the client-submitted
/// password hash, so a leaked table row cannot be replayed for another user.
pub fn password_digest(user_id: &str, client_hash: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.as_bytes());
    hasher.update(b":");
    hasher.update(client_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn signature(user_id: &str, passwd: &str, expires: i64, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}-{}-{}-{}", user_id, passwd, expires, secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a session token for the user, expiring `max_age` seconds from `now`.
pub fn issue_token(user: &User, max_age: i64, secret: &str, now: i64) -> String {
    let expires = now + max_age;
    let sig = signature(&user.id, &user.passwd, expires, secret);
    format!("{}-{}-{}", user.id, expires, sig)
}

/// Parsed session token fields. Ids never contain `-`, so a token always
/// splits into exactly three parts.
pub struct TokenParts<'a> {
    pub user_id: &'a str,
    pub expires: i64,
    pub signature: &'a str,
}

pub fn parse_token(token: &str) -> Option<TokenParts<'_>> {
    let mut it = token.split('-');
    let user_id = it.next()?;
    let expires: i64 = it.next()?.parse().ok()?;
    let signature = it.next()?;
    if it.next().is_some() || user_id.is_empty() || signature.is_empty() {
        return None;
    }
    Some(TokenParts {
        user_id,
        expires,
        signature,
    })
}

/// Check expiry and recompute the signature against the stored user record.
pub fn validate(parts: &TokenParts<'_>, user: &User, secret: &str, now: i64) -> bool {
    if parts.expires < now {
        return false;
    }
    signature(&user.id, &user.passwd, parts.expires, secret) == parts.signature
}

/// Resolve a token to its user: parse, check expiry, load the record,
/// verify the signature, and mask the password digest.
pub async fn user_from_token(
    pool: &sqlx::MySqlPool,
    token: &str,
    secret: &str,
) -> Result<Option<User>, AppError> {
    let Some(parts) = parse_token(token) else {
        return Ok(None);
    };
    let now = now_epoch() as i64;
    if parts.expires < now {
        return Ok(None);
    }
    let Some(mut user) = Store::find::<User>(pool, parts.user_id).await? else {
        return Ok(None);
    };
    if !validate(&parts, &user, secret, now) {
        tracing::warn!(user_id = parts.user_id, "invalid session signature");
        return Ok(None);
    }
    user.mask_passwd();
    Ok(Some(user))
}

pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly",
        COOKIE_NAME, token, SESSION_MAX_AGE
    )
}

pub fn clear_cookie() -> String {
    format!("{}=deleted; Max-Age=0; Path=/; HttpOnly", COOKIE_NAME)
}

/// Pull our session token out of a Cookie header value.
pub fn token_from_cookie_header(header_value: &str) -> Option<String> {
    header_value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix(COOKIE_NAME).and_then(|rest| rest.strip_prefix('=')))
        .map(str::to_string)
}

/// The authenticated user for the current request, placed into request
/// extensions by [`session_middleware`].
#[derive(Clone, Debug, Default)]
pub struct CurrentUser(pub Option<User>);

pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header);
    let user = match token {
        Some(t) => match user_from_token(&state.pool, &t, &state.config.session_secret).await {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!(error = %e, "session lookup failed");
                None
            }
        },
        None => None,
    };
    if let Some(u) = &user {
        tracing::debug!(user = %u.email, "authenticated request");
    }
    request.extensions_mut().insert(CurrentUser(user));
    next.run(request).await
}

/// Gate for the manage console: non-admin visitors are redirected to the
/// sign-in page instead of receiving 403.
pub async fn require_admin(request: Request, next: Next) -> Response {
    let admin = request
        .extensions()
        .get::<CurrentUser>()
        .and_then(|c| c.0.as_ref())
        .map(|u| u.admin)
        .unwrap_or(false);
    if admin {
        next.run(request).await
    } else {
        Reply::Redirect("/signin".into()).into_response()
    }
}

/// Admin check for APIs: yields a structured permission error.
pub fn check_admin(current: &CurrentUser) -> Result<&User, ApiError> {
    match &current.0 {
        Some(u) if u.admin => Ok(u),
        _ => Err(ApiError::permission("admin privilege required")),
    }
}

/// Signed-in check for APIs (e.g. commenting).
pub fn check_signed_in(current: &CurrentUser) -> Result<&User, ApiError> {
    current
        .0
        .as_ref()
        .ok_or_else(|| ApiError::permission("please sign in first"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        let mut u = User::new("Alice", "alice@example.com", "stored-digest", "img");
        u.id = "000000000000001abcdef000".into();
        u
    }

    #[test]
    fn token_round_trip_verifies() {
        let u = user();
        let now = 1_700_000_000;
        let token = issue_token(&u, SESSION_MAX_AGE, "secret", now);
        let parts = parse_token(&token).unwrap();
        assert_eq!(parts.user_id, u.id);
        assert_eq!(parts.expires, now + SESSION_MAX_AGE);
        assert!(validate(&parts, &u, "secret", now));
    }

    #[test]
    fn expired_token_is_rejected() {
        let u = user();
        let now = 1_700_000_000;
        let token = issue_token(&u, SESSION_MAX_AGE, "secret", now);
        let parts = parse_token(&token).unwrap();
        assert!(!validate(&parts, &u, "secret", now + SESSION_MAX_AGE + 1));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let u = user();
        let now = 1_700_000_000;
        let token = issue_token(&u, SESSION_MAX_AGE, "secret", now);
        let parts = parse_token(&token).unwrap();
        assert!(!validate(&parts, &u, "other-secret", now));
    }

    #[test]
    fn malformed_tokens_do_not_parse() {
        assert!(parse_token("").is_none());
        assert!(parse_token("only-two").is_none());
        assert!(parse_token("a-b-c-d").is_none());
        assert!(parse_token("id-notanumber-sig").is_none());
    }

    #[test]
    fn cookie_header_parsing_finds_our_token() {
        let header = format!("theme=dark; {}=abc-123-def; lang=en", COOKIE_NAME);
        assert_eq!(token_from_cookie_header(&header).as_deref(), Some("abc-123-def"));
        assert!(token_from_cookie_header("theme=dark").is_none());
    }

    #[test]
    fn password_digest_is_user_scoped() {
        let a = password_digest("u1", "hash");
        let b = password_digest("u2", "hash");
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn admin_checks_yield_permission_errors() {
        let none = CurrentUser(None);
        assert!(check_admin(&none).is_err());
        assert!(check_signed_in(&none).is_err());
        let mut u = user();
        u.admin = true;
        let current = CurrentUser(Some(u));
        assert!(check_admin(&current).is_ok());
        assert!(check_signed_in(&current).is_ok());
    }
}
