//! Session cookie handling and the authentication middleware.

use crate::{
    api::AppState,
    core::auth,
    entities::UserModel,
    errors::{Error, Result},
};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sweetland_session";

/// The user behind the current request, placed in request extensions by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Authenticated account
    pub user: UserModel,
    /// Session token presented
    pub token: String,
}

/// Extracts the session token from the `Cookie` headers.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value that stores `token` for `ttl_hours`.
#[must_use]
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    let max_age = ttl_hours.saturating_mul(3600);
    let mut cookie =
        format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Rejects requests without a live session; otherwise records the user.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = session_token(request.headers()).ok_or(Error::Unauthorized)?;
    let Some(user) = auth::resolve_session(&state.db, &token).await? else {
        debug!("Rejected request with unknown or expired session");
        return Err(Error::Unauthorized);
    };

    request.extensions_mut().insert(CurrentUser { user, token });
    Ok(next.run(request).await)
}
