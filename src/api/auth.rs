//! Sign-up, login and logout endpoints.

use crate::{
    api::{
        AppState, JsonBody,
        session::{CurrentUser, clear_session_cookie, session_cookie},
    },
    core::{
        auth::{self, Credentials},
        user::UserInput,
    },
    errors::Result,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

/// Routes reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/registrarse", post(register))
        .route("/auth/login", post(login))
}

/// Routes that need a session.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/auth/logout", get(logout).post(logout))
}

async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<impl IntoResponse> {
    let user = auth::register(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "User registered", "id_usuario": user.id })),
    ))
}

async fn login(
    State(state): State<AppState>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> Result<impl IntoResponse> {
    let ttl_hours = state.settings.session_ttl_hours;
    let (user, session) = auth::login(&state.db, credentials, ttl_hours).await?;
    let cookie = session_cookie(&session.token, ttl_hours, state.settings.cookie_secure);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "mensaje": "Login successful", "usuario": user })),
    ))
}

async fn logout(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse> {
    auth::logout(&state.db, &current.token).await?;
    Ok((
        [(
            header::SET_COOKIE,
            clear_session_cookie(state.settings.cookie_secure),
        )],
        Json(json!({ "mensaje": "Session closed" })),
    ))
}
