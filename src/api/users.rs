//! `/usuarios` endpoints.

use crate::{
    api::{AppState, JsonBody},
    core::user::{self, UserInput},
    entities::UserModel,
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/usuarios", get(list).post(create))
        .route("/usuarios/", get(list).post(create))
        .route("/usuarios/:id", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserModel>>> {
    Ok(Json(user::list_users(&state.db).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<UserModel>> {
    Ok(Json(user::get_user(&state.db, id).await?))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<impl IntoResponse> {
    let created = user::create_user(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "User created", "id_usuario": created.id })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<Json<Value>> {
    user::update_user(&state.db, id, input).await?;
    Ok(Json(json!({ "mensaje": "User updated" })))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    user::delete_user(&state.db, id).await?;
    Ok(Json(json!({ "mensaje": "User deleted" })))
}
