//! `/ingredientes` endpoints.

use crate::{
    api::{AppState, JsonBody},
    core::ingredient::{self, IngredientInput},
    entities::IngredientModel,
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
        .route("/ingredientes", get(list).post(create))
        .route("/ingredientes/", get(list).post(create))
        .route("/ingredientes/:id", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<IngredientModel>>> {
    Ok(Json(ingredient::list_ingredients(&state.db).await?))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientModel>> {
    Ok(Json(ingredient::get_ingredient(&state.db, id).await?))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<IngredientInput>,
) -> Result<impl IntoResponse> {
    let created = ingredient::create_ingredient(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Ingredient created", "id_ingrediente": created.id })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<IngredientInput>,
) -> Result<Json<Value>> {
    ingredient::update_ingredient(&state.db, id, input).await?;
    Ok(Json(json!({ "mensaje": "Ingredient updated" })))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    ingredient::delete_ingredient(&state.db, id).await?;
    Ok(Json(json!({ "mensaje": "Ingredient deleted" })))
}
