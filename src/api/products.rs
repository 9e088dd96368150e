//! `/productos` endpoints.

use crate::{
    api::{AppState, JsonBody},
    core::product::{self, ProductInput},
    entities::ProductModel,
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
        .route("/productos", get(list).post(create))
        .route("/productos/", get(list).post(create))
        .route("/productos/:id", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductModel>>> {
    Ok(Json(product::list_products(&state.db).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<ProductModel>> {
    Ok(Json(product::get_product(&state.db, id).await?))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<impl IntoResponse> {
    let created = product::create_product(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Product created", "id_producto": created.id })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<Json<Value>> {
    product::update_product(&state.db, id, input).await?;
    Ok(Json(json!({ "mensaje": "Product updated" })))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    product::delete_product(&state.db, id).await?;
    Ok(Json(json!({ "mensaje": "Product deleted" })))
}
