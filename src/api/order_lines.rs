//! `/detalle_pedidos` endpoints.

use crate::{
    api::{AppState, JsonBody},
    core::order_line::{self, NewOrderLine, OrderLineChanges, OrderLineView},
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
        .route("/detalle_pedidos", get(list).post(create))
        .route("/detalle_pedidos/", get(list).post(create))
        .route("/detalle_pedidos/:id", get(show).put(update).delete(remove))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<OrderLineView>>> {
    Ok(Json(order_line::list_order_lines(&state.db).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<OrderLineView>> {
    Ok(Json(order_line::get_order_line(&state.db, id).await?))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewOrderLine>,
) -> Result<impl IntoResponse> {
    let created = order_line::create_order_line(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Order line created", "id_detalle": created.id })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(changes): JsonBody<OrderLineChanges>,
) -> Result<Json<Value>> {
    order_line::update_order_line(&state.db, id, changes).await?;
    Ok(Json(json!({ "mensaje": "Order line updated" })))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    order_line::delete_order_line(&state.db, id).await?;
    Ok(Json(json!({ "mensaje": "Order line deleted" })))
}
