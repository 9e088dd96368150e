//! `/pedidos` endpoints.

use crate::{
    api::{AppState, JsonBody},
    core::order::{self, NewOrder, OrderChanges, OrderLineDetail, OrderSummary},
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize)]
struct StatusChange {
    estado: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pedidos", get(list).post(create))
        .route("/pedidos/", get(list).post(create))
        .route("/pedidos/:id", get(show).put(update).delete(remove))
        .route("/pedidos/:id/detalles", get(details))
        .route("/pedidos/:id/estado", put(change_status))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<OrderSummary>>> {
    Ok(Json(order::list_orders(&state.db).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<OrderSummary>> {
    Ok(Json(order::get_order(&state.db, id).await?))
}

async fn details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<OrderLineDetail>>> {
    Ok(Json(order::order_details(&state.db, id).await?))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<NewOrder>,
) -> Result<impl IntoResponse> {
    let created = order::create_order(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Order created", "id_pedido": created.id })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(changes): JsonBody<OrderChanges>,
) -> Result<Json<Value>> {
    order::update_order(&state.db, id, changes).await?;
    Ok(Json(json!({ "mensaje": "Order updated" })))
}

async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(change): JsonBody<StatusChange>,
) -> Result<Json<Value>> {
    let requested = change
        .estado
        .ok_or_else(|| Error::validation("Missing required field: estado"))?;
    let status = order::update_status(&state.db, id, &requested).await?;
    Ok(Json(json!({
        "mensaje": format!("Order status set to '{status}'"),
        "estado": status.as_str(),
    })))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    order::delete_order(&state.db, id).await?;
    Ok(Json(json!({ "mensaje": "Order deleted" })))
}
