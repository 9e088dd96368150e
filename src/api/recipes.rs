//! `/recetas` endpoints, including bulk creation and per-product cost views.

use crate::{
    api::{AppState, JsonBody},
    core::recipe::{self, BulkRecipeInput, RecipeInput, RecipeSheet, RecipeView},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recetas", get(list).post(create))
        .route("/recetas/", get(list).post(create))
        .route("/recetas/multiple", post(create_bulk))
        .route("/recetas/:id", get(show).put(update).delete(remove))
        .route(
            "/recetas/producto/:product_id",
            get(product_sheet).delete(remove_for_product),
        )
        .route("/recetas/costo-produccion/:product_id", get(production_cost))
}

async fn list(State(state): State<AppState>) -> Result<Json<Vec<RecipeView>>> {
    Ok(Json(recipe::list_recipes(&state.db).await?))
}

async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<RecipeView>> {
    Ok(Json(recipe::get_recipe(&state.db, id).await?))
}

async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RecipeInput>,
) -> Result<impl IntoResponse> {
    let created = recipe::create_recipe(&state.db, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Recipe created", "id_receta": created.id })),
    ))
}

async fn create_bulk(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<BulkRecipeInput>,
) -> Result<impl IntoResponse> {
    let created = recipe::create_recipes_bulk(&state.db, input).await?;
    let ids: Vec<i64> = created.iter().map(|row| row.id).collect();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "mensaje": format!("{} recipe rows created", ids.len()),
            "ids_receta": ids,
        })),
    ))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<RecipeInput>,
) -> Result<Json<Value>> {
    recipe::update_recipe(&state.db, id, input).await?;
    Ok(Json(json!({ "mensaje": "Recipe updated" })))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Value>> {
    recipe::delete_recipe(&state.db, id).await?;
    Ok(Json(json!({ "mensaje": "Recipe deleted" })))
}

async fn product_sheet(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<RecipeSheet>> {
    Ok(Json(recipe::product_recipe_sheet(&state.db, product_id).await?))
}

async fn remove_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<Value>> {
    let removed = recipe::delete_recipes_for_product(&state.db, product_id).await?;
    Ok(Json(json!({
        "mensaje": format!("{removed} recipe rows deleted"),
        "eliminadas": removed,
    })))
}

async fn production_cost(
    State(state): State<AppState>,
    Path(product_id): Path<i64>,
) -> Result<Json<Value>> {
    let total = recipe::current_production_cost(&state.db, product_id).await?;
    Ok(Json(json!({
        "id_producto": product_id,
        "costo_produccion": total,
    })))
}
