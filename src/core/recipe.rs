//! Recipe business logic - recipe rows and the production-cost cascade.
//!
//! Every mutation here opens a database transaction, performs its write,
//! recalculates each affected product on that same transaction, and only then
//! commits. If any step fails the transaction is dropped and rolled back, so a
//! product's stored cost never disagrees with its committed recipe rows.

use crate::{
    core::{costing, non_negative, product::require_product},
    entities::{Ingredient, Product, Recipe, ingredient, recipe},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Body of a create or update request for a single recipe row.
///
/// On create every field is required; on update missing fields keep their
/// current values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeInput {
    /// Product the row belongs to
    #[serde(rename = "id_producto")]
    pub product_id: Option<i64>,
    /// Ingredient required
    #[serde(rename = "id_ingrediente")]
    pub ingredient_id: Option<i64>,
    /// Quantity of the ingredient per product unit
    #[serde(rename = "cantidad_necesaria")]
    pub quantity_needed: Option<f64>,
}

/// One ingredient line of a bulk create.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeItem {
    /// Ingredient required
    #[serde(rename = "id_ingrediente")]
    pub ingredient_id: Option<i64>,
    /// Quantity of the ingredient per product unit
    #[serde(rename = "cantidad_necesaria")]
    pub quantity_needed: Option<f64>,
}

/// Body of a bulk create: several ingredients for one product.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkRecipeInput {
    /// Product all rows belong to
    #[serde(rename = "id_producto")]
    pub product_id: Option<i64>,
    /// Ingredient lines
    #[serde(rename = "ingredientes", default)]
    pub items: Vec<RecipeItem>,
}

/// A recipe row with the names of its product and ingredient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeView {
    /// Recipe row id
    pub id_receta: i64,
    /// Product id
    pub id_producto: i64,
    /// Ingredient id
    pub id_ingrediente: i64,
    /// Quantity per product unit
    pub cantidad_necesaria: f64,
    /// Product name
    pub producto: Option<String>,
    /// Ingredient name
    pub ingrediente: Option<String>,
}

/// One line of a product's cost sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSheetLine {
    /// Recipe row id
    pub id_receta: i64,
    /// Ingredient id
    pub id_ingrediente: i64,
    /// Ingredient name
    pub ingrediente: Option<String>,
    /// Ingredient unit of measure
    pub unidad: Option<String>,
    /// Quantity per product unit
    pub cantidad_necesaria: f64,
    /// Ingredient unit cost, 0 when unknown
    pub costo_unitario: f64,
    /// Contribution of this line to the production cost
    pub costo_ingrediente: f64,
}

/// Aggregate costs and margins of a product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    /// Sum of all line costs
    pub costo_total_produccion: f64,
    /// Product sale price
    pub precio_venta: f64,
    /// Price minus production cost
    pub margen_bruto: f64,
    /// Margin as a percentage of price, 0 when the price is 0
    pub margen_porcentaje: f64,
}

/// Per-ingredient cost breakdown of a product, computed on the fly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSheet {
    /// Product id
    pub id_producto: i64,
    /// Product name
    pub producto: String,
    /// One entry per recipe row
    pub recetas: Vec<RecipeSheetLine>,
    /// Totals and margins
    pub costos: CostSummary,
}

/// Builds the margin figures for a given price and cost.
#[must_use]
pub fn cost_summary(price: f64, production_cost: f64) -> CostSummary {
    let margin = price - production_cost;
    let margin_percent = if price > 0.0 {
        margin / price * 100.0
    } else {
        0.0
    };
    CostSummary {
        costo_total_produccion: production_cost,
        precio_venta: price,
        margen_bruto: margin,
        margen_porcentaje: margin_percent,
    }
}

async fn require_ingredient<C>(db: &C, ingredient_id: i64) -> Result<ingredient::Model>
where
    C: ConnectionTrait,
{
    Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })
}

fn required_id(value: Option<i64>, field: &str) -> Result<i64> {
    value.ok_or_else(|| Error::validation(format!("Missing required field: {field}")))
}

fn required_quantity(value: Option<f64>) -> Result<f64> {
    let quantity = value
        .ok_or_else(|| Error::validation("Missing required field: cantidad_necesaria"))?;
    non_negative(quantity)
}

fn to_view(
    row: recipe::Model,
    products: &HashMap<i64, String>,
    ingredients: &HashMap<i64, String>,
) -> RecipeView {
    RecipeView {
        id_receta: row.id,
        id_producto: row.product_id,
        id_ingrediente: row.ingredient_id,
        cantidad_necesaria: row.quantity_needed,
        producto: products.get(&row.product_id).cloned(),
        ingrediente: ingredients.get(&row.ingredient_id).cloned(),
    }
}

/// Lists every recipe row with product and ingredient names, ordered by id.
pub async fn list_recipes(db: &DatabaseConnection) -> Result<Vec<RecipeView>> {
    let rows = Recipe::find()
        .order_by_asc(recipe::Column::Id)
        .all(db)
        .await?;
    let products: HashMap<i64, String> = Product::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    let ingredients: HashMap<i64, String> = Ingredient::find()
        .all(db)
        .await?
        .into_iter()
        .map(|i| (i.id, i.name))
        .collect();

    Ok(rows
        .into_iter()
        .map(|row| to_view(row, &products, &ingredients))
        .collect())
}

/// Retrieves one recipe row with product and ingredient names.
///
/// # Errors
/// Returns `RecipeNotFound` if the row does not exist.
pub async fn get_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<RecipeView> {
    let row = Recipe::find_by_id(recipe_id)
        .one(db)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })?;
    let product = row.find_related(Product).one(db).await?;
    let ingredient = row.find_related(Ingredient).one(db).await?;

    Ok(RecipeView {
        id_receta: row.id,
        id_producto: row.product_id,
        id_ingrediente: row.ingredient_id,
        cantidad_necesaria: row.quantity_needed,
        producto: product.map(|p| p.name),
        ingrediente: ingredient.map(|i| i.name),
    })
}

/// Creates a recipe row and recalculates its product.
///
/// # Errors
/// Returns an error if:
/// - A field is missing or the quantity is negative or not finite
/// - The product or ingredient does not exist
/// - The insert or the recalculation fails (nothing is persisted)
#[instrument(skip(db))]
pub async fn create_recipe(db: &DatabaseConnection, input: RecipeInput) -> Result<recipe::Model> {
    let product_id = required_id(input.product_id, "id_producto")?;
    let ingredient_id = required_id(input.ingredient_id, "id_ingrediente")?;
    let quantity_needed = required_quantity(input.quantity_needed)?;

    let txn = db.begin().await?;

    require_product(&txn, product_id).await?;
    require_ingredient(&txn, ingredient_id).await?;

    let row = recipe::ActiveModel {
        product_id: Set(product_id),
        ingredient_id: Set(ingredient_id),
        quantity_needed: Set(quantity_needed),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    costing::recalculate(&txn, product_id).await?;
    txn.commit().await?;

    info!("Created recipe row {} for product {}", row.id, product_id);
    Ok(row)
}

/// Creates several recipe rows for one product, all or nothing.
///
/// Every line is validated, and every ingredient checked, before the first
/// insert. The product is recalculated once after all rows are written.
///
/// # Errors
/// Returns an error if the batch is empty, any line is invalid, the product or
/// any ingredient does not exist, or any write fails. In every case no row is
/// persisted and the product's cost is unchanged.
#[instrument(skip(db, input), fields(product_id = ?input.product_id, items = input.items.len()))]
pub async fn create_recipes_bulk(
    db: &DatabaseConnection,
    input: BulkRecipeInput,
) -> Result<Vec<recipe::Model>> {
    let product_id = required_id(input.product_id, "id_producto")?;
    if input.items.is_empty() {
        return Err(Error::validation("At least one ingredient is required"));
    }
    let items = input
        .items
        .into_iter()
        .map(|item| -> Result<(i64, f64)> {
            Ok((
                required_id(item.ingredient_id, "id_ingrediente")?,
                required_quantity(item.quantity_needed)?,
            ))
        })
        .collect::<Result<Vec<(i64, f64)>>>()?;

    let txn = db.begin().await?;

    require_product(&txn, product_id).await?;
    for (ingredient_id, _) in &items {
        require_ingredient(&txn, *ingredient_id).await?;
    }

    let mut rows = Vec::with_capacity(items.len());
    for (ingredient_id, quantity_needed) in items {
        let row = recipe::ActiveModel {
            product_id: Set(product_id),
            ingredient_id: Set(ingredient_id),
            quantity_needed: Set(quantity_needed),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        rows.push(row);
    }

    costing::recalculate(&txn, product_id).await?;
    txn.commit().await?;

    info!("Created {} recipe rows for product {}", rows.len(), product_id);
    Ok(rows)
}

/// Updates a recipe row and recalculates the affected products.
///
/// When the row moves to another product both the previous and the new
/// product are recalculated.
///
/// # Errors
/// Returns an error if the row, the target product or the target ingredient
/// does not exist, the quantity is invalid, or any write fails.
#[instrument(skip(db))]
pub async fn update_recipe(
    db: &DatabaseConnection,
    recipe_id: i64,
    input: RecipeInput,
) -> Result<recipe::Model> {
    let quantity_needed = input
        .quantity_needed
        .map(non_negative)
        .transpose()?;

    let txn = db.begin().await?;

    let existing = Recipe::find_by_id(recipe_id)
        .one(&txn)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })?;
    let previous_product_id = existing.product_id;

    let product_id = input.product_id.unwrap_or(existing.product_id);
    let ingredient_id = input.ingredient_id.unwrap_or(existing.ingredient_id);
    require_product(&txn, product_id).await?;
    require_ingredient(&txn, ingredient_id).await?;

    let mut row: recipe::ActiveModel = existing.into();
    row.product_id = Set(product_id);
    row.ingredient_id = Set(ingredient_id);
    if let Some(quantity_needed) = quantity_needed {
        row.quantity_needed = Set(quantity_needed);
    }
    let updated = row.update(&txn).await?;

    costing::recalculate_all(&txn, [previous_product_id, product_id]).await?;
    txn.commit().await?;

    info!("Updated recipe row {}", recipe_id);
    Ok(updated)
}

/// Deletes a recipe row and recalculates the product it belonged to.
///
/// # Errors
/// Returns `RecipeNotFound` if the row does not exist, or a database error.
#[instrument(skip(db))]
pub async fn delete_recipe(db: &DatabaseConnection, recipe_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = Recipe::find_by_id(recipe_id)
        .one(&txn)
        .await?
        .ok_or(Error::RecipeNotFound { id: recipe_id })?;
    let product_id = existing.product_id;
    existing.delete(&txn).await?;

    costing::recalculate(&txn, product_id).await?;
    txn.commit().await?;

    info!("Deleted recipe row {} of product {}", recipe_id, product_id);
    Ok(())
}

/// Deletes every recipe row of a product; its cost becomes 0.
///
/// Returns the number of rows removed.
#[instrument(skip(db))]
pub async fn delete_recipes_for_product(db: &DatabaseConnection, product_id: i64) -> Result<u64> {
    let txn = db.begin().await?;

    require_product(&txn, product_id).await?;
    let result = Recipe::delete_many()
        .filter(recipe::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;

    costing::recalculate(&txn, product_id).await?;
    txn.commit().await?;

    info!(
        "Deleted {} recipe rows of product {}",
        result.rows_affected, product_id
    );
    Ok(result.rows_affected)
}

/// Builds a product's cost sheet from current data without persisting anything.
pub async fn product_recipe_sheet(db: &DatabaseConnection, product_id: i64) -> Result<RecipeSheet> {
    let product = require_product(db, product_id).await?;
    let lines = costing::cost_lines(db, product_id).await?;
    let total = costing::total_cost(&lines);

    let recetas = lines
        .into_iter()
        .map(|(row, ingredient)| {
            let unit_cost = ingredient.as_ref().and_then(|i| i.unit_cost);
            RecipeSheetLine {
                id_receta: row.id,
                id_ingrediente: row.ingredient_id,
                costo_unitario: unit_cost.unwrap_or(0.0),
                costo_ingrediente: costing::line_cost(row.quantity_needed, unit_cost),
                cantidad_necesaria: row.quantity_needed,
                unidad: ingredient.as_ref().map(|i| i.unit.clone()),
                ingrediente: ingredient.map(|i| i.name),
            }
        })
        .collect();

    Ok(RecipeSheet {
        id_producto: product.id,
        producto: product.name,
        recetas,
        costos: cost_summary(product.price, total),
    })
}

/// Computes a product's production cost on the fly, without writing it.
///
/// # Errors
/// Returns `ProductNotFound` if the product does not exist.
pub async fn current_production_cost(db: &DatabaseConnection, product_id: i64) -> Result<f64> {
    require_product(db, product_id).await?;
    costing::production_cost(db, product_id).await
}
