//! Ingredient business logic - raw materials and their unit costs.
//!
//! An ingredient's `unit_cost` feeds every product whose recipe uses it, so an
//! update that changes the cost recalculates those products before committing.

use crate::{
    core::{costing, optional_amount, required_text},
    entities::{Ingredient, Recipe, ingredient, recipe},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Body of an ingredient create or update request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientInput {
    /// Ingredient name
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    /// Unit of measure
    #[serde(rename = "unidad")]
    pub unit: Option<String>,
    /// Quantity on hand
    #[serde(rename = "cantidad")]
    pub quantity: Option<f64>,
    /// Cost per unit of measure
    #[serde(rename = "costo_unitario")]
    pub unit_cost: Option<f64>,
}

/// Retrieves all ingredients ordered by id.
pub async fn list_ingredients(db: &DatabaseConnection) -> Result<Vec<ingredient::Model>> {
    Ingredient::find()
        .order_by_asc(ingredient::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific ingredient.
///
/// # Errors
/// Returns `IngredientNotFound` if no ingredient has this id.
pub async fn get_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i64,
) -> Result<ingredient::Model> {
    Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })
}

/// Creates an ingredient.
///
/// # Errors
/// Returns an error if the name or unit is blank, a quantity or cost is
/// negative or not finite, or the insert fails.
#[instrument(skip(db, input))]
pub async fn create_ingredient(
    db: &DatabaseConnection,
    input: IngredientInput,
) -> Result<ingredient::Model> {
    let name = required_text(input.name, "nombre")?;
    let unit = required_text(input.unit, "unidad")?;
    let quantity = optional_amount(input.quantity)?;
    let unit_cost = optional_amount(input.unit_cost)?;

    let ingredient = ingredient::ActiveModel {
        name: Set(name),
        unit: Set(unit),
        quantity: Set(quantity),
        unit_cost: Set(unit_cost),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created ingredient {} ({})", ingredient.id, ingredient.name);
    Ok(ingredient)
}

/// Replaces an ingredient's fields.
///
/// If the unit cost changes, every product with a recipe row for this
/// ingredient is recalculated in the same transaction.
///
/// # Errors
/// Returns an error if validation fails, the ingredient does not exist, or a
/// write or recalculation fails (in which case nothing is persisted).
#[instrument(skip(db, input))]
pub async fn update_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i64,
    input: IngredientInput,
) -> Result<ingredient::Model> {
    let name = required_text(input.name, "nombre")?;
    let unit = required_text(input.unit, "unidad")?;
    let quantity = optional_amount(input.quantity)?;
    let unit_cost = optional_amount(input.unit_cost)?;

    let txn = db.begin().await?;

    let existing = Ingredient::find_by_id(ingredient_id)
        .one(&txn)
        .await?
        .ok_or(Error::IngredientNotFound { id: ingredient_id })?;
    let cost_changed = existing.unit_cost != unit_cost;

    let mut ingredient: ingredient::ActiveModel = existing.into();
    ingredient.name = Set(name);
    ingredient.unit = Set(unit);
    ingredient.quantity = Set(quantity);
    ingredient.unit_cost = Set(unit_cost);
    let updated = ingredient.update(&txn).await?;

    if cost_changed {
        let product_ids: Vec<i64> = Recipe::find()
            .select_only()
            .column(recipe::Column::ProductId)
            .filter(recipe::Column::IngredientId.eq(ingredient_id))
            .into_tuple()
            .all(&txn)
            .await?;
        info!(
            "Unit cost changed, recalculating {} recipe rows",
            product_ids.len()
        );
        costing::recalculate_all(&txn, product_ids).await?;
    }

    txn.commit().await?;
    info!("Updated ingredient {}", ingredient_id);
    Ok(updated)
}

/// Deletes an ingredient that no recipe uses.
///
/// # Errors
/// Returns `IngredientNotFound` if it does not exist, or `Conflict` while
/// recipe rows still reference it.
#[instrument(skip(db))]
pub async fn delete_ingredient(db: &DatabaseConnection, ingredient_id: i64) -> Result<()> {
    let existing = get_ingredient(db, ingredient_id).await?;

    let uses = Recipe::find()
        .filter(recipe::Column::IngredientId.eq(ingredient_id))
        .count(db)
        .await?;
    if uses > 0 {
        return Err(Error::conflict(format!(
            "Ingredient {ingredient_id} is used by {uses} recipe rows and cannot be deleted"
        )));
    }

    existing.delete(db).await?;
    info!("Deleted ingredient {}", ingredient_id);
    Ok(())
}
