//! Production-cost recalculation engine.
//!
//! A product's `production_cost` is derived from its recipe rows:
//!
//! ```text
//! production_cost = Σ quantity_needed × ingredient.unit_cost
//! ```
//!
//! where an ingredient without a unit cost contributes 0. The value is not
//! kept consistent by the database; every recipe mutation in
//! [`crate::core::recipe`] calls [`recalculate`] on the same transaction as the
//! write, before committing, so a failed recalculation rolls the mutation back.
//!
//! The engine keeps no state between calls and always reads current rows.

use crate::{
    entities::{Ingredient, Product, Recipe, ingredient, product, recipe},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*, sea_query::Expr};
use std::collections::BTreeSet;
use tracing::{debug, error, instrument};

/// A recipe row paired with its ingredient, if the ingredient row exists.
pub type CostLine = (recipe::Model, Option<ingredient::Model>);

/// Contribution of a single recipe row to the production cost.
#[must_use]
pub fn line_cost(quantity_needed: f64, unit_cost: Option<f64>) -> f64 {
    quantity_needed * unit_cost.unwrap_or(0.0)
}

/// Sums the contribution of each line; an empty slice costs exactly 0.
#[must_use]
pub fn total_cost(lines: &[CostLine]) -> f64 {
    lines.iter().fold(0.0, |acc, (row, ingredient)| {
        acc + line_cost(
            row.quantity_needed,
            ingredient.as_ref().and_then(|i| i.unit_cost),
        )
    })
}

/// Loads the recipe rows of a product together with their ingredients, by row id.
pub async fn cost_lines<C>(db: &C, product_id: i64) -> Result<Vec<CostLine>>
where
    C: ConnectionTrait,
{
    Recipe::find()
        .filter(recipe::Column::ProductId.eq(product_id))
        .order_by_asc(recipe::Column::Id)
        .find_also_related(Ingredient)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Computes the production cost from current data without writing anything.
///
/// A product with no recipe rows costs 0. This does not check that the
/// product itself exists.
#[instrument(skip(db))]
pub async fn production_cost<C>(db: &C, product_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let lines = cost_lines(db, product_id).await?;
    Ok(total_cost(&lines))
}

async fn persist_cost<C>(db: &C, product_id: i64) -> Result<f64>
where
    C: ConnectionTrait,
{
    let total = production_cost(db, product_id).await?;

    let result = Product::update_many()
        .col_expr(product::Column::ProductionCost, Expr::value(total))
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::ProductNotFound { id: product_id });
    }
    Ok(total)
}

/// Recomputes a product's production cost and stores it.
///
/// Runs on whatever connection it is given; recipe mutations pass their open
/// transaction so the write and the recalculation commit or roll back together.
///
/// # Errors
/// Returns `ProductNotFound` if the product row does not exist, or a database
/// error if reading the recipe or writing the product fails.
#[instrument(skip(db))]
pub async fn recalculate<C>(db: &C, product_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let total = persist_cost(db, product_id)
        .await
        .inspect_err(|e| error!("Production cost recalculation failed: {e}"))?;
    debug!(total, "Production cost recalculated");
    Ok(())
}

/// Recalculates each distinct product once, in ascending id order.
pub async fn recalculate_all<C, I>(db: &C, product_ids: I) -> Result<()>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let ids: BTreeSet<i64> = product_ids.into_iter().collect();
    for product_id in ids {
        recalculate(db, product_id).await?;
    }
    Ok(())
}
