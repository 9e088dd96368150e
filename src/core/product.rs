//! Product business logic - Handles the bakery's catalogue.
//!
//! Products carry a `production_cost` that is owned by [`crate::core::costing`].
//! [`ProductInput`] has no field for it, so a client can never set the cost
//! directly; a new product starts at 0 and changes only through recipe writes.

use crate::{
    core::{optional_text, required_amount, required_text},
    entities::{OrderLine, Product, Recipe, order_line, product, recipe},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Body of a product create or update request.
///
/// Any `costo_produccion` key in the request body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    /// Product name
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    /// Catalogue category
    #[serde(rename = "categoria")]
    pub category: Option<String>,
    /// Free-form description
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    /// Sale price
    #[serde(rename = "precio")]
    pub price: Option<f64>,
    /// Image reference
    #[serde(rename = "imagen")]
    pub image: Option<String>,
}

struct ValidProduct {
    name: String,
    category: String,
    description: Option<String>,
    price: f64,
    image: Option<String>,
}

impl ProductInput {
    fn validate(self) -> Result<ValidProduct> {
        Ok(ValidProduct {
            name: required_text(self.name, "nombre")?,
            category: required_text(self.category, "categoria")?,
            description: optional_text(self.description),
            price: required_amount(self.price, "precio")?,
            image: optional_text(self.image),
        })
    }
}

/// Loads a product or fails with `ProductNotFound`.
///
/// Generic over the connection so recipe mutations can check existence inside
/// their transaction.
pub async fn require_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Retrieves all products ordered alphabetically by name.
///
/// # Errors
/// Returns an error if the database query fails.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a specific product by its unique ID.
///
/// # Errors
/// Returns `ProductNotFound` if no product has this id.
pub async fn get_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    require_product(db, product_id).await
}

/// Creates a new product with a production cost of 0.
///
/// # Errors
/// Returns an error if:
/// - The name or category is missing or blank
/// - The price is missing, negative or not finite
/// - The database insert operation fails
#[instrument(skip(db, input))]
pub async fn create_product(db: &DatabaseConnection, input: ProductInput) -> Result<product::Model> {
    let valid = input.validate()?;

    let product = product::ActiveModel {
        name: Set(valid.name),
        category: Set(valid.category),
        description: Set(valid.description),
        price: Set(valid.price),
        image: Set(valid.image),
        production_cost: Set(0.0),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created product {} ({})", product.id, product.name);
    Ok(product)
}

/// Replaces a product's descriptive fields and price.
///
/// The stored production cost is left untouched.
///
/// # Errors
/// Returns an error if validation fails, the product does not exist, or the
/// update fails.
#[instrument(skip(db, input))]
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    let valid = input.validate()?;
    let existing = require_product(db, product_id).await?;

    let mut product: product::ActiveModel = existing.into();
    product.name = Set(valid.name);
    product.category = Set(valid.category);
    product.description = Set(valid.description);
    product.price = Set(valid.price);
    product.image = Set(valid.image);

    let updated = product.update(db).await?;
    info!("Updated product {}", product_id);
    Ok(updated)
}

/// Deletes a product together with its recipe rows.
///
/// # Errors
/// Returns `ProductNotFound` if the product does not exist, or `Conflict`
/// while any order line still references it.
#[instrument(skip(db))]
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = require_product(&txn, product_id).await?;
    let ordered = OrderLine::find()
        .filter(order_line::Column::ProductId.eq(product_id))
        .count(&txn)
        .await?;
    if ordered > 0 {
        return Err(Error::conflict(format!(
            "Product {product_id} appears on {ordered} order lines and cannot be deleted"
        )));
    }

    Recipe::delete_many()
        .filter(recipe::Column::ProductId.eq(product_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted product {}", product_id);
    Ok(())
}
