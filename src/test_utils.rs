//! Shared test utilities for the Sweetland backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        ingredient::{self, IngredientInput},
        order::{self, NewOrder},
        product::{self, ProductInput},
        user::{self, UserInput},
    },
    entities::{self, Product},
    errors::Result,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Installs a test-writer tracing subscriber; repeated calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
}

/// Creates a test product with sensible defaults.
///
/// # Defaults
/// * category: "tortas"
/// * price: 10.0
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::product::Model> {
    create_custom_product(db, name, 10.0).await
}

/// Creates a test product with a specific price.
pub async fn create_custom_product(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<entities::product::Model> {
    product::create_product(
        db,
        ProductInput {
            name: Some(name.to_string()),
            category: Some("tortas".to_string()),
            price: Some(price),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test ingredient measured in kg with the given unit cost.
pub async fn create_test_ingredient(
    db: &DatabaseConnection,
    name: &str,
    unit_cost: Option<f64>,
) -> Result<entities::ingredient::Model> {
    ingredient::create_ingredient(
        db,
        IngredientInput {
            name: Some(name.to_string()),
            unit: Some("kg".to_string()),
            quantity: Some(100.0),
            unit_cost,
        },
    )
    .await
}

/// Inserts a recipe row directly, without recalculating the product.
/// Use this to build fixtures whose stored cost is deliberately stale.
pub async fn insert_raw_recipe(
    db: &DatabaseConnection,
    product_id: i64,
    ingredient_id: i64,
    quantity_needed: f64,
) -> Result<entities::recipe::Model> {
    entities::recipe::ActiveModel {
        product_id: Set(product_id),
        ingredient_id: Set(ingredient_id),
        quantity_needed: Set(quantity_needed),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Overwrites a product's stored production cost.
pub async fn force_production_cost(
    db: &DatabaseConnection,
    product_id: i64,
    value: f64,
) -> Result<()> {
    Product::update_many()
        .col_expr(entities::product::Column::ProductionCost, Expr::value(value))
        .filter(entities::product::Column::Id.eq(product_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Creates a test user with the given login.
///
/// # Defaults
/// * name: "Usuario de prueba"
/// * role: "cliente"
pub async fn create_test_user(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<entities::user::Model> {
    user::create_user(
        db,
        UserInput {
            name: Some("Usuario de prueba".to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            ..Default::default()
        },
    )
    .await
}

/// Creates an order with no address or phone and a total of 0.
pub async fn create_test_order(
    db: &DatabaseConnection,
    user_id: Option<i64>,
) -> Result<entities::order::Model> {
    order::create_order(
        db,
        NewOrder {
            user_id,
            ..Default::default()
        },
    )
    .await
}

/// Adds a line priced at the product's price.
pub async fn create_test_order_line(
    db: &DatabaseConnection,
    order_id: i64,
    product_id: i64,
    quantity: i32,
) -> Result<entities::order_line::Model> {
    crate::core::order_line::create_order_line(
        db,
        crate::core::order_line::NewOrderLine {
            order_id: Some(order_id),
            product_id: Some(product_id),
            quantity: Some(quantity),
            ..Default::default()
        },
    )
    .await
}
