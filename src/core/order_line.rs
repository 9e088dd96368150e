//! Order line business logic - products and quantities within an order.

use crate::{
    core::{non_negative, order::require_order, product::require_product},
    entities::{OrderLine, Product, order_line},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Body of an order line create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrderLine {
    /// Order to add the line to
    #[serde(rename = "pedido_id")]
    pub order_id: Option<i64>,
    /// Product ordered
    #[serde(rename = "producto_id")]
    pub product_id: Option<i64>,
    /// Units, must be positive
    #[serde(rename = "cantidad")]
    pub quantity: Option<i32>,
    /// Price per unit; the product price when absent
    #[serde(rename = "precio_unitario")]
    pub unit_price: Option<f64>,
    /// Line total; quantity × unit price when absent
    pub subtotal: Option<f64>,
}

/// Body of an order line update request; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderLineChanges {
    /// New quantity
    #[serde(rename = "cantidad")]
    pub quantity: Option<i32>,
    /// New unit price
    #[serde(rename = "precio_unitario")]
    pub unit_price: Option<f64>,
    /// New line total
    pub subtotal: Option<f64>,
}

/// An order line with its product name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineView {
    /// Line id
    pub id_detalle: i64,
    /// Order id
    pub pedido_id: i64,
    /// Product id
    pub producto_id: i64,
    /// Product name
    pub producto: Option<String>,
    /// Units ordered
    pub cantidad: i32,
    /// Price per unit
    pub precio_unitario: f64,
    /// Line total
    pub subtotal: f64,
}

impl OrderLineView {
    fn new(line: order_line::Model, product_name: Option<String>) -> Self {
        Self {
            id_detalle: line.id,
            pedido_id: line.order_id,
            producto_id: line.product_id,
            producto: product_name,
            cantidad: line.quantity,
            precio_unitario: line.unit_price,
            subtotal: line.subtotal,
        }
    }
}

fn positive_quantity(quantity: i32) -> Result<i32> {
    if quantity <= 0 {
        return Err(Error::validation("cantidad must be greater than 0"));
    }
    Ok(quantity)
}

/// Lists every order line, newest first.
pub async fn list_order_lines(db: &DatabaseConnection) -> Result<Vec<OrderLineView>> {
    let lines = OrderLine::find()
        .order_by_desc(order_line::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(lines
        .into_iter()
        .map(|(line, product)| OrderLineView::new(line, product.map(|p| p.name)))
        .collect())
}

/// Retrieves one order line.
///
/// # Errors
/// Returns `OrderLineNotFound` if no line has this id.
pub async fn get_order_line(db: &DatabaseConnection, line_id: i64) -> Result<OrderLineView> {
    let (line, product) = OrderLine::find_by_id(line_id)
        .find_also_related(Product)
        .one(db)
        .await?
        .ok_or(Error::OrderLineNotFound { id: line_id })?;
    Ok(OrderLineView::new(line, product.map(|p| p.name)))
}

/// Adds a line to an order.
///
/// # Errors
/// Returns an error if a field is missing, the quantity is not positive, a
/// price is negative, or the order or product does not exist.
#[instrument(skip(db, input))]
pub async fn create_order_line(
    db: &DatabaseConnection,
    input: NewOrderLine,
) -> Result<order_line::Model> {
    let order_id = input
        .order_id
        .ok_or_else(|| Error::validation("Missing required field: pedido_id"))?;
    let product_id = input
        .product_id
        .ok_or_else(|| Error::validation("Missing required field: producto_id"))?;
    let quantity = positive_quantity(
        input
            .quantity
            .ok_or_else(|| Error::validation("Missing required field: cantidad"))?,
    )?;
    let unit_price = input.unit_price.map(non_negative).transpose()?;
    let subtotal = input.subtotal.map(non_negative).transpose()?;

    require_order(db, order_id).await?;
    let product = require_product(db, product_id).await?;

    let unit_price = unit_price.unwrap_or(product.price);
    let subtotal = subtotal.unwrap_or_else(|| f64::from(quantity) * unit_price);

    let line = order_line::ActiveModel {
        order_id: Set(order_id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        subtotal: Set(subtotal),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Added line {} to order {}", line.id, order_id);
    Ok(line)
}

/// Applies the fields present in `changes`.
///
/// When the quantity or unit price changes and no subtotal is given, the
/// subtotal is recomputed.
///
/// # Errors
/// Returns `OrderLineNotFound`, `Validation` for a non-positive quantity, or
/// `InvalidAmount` for a negative price.
#[instrument(skip(db, changes))]
pub async fn update_order_line(
    db: &DatabaseConnection,
    line_id: i64,
    changes: OrderLineChanges,
) -> Result<order_line::Model> {
    let quantity = changes.quantity.map(positive_quantity).transpose()?;
    let unit_price = changes.unit_price.map(non_negative).transpose()?;
    let subtotal = changes.subtotal.map(non_negative).transpose()?;

    let existing = OrderLine::find_by_id(line_id)
        .one(db)
        .await?
        .ok_or(Error::OrderLineNotFound { id: line_id })?;

    let new_quantity = quantity.unwrap_or(existing.quantity);
    let new_unit_price = unit_price.unwrap_or(existing.unit_price);
    let new_subtotal = match subtotal {
        Some(subtotal) => subtotal,
        None if quantity.is_some() || unit_price.is_some() => {
            f64::from(new_quantity) * new_unit_price
        }
        None => existing.subtotal,
    };

    let mut line: order_line::ActiveModel = existing.into();
    line.quantity = Set(new_quantity);
    line.unit_price = Set(new_unit_price);
    line.subtotal = Set(new_subtotal);

    let updated = line.update(db).await?;
    info!("Updated order line {}", line_id);
    Ok(updated)
}

/// Deletes an order line.
///
/// # Errors
/// Returns `OrderLineNotFound` if no line has this id.
#[instrument(skip(db))]
pub async fn delete_order_line(db: &DatabaseConnection, line_id: i64) -> Result<()> {
    let result = OrderLine::delete_by_id(line_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::OrderLineNotFound { id: line_id });
    }
    info!("Deleted order line {}", line_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_line(order_id: i64, product_id: i64, quantity: i32) -> NewOrderLine {
        NewOrderLine {
            order_id: Some(order_id),
            product_id: Some(product_id),
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_line_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_order_line(&db, new_line(1, 1, 0)).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let mut negative_price = new_line(1, 1, 1);
        negative_price.unit_price = Some(-3.0);
        let result = create_order_line(&db, negative_price).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: -3.0 })));

        let result = create_order_line(&db, NewOrderLine::default()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_line_defaults_from_product() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db, None).await?;
        let product = create_custom_product(&db, "Muffin", 3.0).await?;

        let line = create_order_line(&db, new_line(order.id, product.id, 4)).await?;
        assert_eq!(line.unit_price, 3.0);
        assert_eq!(line.subtotal, 12.0);

        let missing_order = create_order_line(&db, new_line(999, product.id, 1)).await;
        assert!(matches!(missing_order, Err(Error::OrderNotFound { id: 999 })));

        let missing_product = create_order_line(&db, new_line(order.id, 999, 1)).await;
        assert!(matches!(
            missing_product,
            Err(Error::ProductNotFound { id: 999 })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_line_recomputes_subtotal() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db, None).await?;
        let product = create_custom_product(&db, "Muffin", 3.0).await?;
        let line = create_order_line(&db, new_line(order.id, product.id, 2)).await?;

        let updated = update_order_line(
            &db,
            line.id,
            OrderLineChanges {
                quantity: Some(5),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.subtotal, 15.0);

        let explicit = update_order_line(
            &db,
            line.id,
            OrderLineChanges {
                subtotal: Some(12.0),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(explicit.quantity, 5);
        assert_eq!(explicit.subtotal, 12.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_get_delete_lines() -> Result<()> {
        let db = setup_test_db().await?;
        let order = create_test_order(&db, None).await?;
        let product = create_test_product(&db, "Torta").await?;
        let first = create_order_line(&db, new_line(order.id, product.id, 1)).await?;
        let second = create_order_line(&db, new_line(order.id, product.id, 2)).await?;

        let listed = list_order_lines(&db).await?;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id_detalle, second.id);
        assert_eq!(listed[0].producto.as_deref(), Some("Torta"));

        let view = get_order_line(&db, first.id).await?;
        assert_eq!(view.cantidad, 1);

        delete_order_line(&db, first.id).await?;
        let missing = delete_order_line(&db, first.id).await;
        assert!(matches!(missing, Err(Error::OrderLineNotFound { .. })));
        Ok(())
    }
}
