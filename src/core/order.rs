//! Order business logic - Customer orders, their status and display views.

use crate::{
    core::{non_negative, optional_amount, optional_text},
    entities::{Order, OrderLine, Product, User, UserModel, order, order_line},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};
use tracing::{info, instrument};

/// Shown when an order has no registered customer name.
pub const UNKNOWN_CUSTOMER: &str = "Cliente no registrado";
/// Shown when an order has no contact phone.
pub const NO_PHONE: &str = "Sin teléfono";
/// Shown when an order has no delivery address.
pub const NO_ADDRESS: &str = "Sin dirección";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderStatus {
    /// Received, not yet confirmed
    #[default]
    Pending,
    /// Accepted by the bakery
    Confirmed,
    /// Being prepared
    InPreparation,
    /// Delivered or picked up
    Completed,
    /// Cancelled
    Cancelled,
}

impl OrderStatus {
    /// Stored and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pendiente",
            Self::Confirmed => "confirmado",
            Self::InPreparation => "en_preparacion",
            Self::Completed => "completado",
            Self::Cancelled => "cancelado",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pendiente" => Ok(Self::Pending),
            "confirmado" => Ok(Self::Confirmed),
            "en_preparacion" => Ok(Self::InPreparation),
            "completado" => Ok(Self::Completed),
            "cancelado" => Ok(Self::Cancelled),
            other => Err(Error::InvalidOrderStatus {
                status: other.to_string(),
            }),
        }
    }
}

/// Body of an order create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewOrder {
    /// Registered customer, if any
    #[serde(rename = "usuario_id")]
    pub user_id: Option<i64>,
    /// Customer name for walk-in orders
    #[serde(rename = "cliente_nombre")]
    pub customer_name: Option<String>,
    /// Customer phone for walk-in orders
    #[serde(rename = "cliente_telefono")]
    pub customer_phone: Option<String>,
    /// Delivery address
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    /// Contact phone for delivery
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Order total, 0 when absent
    pub total: Option<f64>,
}

/// Body of an order update request; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderChanges {
    /// New total
    pub total: Option<f64>,
    /// New delivery address
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    /// New contact phone
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// New status
    #[serde(rename = "estado")]
    pub status: Option<String>,
}

/// An order as shown in listings, with display fallbacks applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    /// Order id
    pub id: i64,
    /// Customer name or [`UNKNOWN_CUSTOMER`]
    pub cliente_nombre: String,
    /// Customer phone or [`NO_PHONE`]
    pub cliente_telefono: String,
    /// Placement time, `YYYY-MM-DD HH:MM:SS`
    pub fecha_pedido: String,
    /// Status string
    pub estado: String,
    /// Order total
    pub total: f64,
    /// Address or [`NO_ADDRESS`]
    pub direccion: String,
    /// Number of lines on the order
    pub total_productos: u64,
}

/// One line of an order with product details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLineDetail {
    /// Line id
    pub id: i64,
    /// Product id
    pub producto_id: i64,
    /// Product name
    pub producto_nombre: Option<String>,
    /// Product category
    pub categoria: Option<String>,
    /// Units ordered
    pub cantidad: i32,
    /// Price per unit
    pub precio_unitario: f64,
    /// Line total
    pub subtotal: f64,
}

/// Loads an order or fails with `OrderNotFound`.
pub async fn require_order<C>(db: &C, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or(Error::OrderNotFound { id: order_id })
}

fn summarize(
    order: order::Model,
    customer: Option<&UserModel>,
    line_count: u64,
) -> OrderSummary {
    let name = customer
        .map(|u| u.name.clone())
        .or(order.customer_name)
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
    let phone = customer
        .and_then(|u| u.phone.clone())
        .or(order.customer_phone)
        .or(order.phone)
        .unwrap_or_else(|| NO_PHONE.to_string());

    OrderSummary {
        id: order.id,
        cliente_nombre: name,
        cliente_telefono: phone,
        fecha_pedido: order.ordered_at.format(DATE_FORMAT).to_string(),
        estado: order.status,
        total: order.total,
        direccion: order.address.unwrap_or_else(|| NO_ADDRESS.to_string()),
        total_productos: line_count,
    }
}

/// Lists every order, newest first.
pub async fn list_orders(db: &DatabaseConnection) -> Result<Vec<OrderSummary>> {
    let orders = Order::find()
        .order_by_desc(order::Column::OrderedAt)
        .order_by_desc(order::Column::Id)
        .find_also_related(User)
        .all(db)
        .await?;

    let mut line_counts: HashMap<i64, u64> = HashMap::new();
    for line in OrderLine::find().all(db).await? {
        *line_counts.entry(line.order_id).or_default() += 1;
    }

    Ok(orders
        .into_iter()
        .map(|(order, customer)| {
            let count = line_counts.get(&order.id).copied().unwrap_or(0);
            summarize(order, customer.as_ref(), count)
        })
        .collect())
}

/// Retrieves one order view.
///
/// # Errors
/// Returns `OrderNotFound` if no order has this id.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<OrderSummary> {
    let order = require_order(db, order_id).await?;
    let customer = order.find_related(User).one(db).await?;
    let count = order.find_related(OrderLine).count(db).await?;
    Ok(summarize(order, customer.as_ref(), count))
}

/// Lists the lines of an order with product name and category.
///
/// # Errors
/// Returns `OrderNotFound` if the order does not exist.
pub async fn order_details(db: &DatabaseConnection, order_id: i64) -> Result<Vec<OrderLineDetail>> {
    require_order(db, order_id).await?;

    let lines = OrderLine::find()
        .filter(order_line::Column::OrderId.eq(order_id))
        .order_by_asc(order_line::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    Ok(lines
        .into_iter()
        .map(|(line, product)| OrderLineDetail {
            id: line.id,
            producto_id: line.product_id,
            producto_nombre: product.as_ref().map(|p| p.name.clone()),
            categoria: product.map(|p| p.category),
            cantidad: line.quantity,
            precio_unitario: line.unit_price,
            subtotal: line.subtotal,
        })
        .collect())
}

/// Places a new order with status `pendiente` and the current time.
///
/// # Errors
/// Returns `InvalidAmount` for a negative total and `UserNotFound` when the
/// given customer does not exist.
#[instrument(skip(db, input))]
pub async fn create_order(db: &DatabaseConnection, input: NewOrder) -> Result<order::Model> {
    let total = optional_amount(input.total)?.unwrap_or(0.0);

    if let Some(user_id) = input.user_id {
        User::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(Error::UserNotFound { id: user_id })?;
    }

    let created = order::ActiveModel {
        user_id: Set(input.user_id),
        customer_name: Set(optional_text(input.customer_name)),
        customer_phone: Set(optional_text(input.customer_phone)),
        address: Set(optional_text(input.address)),
        phone: Set(optional_text(input.phone)),
        total: Set(total),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        ordered_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created order {} with total {:.2}", created.id, total);
    Ok(created)
}

/// Applies the fields present in `changes`.
///
/// # Errors
/// Returns `OrderNotFound`, `InvalidAmount`, or `InvalidOrderStatus`.
#[instrument(skip(db, changes))]
pub async fn update_order(
    db: &DatabaseConnection,
    order_id: i64,
    changes: OrderChanges,
) -> Result<order::Model> {
    let status = changes
        .status
        .as_deref()
        .map(OrderStatus::from_str)
        .transpose()?;
    let total = changes.total.map(non_negative).transpose()?;

    let existing = require_order(db, order_id).await?;
    let mut order: order::ActiveModel = existing.into();

    if let Some(total) = total {
        order.total = Set(total);
    }
    if changes.address.is_some() {
        order.address = Set(optional_text(changes.address));
    }
    if changes.phone.is_some() {
        order.phone = Set(optional_text(changes.phone));
    }
    if let Some(status) = status {
        order.status = Set(status.as_str().to_string());
    }

    let updated = order.update(db).await?;
    info!("Updated order {}", order_id);
    Ok(updated)
}

/// Moves an order to a new status.
///
/// # Errors
/// Returns `InvalidOrderStatus` for an unknown status, before touching the
/// database, and `OrderNotFound` for an unknown order.
#[instrument(skip(db))]
pub async fn update_status(
    db: &DatabaseConnection,
    order_id: i64,
    status: &str,
) -> Result<OrderStatus> {
    let status = OrderStatus::from_str(status)?;

    let existing = require_order(db, order_id).await?;
    let mut order: order::ActiveModel = existing.into();
    order.status = Set(status.as_str().to_string());
    order.update(db).await?;

    info!("Order {} is now {}", order_id, status);
    Ok(status)
}

/// Deletes an order and all of its lines.
#[instrument(skip(db))]
pub async fn delete_order(db: &DatabaseConnection, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = require_order(&txn, order_id).await?;
    let removed = OrderLine::delete_many()
        .filter(order_line::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;
    existing.delete(&txn).await?;
    txn.commit().await?;

    info!(
        "Deleted order {} and {} lines",
        order_id, removed.rows_affected
    );
    Ok(())
}
