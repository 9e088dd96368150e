//! Order entity - Customer orders and their lifecycle status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    #[serde(rename = "id_pedido")]
    pub id: i64,
    /// Registered customer, None for walk-in orders
    #[serde(rename = "usuario_id")]
    pub user_id: Option<i64>,
    /// Name given at order time for unregistered customers
    #[serde(rename = "cliente_nombre")]
    pub customer_name: Option<String>,
    /// Phone given at order time for unregistered customers
    #[serde(rename = "cliente_telefono")]
    pub customer_phone: Option<String>,
    /// Delivery address
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    /// Contact phone for delivery
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Order total
    pub total: f64,
    /// One of the `core::order::OrderStatus` values
    #[serde(rename = "estado")]
    pub status: String,
    /// When the order was placed
    #[serde(rename = "fecha_pedido")]
    pub ordered_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order optionally belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    User,
    /// One order has many lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    Lines,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
