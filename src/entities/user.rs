//! User entity - Registered staff and customer accounts.
//!
//! The password is stored only as a salted hash and is never serialised.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    #[serde(rename = "id_usuario")]
    pub id: i64,
    /// Display name
    #[serde(rename = "nombre")]
    pub name: String,
    /// Login email, unique across users
    #[sea_orm(unique)]
    pub email: String,
    /// Salted one-way hash produced by `core::auth::hash_password`
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// Contact phone, if provided
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    /// Delivery address, if provided
    #[serde(rename = "direccion")]
    pub address: Option<String>,
    /// Role name (`"cliente"` unless set otherwise)
    #[serde(rename = "rol")]
    pub role: String,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many login sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
    /// One user has placed many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
