//! Product entity - Items sold by the bakery.
//!
//! `production_cost` is derived data: it is written only by the cost
//! recalculation engine in `core::costing` and always equals the weighted sum
//! of the product's recipe rows after any recipe mutation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    #[serde(rename = "id_producto")]
    pub id: i64,
    /// Name of the product (e.g., "Torta de chocolate")
    #[serde(rename = "nombre")]
    pub name: String,
    /// Catalogue category (e.g., "tortas", "galletas")
    #[serde(rename = "categoria")]
    pub category: String,
    /// Free-form description
    #[serde(rename = "descripcion")]
    pub description: Option<String>,
    /// Sale price
    #[serde(rename = "precio")]
    pub price: f64,
    /// Image reference (URL or path)
    #[serde(rename = "imagen")]
    pub image: Option<String>,
    /// Cost of producing one unit, owned by the recalculation engine
    #[serde(rename = "costo_produccion")]
    pub production_cost: f64,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One product has many recipe rows
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipes,
    /// One product appears on many order lines
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
