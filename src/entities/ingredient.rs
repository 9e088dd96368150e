//! Ingredient entity - Raw materials with stock on hand and unit cost.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    /// Unique identifier for the ingredient
    #[sea_orm(primary_key)]
    #[serde(rename = "id_ingrediente")]
    pub id: i64,
    /// Name of the ingredient (e.g., "Harina")
    #[serde(rename = "nombre")]
    pub name: String,
    /// Unit of measure (e.g., "kg", "unidad")
    #[serde(rename = "unidad")]
    pub unit: String,
    /// Quantity on hand, unknown when None
    #[serde(rename = "cantidad")]
    pub quantity: Option<f64>,
    /// Cost per unit of measure; None contributes nothing to production cost
    #[serde(rename = "costo_unitario")]
    pub unit_cost: Option<f64>,
}

/// Defines relationships between Ingredient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One ingredient is used by many recipe rows
    #[sea_orm(has_many = "super::recipe::Entity")]
    Recipes,
}

impl Related<super::recipe::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
