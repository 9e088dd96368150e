//! Recipe entity - One ingredient requirement of one product.
//!
//! Rows are removed together with their product; an ingredient cannot be
//! removed while any row still references it.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe row database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    /// Unique identifier for the recipe row
    #[sea_orm(primary_key)]
    #[serde(rename = "id_receta")]
    pub id: i64,
    /// Product this requirement belongs to
    #[serde(rename = "id_producto")]
    pub product_id: i64,
    /// Ingredient required
    #[serde(rename = "id_ingrediente")]
    pub ingredient_id: i64,
    /// Amount of the ingredient, in its unit of measure, per product unit
    #[serde(rename = "cantidad_necesaria")]
    pub quantity_needed: f64,
}

/// Defines relationships between Recipe and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recipe row belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each recipe row references one ingredient
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id",
        on_delete = "Restrict"
    )]
    Ingredient,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
