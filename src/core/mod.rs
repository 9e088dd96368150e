//! Core business logic - framework-agnostic operations over the `SeaORM` entities.
//!
//! Every function takes a database connection (or an open transaction) and
//! returns [`crate::errors::Result`]. The HTTP layer in [`crate::api`] is a thin
//! mapping over these functions.

/// Login sessions and password hashing
pub mod auth;
/// Production-cost recalculation engine
pub mod costing;
/// Ingredient management
pub mod ingredient;
/// Order management and order views
pub mod order;
/// Order line management
pub mod order_line;
/// Product management
pub mod product;
/// Recipe rows and their cost cascade
pub mod recipe;
/// User accounts
pub mod user;

use crate::errors::{Error, Result};

/// Trims a required text field, rejecting missing or blank values.
pub(crate) fn required_text(value: Option<String>, field: &str) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(Error::validation(format!("Missing required field: {field}"))),
    }
}

/// Trims an optional text field, mapping blank values to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Rejects negative, NaN and infinite amounts.
pub(crate) fn non_negative(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(amount)
}

/// A required, non-negative amount.
pub(crate) fn required_amount(value: Option<f64>, field: &str) -> Result<f64> {
    let amount =
        value.ok_or_else(|| Error::validation(format!("Missing required field: {field}")))?;
    non_negative(amount)
}

/// An optional, non-negative amount.
pub(crate) fn optional_amount(value: Option<f64>) -> Result<Option<f64>> {
    value.map(non_negative).transpose()
}
