//! Unified error type for the Sweetland backend.
//!
//! Core functions return [`Result`]; the HTTP layer converts any [`Error`] into a
//! JSON response through the [`IntoResponse`] impl below. Internal failures are
//! logged with full detail and answered with a generic message.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

/// All errors produced by the service.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },

    /// Any failure reported by the database driver
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O failure (binding the listener, reading files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request input failed validation before any write was attempted
    #[error("{message}")]
    Validation {
        /// Which field was wrong and why
        message: String,
    },

    /// A monetary amount or quantity was negative or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// Order status outside the allowed set
    #[error("Invalid order status: {status}")]
    InvalidOrderStatus {
        /// The rejected status string
        status: String,
    },

    /// Product id does not exist
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Requested product id
        id: i64,
    },

    /// Ingredient id does not exist
    #[error("Ingredient not found: {id}")]
    IngredientNotFound {
        /// Requested ingredient id
        id: i64,
    },

    /// Recipe row id does not exist
    #[error("Recipe not found: {id}")]
    RecipeNotFound {
        /// Requested recipe id
        id: i64,
    },

    /// Order id does not exist
    #[error("Order not found: {id}")]
    OrderNotFound {
        /// Requested order id
        id: i64,
    },

    /// Order line id does not exist
    #[error("Order line not found: {id}")]
    OrderLineNotFound {
        /// Requested order line id
        id: i64,
    },

    /// User id does not exist
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: i64,
    },

    /// The write would violate a uniqueness or referential rule
    #[error("{message}")]
    Conflict {
        /// Which rule was hit
        message: String,
    },

    /// No valid session accompanies the request
    #[error("Unauthorized")]
    Unauthorized,

    /// Email/password pair did not match a stored user
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidAmount { .. } | Self::InvalidOrderStatus { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::ProductNotFound { .. }
            | Self::IngredientNotFound { .. }
            | Self::RecipeNotFound { .. }
            | Self::OrderNotFound { .. }
            | Self::OrderLineNotFound { .. }
            | Self::UserNotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::RecipeNotFound { id: 3 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::validation("missing quantity").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::conflict("in use").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(Error::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Database(DbErr::Custom("boom".to_string())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_body_rejection_is_validation() {
        let rejection = JsonRejection::from(
            axum::extract::rejection::MissingJsonContentType::default(),
        );
        let error = Error::from(rejection);
        assert!(matches!(error, Error::Validation { .. }));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_error_hides_cause() {
        let response = Error::Database(DbErr::Custom("disk full".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
