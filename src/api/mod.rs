//! HTTP server setup and routing.
//!
//! Every handler is a thin mapping from JSON to a [`crate::core`] function.
//! All routes except `/`, `/auth/registrarse` and `/auth/login` sit behind
//! [`session::require_session`].

mod auth;
mod ingredients;
mod order_lines;
mod orders;
mod products;
mod recipes;
pub mod session;
mod users;

#[cfg(test)]
mod tests;

use crate::{
    config::Settings,
    errors::{Error, Result},
};
use axum::{
    Json, Router,
    extract::FromRequest,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Loaded settings
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Bundles a connection and settings into handler state.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: Settings) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
        }
    }
}

/// JSON request body whose rejections answer in the usual `{"error": ...}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

async fn root() -> Json<Value> {
    Json(json!({ "mensaje": "Backend Sweetland funcionando" }))
}

/// CORS policy allowing the configured origins to send the session cookie.
pub fn build_cors(settings: &Settings) -> Result<CorsLayer> {
    let origins = settings
        .cors_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| Error::Config {
                message: format!("Invalid CORS origin {origin:?}: {e}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]))
}

/// Builds the full application router.
///
/// # Errors
/// Returns `Config` if a configured CORS origin is not a valid header value.
pub fn router(state: AppState) -> Result<Router> {
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(products::routes())
        .merge(ingredients::routes())
        .merge(recipes::routes())
        .merge(orders::routes())
        .merge(order_lines::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    let cors = build_cors(&state.settings)?;

    Ok(Router::new()
        .route("/", get(root))
        .merge(auth::public_routes())
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.settings.bind_address.clone();
    let app = router(state)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Starting HTTP server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
