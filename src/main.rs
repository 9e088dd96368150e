use dotenvy::dotenv;
use sweetland::{
    api::{self, AppState},
    config::{self, database},
    core::auth,
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings from config.toml and the environment
    let settings = config::load_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;
    info!("Settings loaded, binding to {}", settings.bind_address);

    // 4. Initialize database and schema
    let db = database::init_db(&settings.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Drop sessions that expired while the server was down
    auth::purge_expired_sessions(&db)
        .await
        .inspect_err(|e| error!("Failed to purge expired sessions: {}", e))?;

    // 6. Serve the API
    api::serve(AppState::new(db, settings))
        .await
        .inspect_err(|e| error!("HTTP server failed: {}", e))
}
