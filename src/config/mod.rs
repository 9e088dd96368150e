/// Database connection and schema creation
pub mod database;

/// Server settings loaded from config.toml and the environment
pub mod settings;

pub use settings::{Settings, load_settings};
