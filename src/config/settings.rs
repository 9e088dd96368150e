//! Server settings.
//!
//! Values come from an optional `config.toml` (path overridable through
//! `SWEETLAND_CONFIG`) and are then overridden by environment variables, which
//! may themselves be supplied through a `.env` file loaded in `main`.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Runtime settings for the HTTP server
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Socket address the listener binds to
    pub bind_address: String,
    /// `SeaORM` connection URL
    pub database_url: String,
    /// Origins allowed to call the API with credentials
    pub cors_origins: Vec<String>,
    /// Lifetime of a login session
    pub session_ttl_hours: i64,
    /// Whether the session cookie carries the `Secure` attribute
    pub cookie_secure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            session_ttl_hours: 24 * 7,
            cookie_secure: false,
        }
    }
}

impl Settings {
    /// Applies overrides using `lookup` as the variable source.
    ///
    /// Split out from [`Settings::apply_env`] so tests can feed a fixed map.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(addr) = lookup("SWEETLAND_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Some(origins) = lookup("SWEETLAND_CORS_ORIGINS") {
            self.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(ttl) = lookup("SWEETLAND_SESSION_TTL_HOURS") {
            self.session_ttl_hours = ttl.trim().parse().map_err(|e| Error::Config {
                message: format!("SWEETLAND_SESSION_TTL_HOURS must be an integer: {e}"),
            })?;
        }
        self.validate()
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn validate(&self) -> Result<()> {
        if self.session_ttl_hours <= 0 {
            return Err(Error::Config {
                message: "session_ttl_hours must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from a TOML file, falling back to defaults when the file is absent.
///
/// # Errors
/// Returns an error if:
/// - The file exists but cannot be read
/// - The TOML syntax is invalid
pub fn load_settings_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::info!("No config file at {:?}, using defaults", path_ref);
        return Ok(Settings::default());
    }
    tracing::debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `SWEETLAND_CONFIG` (or `./config.toml`) plus environment overrides.
pub fn load_settings() -> Result<Settings> {
    let path = std::env::var("SWEETLAND_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let mut settings = load_settings_file(&path)?;
    settings.apply_env()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_partial_settings_keeps_defaults() {
        let toml_str = r#"
            bind_address = "0.0.0.0:8080"
            cors_origins = ["https://sweetland.example"]
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.bind_address, "0.0.0.0:8080");
        assert_eq!(settings.cors_origins, vec!["https://sweetland.example"]);
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.session_ttl_hours, 168);
        assert!(!settings.cookie_secure);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse_settings("bind_address = ");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("SWEETLAND_CORS_ORIGINS", "http://a.test, http://b.test,"),
            ("SWEETLAND_SESSION_TTL_HOURS", "2"),
        ]);
        let mut settings = Settings::default();
        settings
            .apply_overrides(|k| vars.get(k).map(ToString::to_string))
            .unwrap();

        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(settings.session_ttl_hours, 2);
        assert_eq!(settings.bind_address, "127.0.0.1:5000");
    }

    #[test]
    fn test_rejects_bad_ttl() {
        let mut settings = Settings::default();
        let result = settings.apply_overrides(|k| {
            (k == "SWEETLAND_SESSION_TTL_HOURS").then(|| "0".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = settings.apply_overrides(|k| {
            (k == "SWEETLAND_SESSION_TTL_HOURS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = load_settings_file("definitely/not/here.toml").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
