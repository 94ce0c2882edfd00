//! Configuration management for database and application settings.

/// Database configuration and connection management
pub mod database;

use crate::errors::{Error, Result};
use std::env;
use tracing::info;

/// Application configuration assembled from the environment.
///
/// `OPENAI_API_KEY` is required: the AI relay cannot start without its
/// upstream credential, so absence is a fatal startup error. Everything
/// else has a sensible default.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    /// TCP port the HTTP API listens on
    pub port: u16,
    /// Upstream credential for chat completion and transcription calls
    pub openai_api_key: String,
    /// Chat completion model name
    pub openai_model: String,
}

impl AppConfig {
    /// Loads configuration from the environment.
    pub fn load() -> Result<Self> {
        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/genbridge.sqlite?mode=rwc".to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|e| Error::Config {
                message: format!("Invalid PORT value {raw:?}: {e}"),
            })?,
            Err(_) => {
                info!("PORT not set, using default: 8080");
                8080
            }
        };

        let openai_api_key = env::var("OPENAI_API_KEY").map_err(|_| Error::Config {
            message: "OPENAI_API_KEY is not set".to_string(),
        })?;

        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4-turbo-preview".to_string());

        Ok(Self {
            database_url,
            port,
            openai_api_key,
            openai_model,
        })
    }
}
