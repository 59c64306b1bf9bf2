//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub news_api_key: String,
    pub openai_api_key: Option<String>,
    pub jwt_secret: String,
    /// Absent => caching is disabled (the no-op cache is wired in).
    pub redis_url: Option<String>,
    pub summary_model: String,
    pub session_ttl_minutes: i64,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load API Keys and Secrets ---
        let news_api_key = std::env::var("NEWS_API_KEY")
            .map_err(|_| ConfigError::MissingVar("NEWS_API_KEY".to_string()))?;
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingVar("JWT_SECRET".to_string()))?;
        let redis_url = std::env::var("REDIS_URL").ok();

        // --- Load Adapter-specific Settings ---
        let summary_model =
            std::env::var("SUMMARY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let session_ttl_str =
            std::env::var("SESSION_TTL_MINUTES").unwrap_or_else(|_| "60".to_string());
        let session_ttl_minutes = session_ttl_str.parse::<i64>().map_err(|_| {
            ConfigError::InvalidValue(
                "SESSION_TTL_MINUTES".to_string(),
                format!("'{}' is not a valid number of minutes", session_ttl_str),
            )
        })?;
        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            news_api_key,
            openai_api_key,
            jwt_secret,
            redis_url,
            summary_model,
            session_ttl_minutes,
            cors_origin,
        })
    }
}
