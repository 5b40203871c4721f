//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup and validated before the server
//! starts.
//!
//! ## Required Variables
//!
//! - `DATABASE_URL` - PostgreSQL connection string
//! - `BASE_URL` - public origin of this service, e.g. `https://sho.rt`;
//!   used to build short URLs and to refuse shortening our own links
//! - `SESSION_SIGNING_SECRET` - HMAC key for session token hashing
//!
//! ## Optional Variables
//!
//! - `REDIS_URL` - enables the redirect cache when set
//! - `LISTEN` - bind address (default: `0.0.0.0:3000`)
//! - `ENVIRONMENT` - `development` (default) or `production`; production
//!   refuses localhost destinations and marks the session cookie `Secure`
//! - `RUST_LOG` - log level (default: `info`)
//! - `LOG_FORMAT` - `text` or `json` (default: `text`)
//! - `COOKIE_NAME` - session cookie name (default: `shortlink_session`)
//! - `SESSION_TTL_HOURS` - session lifetime (default: 168, i.e. 7 days)
//! - `CACHE_TTL_SECONDS` - redirect cache TTL (default: 3600)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 10)
//! - `DB_CONNECT_TIMEOUT` - pool acquire timeout in seconds (default: 30)

use anyhow::{Context, Result};
use std::env;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: Option<String>,
    pub listen_addr: String,
    pub base_url: String,
    pub environment: String,
    pub log_level: String,
    pub log_format: String,
    pub cookie_name: String,
    pub session_signing_secret: String,
    pub session_ttl_hours: i64,
    pub cache_ttl_seconds: u64,
    pub db_max_connections: u32,
    pub db_connect_timeout: u64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a required variable is missing.
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let base_url = env::var("BASE_URL").context("BASE_URL must be set")?;

        let session_signing_secret =
            env::var("SESSION_SIGNING_SECRET").context("SESSION_SIGNING_SECRET must be set")?;

        let redis_url = env::var("REDIS_URL").ok();

        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let environment =
            env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let cookie_name =
            env::var("COOKIE_NAME").unwrap_or_else(|_| "shortlink_session".to_string());

        let session_ttl_hours = env::var("SESSION_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(168);

        let cache_ttl_seconds = env::var("CACHE_TTL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let db_connect_timeout = env::var("DB_CONNECT_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            database_url,
            redis_url,
            listen_addr,
            base_url: base_url.trim_end_matches('/').to_string(),
            environment,
            log_level,
            log_format,
            cookie_name,
            session_signing_secret,
            session_ttl_hours,
            cache_ttl_seconds,
            db_max_connections,
            db_connect_timeout,
        })
    }

    /// True for production deployments: localhost destinations are refused
    /// and the session cookie carries the `Secure` attribute.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
