//! Configuration management for the API server
//!
//! Loads configuration from environment variables into a type-safe struct.
//!
//! # Environment Variables
//!
//! - `HOST`: Host to bind to (default: 0.0.0.0)
//! - `PORT`: Port to bind to (default: 3000)
//! - `PUBLIC_URL`: Base URL used in emailed links (default: http://localhost:PORT)
//! - `DATABASE_URL`: SQLite connection string (default: sqlite:botboard.db)
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `OWNER_EMAIL`, `OWNER_PASSWORD`: Owner account bootstrap (required)
//! - `SMTP_HOST`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `MAIL_FROM`: SMTP
//!   transport; all optional. Without `SMTP_HOST` notifications are logged
//!   instead of sent
//! - `WEBHOOK_TIMEOUT_SECONDS`: Outbound webhook timeout (default: 5)
//! - `RUST_LOG`: Log filter (default: info)

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Owner account bootstrap
    pub owner: OwnerConfig,

    /// SMTP transport; None disables real delivery
    pub mail: Option<MailConfig>,

    /// Outbound webhook configuration
    pub webhook: WebhookConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Public base URL, used to build links in notification emails
    pub public_url: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

/// Owner bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    /// Owner email; also receives approval requests
    pub email: String,

    /// Owner password, hashed at first startup
    pub password: String,
}

/// SMTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// From address for notifications
    pub from: String,
}

/// Outbound webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Per-destination delivery timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value fails
    /// to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;

        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:botboard.db".to_string());
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<u32>()?;

        let owner_email = env::var("OWNER_EMAIL")
            .map_err(|_| anyhow::anyhow!("OWNER_EMAIL environment variable is required"))?;
        let owner_password = env::var("OWNER_PASSWORD")
            .map_err(|_| anyhow::anyhow!("OWNER_PASSWORD environment variable is required"))?;

        let mail = match env::var("SMTP_HOST") {
            Ok(smtp_host) => {
                let username = env::var("SMTP_USERNAME").map_err(|_| {
                    anyhow::anyhow!("SMTP_USERNAME is required when SMTP_HOST is set")
                })?;
                let password = env::var("SMTP_PASSWORD").map_err(|_| {
                    anyhow::anyhow!("SMTP_PASSWORD is required when SMTP_HOST is set")
                })?;
                let from = env::var("MAIL_FROM").unwrap_or_else(|_| username.clone());

                Some(MailConfig {
                    smtp_host,
                    username,
                    password,
                    from,
                })
            }
            Err(_) => None,
        };

        let timeout_seconds = env::var("WEBHOOK_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| botboard_shared::dispatch::DEFAULT_TIMEOUT.as_secs().to_string())
            .parse::<u64>()?;

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                public_url,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            owner: OwnerConfig {
                email: owner_email,
                password: owner_password,
            },
            mail,
            webhook: WebhookConfig { timeout_seconds },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
