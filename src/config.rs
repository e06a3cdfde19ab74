use crate::error::{FriendoError, Result};
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Application identity and mode
    pub app: AppConfig,
    /// Allowed CORS origins (comma-separated, empty = localhost only)
    pub cors_origins: Vec<String>,
    /// Path of the API call log file (debug mode only)
    pub capture_log_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (default: 8000)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application display name
    pub name: String,
    /// Application version (from the crate)
    pub version: String,
    /// Deployment environment label (development, staging, production)
    pub environment: String,
    /// Debug mode: verbose logging plus the API call capture middleware
    pub debug: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            server: ServerConfig {
                port: get_env_or("PORT", "8000").parse().map_err(|_| {
                    FriendoError::InvalidConfig("PORT must be a valid port number".into())
                })?,
                host: get_env_or("HOST", "0.0.0.0"),
            },
            app: AppConfig {
                name: get_env_or("APP_NAME", "Friendo API"),
                version: env!("CARGO_PKG_VERSION").to_string(),
                environment: get_env_or("ENVIRONMENT", "development"),
                debug: get_env_or("DEBUG", "false").parse().unwrap_or(false),
            },
            cors_origins: get_env_or("CORS_ORIGINS", "")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            capture_log_file: PathBuf::from(get_env_or("API_LOG_FILE", "api-logs.txt")),
        })
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
