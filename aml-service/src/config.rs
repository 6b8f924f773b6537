//! Environment-driven configuration.

use serde::{Deserialize, Serialize};
use std::env;

/// Top-level service configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// HTTP server bind settings.
    pub server: ServerConfig,
}

/// HTTP server bind settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Bind host, e.g. "0.0.0.0".
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    /// There is no database or queue to reach, so every setting has a
    /// workable default and `from_env` never fails.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let host = env::var("SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "8089".to_string())
            .parse::<u16>()
            .unwrap_or(8089);

        Ok(Config {
            server: ServerConfig { host, port },
        })
    }
}
