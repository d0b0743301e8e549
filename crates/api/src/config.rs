//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `EMALL_HOST` - Bind address (default: 0.0.0.0)
//! - `EMALL_PORT` - Listen port (default: 8080)
//! - `EMALL_SEED_FILE` - JSON array of products registered at startup (optional)
//! - `EMALL_LOG_FORMAT` - `json` (default) or `pretty`
//! - `RUST_LOG` - tracing filter (default: info)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use emall_observability::LogFormat;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: IpAddr,
    pub port: u16,
    pub seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (env, test fixtures).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("EMALL_HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("EMALL_HOST".to_string(), e.to_string()))?;
        let port = get("EMALL_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("EMALL_PORT".to_string(), e.to_string()))?;
        let seed_file = get("EMALL_SEED_FILE").map(PathBuf::from);
        let log_format = get("EMALL_LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Json);

        Ok(Self {
            host,
            port,
            seed_file,
            log_format,
        })
    }

    /// Returns the socket address for binding the server.
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
